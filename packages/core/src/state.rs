//! State cells: read-tracked, write-scheduled values owned by one
//! component instance.
//!
//! Backed by [`generational_box::GenerationalBox`] rather than a bare
//! `Rc<RefCell<_>>` graph, so a handle captured by an event-listener closure
//! after its owning component unmounted fails safely on read instead of
//! aliasing freed memory. Every cell an instance creates is minted from that
//! instance's own [`generational_box::Owner`] (`ComponentInstance::gen_owner`),
//! so unmounting drops the owner and invalidates every cell in one step
//! rather than requiring an explicit teardown walk.

use crate::instance::{ErasedStateHandle, RenderTimeWritePanic, Scope};
use crate::runtime::Runtime;
use generational_box::{GenerationalBox, GenerationalBoxId};
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::ScopeId;

struct StateCellInner<T> {
    value: T,
    owner: ScopeId,
    readers: FxHashSet<ScopeId>,
}

/// A read-tracked, set-enqueued value owned by exactly one
/// [`crate::instance::Scope`].
pub struct StateCell<T: 'static> {
    runtime: Rc<Runtime>,
    owner: ScopeId,
    inner: GenerationalBox<RefCell<StateCellInner<T>>>,
}

impl<T: 'static> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            owner: self.owner,
            inner: self.inner,
        }
    }
}

impl<T: 'static> StateCell<T> {
    /// Creates a cell owned by the scope currently being rendered.
    /// Constructing a cell outside an active render is a programming error
    /// in the framework's own hook plumbing, never something a component
    /// author does directly (see `weave-hooks::use_state`).
    pub fn new(scope: &Scope, initial: T) -> Self {
        let runtime = scope.runtime.clone();
        let inner = {
            let instances = runtime.instances.borrow();
            let instance = instances
                .get(scope.id)
                .expect("StateCell constructed for an unmounted scope");
            instance.gen_owner.insert(RefCell::new(StateCellInner {
                value: initial,
                owner: scope.id,
                readers: FxHashSet::default(),
            }))
        };
        Self {
            runtime,
            owner: scope.id,
            inner,
        }
    }

    /// The component instance that owns this cell (never changes over
    /// the cell's lifetime).
    pub fn owner(&self) -> ScopeId {
        self.owner
    }

    /// Reads the current value, registering the scope currently rendering
    /// (if any) as a reader.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(Clone::clone)
    }

    /// Reads the current value through `f` without cloning it, still
    /// performing the same read-tracking as [`StateCell::get`].
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let cell = self
            .inner
            .try_read()
            .expect("state cell read after its owning component unmounted");
        let reader = self.runtime.current_scope_id();
        if let Some(reader) = reader {
            cell.borrow_mut().readers.insert(reader);
        }
        let result = f(&cell.borrow().value);
        drop(cell);
        if let Some(reader) = reader {
            self.runtime.record_read(reader, Box::new(self.clone()));
        }
        result
    }

    /// Sets the value. A no-op if `value` compares equal to the current one
    /// (no readers are notified). Every reader has exactly one re-render
    /// enqueued for this flush, coalesced with any other state writes that
    /// affect the same reader.
    ///
    /// Calling `set` while a render is active anywhere on the call stack is
    /// reported as [`crate::error::CoreError::WriteDuringRender`] in dev mode
    /// (by panicking with a marker the commit engine downgrades into that
    /// error) and silently dropped in production.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        if self.runtime.is_rendering() {
            if self.runtime.config.dev_mode {
                let offender = self.runtime.current_scope_id().unwrap_or(self.owner);
                std::panic::panic_any(RenderTimeWritePanic(offender));
            }
            return;
        }

        let readers: Vec<ScopeId> = {
            let cell = self
                .inner
                .try_read()
                .expect("state cell set after its owning component unmounted");
            let inner = cell.borrow();
            if inner.value == value {
                return;
            }
            inner.readers.iter().copied().collect()
        };

        {
            let cell = self
                .inner
                .try_write()
                .expect("state cell set after its owning component unmounted");
            cell.borrow_mut().value = value;
        }

        let mut scheduler = self.runtime.scheduler.borrow_mut();
        for reader in readers {
            scheduler.enqueue(reader);
        }
    }

    /// Whether this cell's underlying storage is still alive - false once
    /// the owning instance has unmounted.
    pub fn is_valid(&self) -> bool {
        self.inner.try_read().is_ok()
    }
}

impl<T: 'static> ErasedStateHandle for StateCell<T> {
    fn box_id(&self) -> GenerationalBoxId {
        self.inner.id()
    }

    fn remove_reader(&self, scope: ScopeId) {
        if let Ok(cell) = self.inner.try_read() {
            cell.borrow_mut().readers.remove(&scope);
        }
    }
}
