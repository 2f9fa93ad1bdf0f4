//! Component instances and the `Scope` handle passed into render functions.
//!
//! `ComponentInstance` is the persistent, arena-stored record for a mounted
//! component: its props, its ordered hook slots, and its bookkeeping for
//! scheduling and cleanup. `Scope` is the lightweight, `Copy`-able handle a
//! render function actually receives; it borrows nothing and instead looks
//! its instance up in the runtime on every call, rather than holding a raw
//! pointer back to it.

use crate::any_props::AnyProps;
use crate::arena::ScopeId;
use crate::context::ContextFrame;
use crate::nodes::VNode;
use crate::runtime::Runtime;
use generational_box::{AnyStorage, Owner, UnsyncStorage};
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Panic payload used by [`Scope::use_hook`] to signal a hook-order break.
/// `any_props::VProps::render` downcasts caught panics for this marker so it
/// can report [`crate::error::CoreError::HookOrderViolation`] instead of the
/// generic "component panicked" error.
pub(crate) struct HookOrderPanic(pub String);

/// Panic payload used by [`crate::state::StateCell::set`] in dev mode to
/// signal a render-time write; downcast the same way as
/// [`HookOrderPanic`] to report [`crate::error::CoreError::WriteDuringRender`].
pub(crate) struct RenderTimeWritePanic(pub ScopeId);

/// Panic payload used by [`crate::resource::ResourceCell::new`] in SSR mode
/// when a resource's producer does not resolve on its first synchronous
/// poll; downcast the same way as [`HookOrderPanic`] to report
/// [`crate::error::CoreError::SsrDataMissing`].
pub(crate) struct SsrMissingPanic(pub String);

/// Type-erased handle to a single [`crate::state::StateCell`], kept around
/// just long enough to compare "cells read this render" against "cells read
/// last render" without `ComponentInstance` needing to be generic over every
/// `T` its hooks happen to store.
pub(crate) trait ErasedStateHandle {
    fn box_id(&self) -> generational_box::GenerationalBoxId;
    fn remove_reader(&self, scope: ScopeId);
}

/// A single render's worth of bookkeeping: the previous committed tree and
/// cleanup state are held on `ComponentInstance` directly; this type only
/// exists to make mid-render state explicit.
pub(crate) struct ComponentInstance {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) props: RefCell<Rc<dyn AnyProps>>,
    pub(crate) last_tree: RefCell<Option<VNode>>,
    pub(crate) hooks: RefCell<Vec<Box<dyn Any>>>,
    pub(crate) hook_cursor: Cell<usize>,
    /// Set once the first render completes; used to detect a later render
    /// that used fewer or more hooks than the first.
    pub(crate) expected_hook_count: Cell<Option<usize>>,
    pub(crate) provided_contexts: RefCell<rustc_hash::FxHashMap<TypeId, Rc<dyn Any>>>,
    pub(crate) is_rendering: Cell<bool>,
    pub(crate) has_pending_update: Cell<bool>,
    pub(crate) cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    /// Cells read so far during the render currently in progress; reset to
    /// empty when a render starts and drained into `last_reads` when it
    /// finishes.
    pub(crate) reads_this_render: RefCell<Vec<Box<dyn ErasedStateHandle>>>,
    /// The cells read during the most recently *completed* render.
    pub(crate) last_reads: RefCell<Vec<Box<dyn ErasedStateHandle>>>,
    /// Mints every [`crate::state::StateCell`] and
    /// [`crate::resource::ResourceCell`] this instance owns. Dropping it
    /// (on unmount) invalidates every handle derived from it in one step,
    /// rather than having to walk and individually tear down each cell.
    pub(crate) gen_owner: Owner<UnsyncStorage>,
}

impl ComponentInstance {
    pub(crate) fn new(parent: Option<ScopeId>, props: Rc<dyn AnyProps>) -> Self {
        Self {
            parent,
            props: RefCell::new(props),
            last_tree: RefCell::new(None),
            hooks: RefCell::new(Vec::new()),
            hook_cursor: Cell::new(0),
            expected_hook_count: Cell::new(None),
            provided_contexts: RefCell::new(rustc_hash::FxHashMap::default()),
            is_rendering: Cell::new(false),
            has_pending_update: Cell::new(false),
            cleanups: RefCell::new(Vec::new()),
            reads_this_render: RefCell::new(Vec::new()),
            last_reads: RefCell::new(Vec::new()),
            gen_owner: UnsyncStorage::owner(),
        }
    }
}

/// The handle passed to a component's render function.
///
/// Cheap to copy and to hold past the end of a render (a closure captured
/// by an event listener keeps one alive), since it is just a runtime handle
/// plus an id - looking up a `Scope` whose instance has since unmounted is a
/// programming error in the framework itself, not something components
/// observe.
#[derive(Clone)]
pub struct Scope {
    pub(crate) id: ScopeId,
    pub(crate) runtime: Rc<Runtime>,
}

impl Scope {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.runtime
            .instances
            .borrow()
            .get(self.id)
            .and_then(|instance| instance.parent)
    }

    /// The foundational hook primitive: every other hook (state, resource,
    /// effect, derive) is implemented on top of this one in `weave-signals`
    /// and `weave-hooks`.
    ///
    /// `init` runs only the first time this call site is reached for this
    /// component; afterwards the previously stored value is returned.
    /// Hook call sites are identified purely by the order they're reached
    /// in during a render, so calling this conditionally makes that order
    /// render-dependent and panics.
    pub fn use_hook<T: 'static>(&self, init: impl FnOnce() -> T) -> HookRef<T> {
        let instances = self.runtime.instances.borrow();
        let instance = instances
            .get(self.id)
            .expect("Scope used after its component instance was unmounted");

        let cursor = instance.hook_cursor.get();
        let mut hooks = instance.hooks.borrow_mut();

        if cursor == hooks.len() {
            if let Some(expected) = instance.expected_hook_count.get() {
                if cursor >= expected {
                    std::panic::panic_any(HookOrderPanic(format!(
                        "component called more hooks ({}) than its previous render ({expected}); \
                         hooks must be called unconditionally and in the same order every render",
                        cursor + 1
                    )));
                }
            }
            hooks.push(Box::new(init()));
        }

        drop(hooks);
        instance.hook_cursor.set(cursor + 1);
        HookRef {
            scope_id: self.id,
            runtime: self.runtime.clone(),
            index: cursor,
            _marker: std::marker::PhantomData,
        }
    }

    /// Marks this component as provider of a context value of type `T` for
    /// its descendants.
    pub fn provide_context<T: 'static>(&self, value: T) -> Rc<T> {
        let rc = Rc::new(value);
        let instances = self.runtime.instances.borrow();
        let instance = instances.get(self.id).expect("scope must be mounted");
        instance
            .provided_contexts
            .borrow_mut()
            .insert(TypeId::of::<T>(), rc.clone());
        rc
    }

    /// Walks up the ancestor chain looking for a provided context of type
    /// `T`.
    pub fn consume_context<T: 'static>(&self) -> Option<Rc<T>> {
        let instances = self.runtime.instances.borrow();
        let mut current = Some(self.id);
        while let Some(id) = current {
            let instance = instances.get(id)?;
            if let Some(value) = instance.provided_contexts.borrow().get(&TypeId::of::<T>()) {
                return value.clone().downcast::<T>().ok();
            }
            current = instance.parent;
        }
        None
    }

    /// Captures the current ancestor chain so it can be reinstalled later
    /// from inside a resource continuation or a spawned task.
    pub fn capture_context_frame(&self) -> ContextFrame {
        ContextFrame::capture(&self.runtime, self.id)
    }

    /// Schedules a re-render of this component.
    pub fn schedule_update(&self) {
        self.runtime.scheduler.borrow_mut().enqueue(self.id);
    }

    /// Schedules a re-render of an arbitrary (usually descendant) scope.
    pub fn schedule_update_for(&self, id: ScopeId) {
        self.runtime.scheduler.borrow_mut().enqueue(id);
    }

    /// Prepares the instance for a fresh render: resets the hook cursor and
    /// clears the in-progress read set.
    pub(crate) fn reset_hook_cursor(&self) {
        let instances = self.runtime.instances.borrow();
        if let Some(instance) = instances.get(self.id) {
            instance.hook_cursor.set(0);
            instance.reads_this_render.borrow_mut().clear();
        }
    }

    pub(crate) fn finish_render(&self) {
        let instances = self.runtime.instances.borrow();
        let instance = instances.get(self.id).expect("scope must be mounted");
        let used = instance.hook_cursor.get();
        match instance.expected_hook_count.get() {
            None => instance.expected_hook_count.set(Some(used)),
            Some(expected) if expected != used => {
                std::panic::panic_any(HookOrderPanic(format!(
                    "component called {used} hooks this render but {expected} on its \
                     previous render; hooks must be called unconditionally and in the same \
                     order every render"
                )));
            }
            Some(_) => {}
        }

        // Subscription maintenance: anything read last render but not
        // this one drops this scope from its readers.
        let new_reads = std::mem::take(&mut *instance.reads_this_render.borrow_mut());
        let old_reads = std::mem::replace(&mut *instance.last_reads.borrow_mut(), Vec::new());
        for old in &old_reads {
            let still_read = new_reads.iter().any(|new| new.box_id() == old.box_id());
            if !still_read {
                old.remove_reader(self.id);
            }
        }
        *instance.last_reads.borrow_mut() = new_reads;
    }

    /// Registers a closure to run when this component unmounts, after its
    /// children have already been torn down (bottom-up, matching the
    /// teacher's `drop_scope` ordering).
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) {
        let instances = self.runtime.instances.borrow();
        let instance = instances.get(self.id).expect("scope must be mounted");
        instance.cleanups.borrow_mut().push(Box::new(cleanup));
    }
}

/// A stable reference to one hook slot, usable after the render that
/// created it has returned (an effect or event-listener closure keeps one
/// of these alive to read or write the hook's stored value later).
pub struct HookRef<T> {
    scope_id: ScopeId,
    runtime: Rc<Runtime>,
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: 'static> HookRef<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let instances = self.runtime.instances.borrow();
        let instance = instances
            .get(self.scope_id)
            .expect("hook used after its component instance was unmounted");
        let hooks = instance.hooks.borrow();
        let value = hooks[self.index]
            .downcast_ref::<T>()
            .expect("hook slot type mismatch - hooks must be called in the same order every render");
        f(value)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let instances = self.runtime.instances.borrow();
        let instance = instances
            .get(self.scope_id)
            .expect("hook used after its component instance was unmounted");
        let mut hooks = instance.hooks.borrow_mut();
        let value = hooks[self.index]
            .downcast_mut::<T>()
            .expect("hook slot type mismatch - hooks must be called in the same order every render");
        f(value)
    }

    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }
}

impl<T> Clone for HookRef<T> {
    fn clone(&self) -> Self {
        Self {
            scope_id: self.scope_id,
            runtime: self.runtime.clone(),
            index: self.index,
            _marker: std::marker::PhantomData,
        }
    }
}
