//! Resource cells: generation-tracked async values tied to component
//! lifetime.
//!
//! `ResourceCell` keys off a single generation counter per cell: each call
//! to the producer bumps it, and only the completion whose generation still
//! matches the one stored on the cell is allowed to commit. The `Owner`
//! that mints the cell's storage (shared with `StateCell`, see
//! `instance.rs`) keeps read-after-unmount safe; the abort controller and
//! generation check below are the *other* half of cancellation - signalling
//! the future to stop, independent of whether the storage it would write
//! into still exists.

use crate::arena::ScopeId;
use crate::context::ContextFrame;
use crate::instance::{ErasedStateHandle, Scope, SsrMissingPanic};
use crate::runtime::Runtime;
use crate::waker::RcWake;
use futures_util::future::LocalBoxFuture;
use generational_box::{GenerationalBox, GenerationalBoxId};
use rustc_hash::FxHashSet;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::{Context, Poll};

/// Index into [`Runtime::tasks`]. Reused as a slab key once its task
/// completes and is removed.
pub(crate) type TaskId = usize;

/// Object-safe handle the scheduler's flush loop uses to resume a pending
/// task without knowing its concrete `T`/`E`/`D`.
pub(crate) trait AnyTask {
    fn poll(self: Rc<Self>, runtime: &Rc<Runtime>);
}

/// Cooperative cancellation flag handed to a resource's producer closure.
/// Checking it is voluntary - a producer that ignores it still can't corrupt
/// the cell, since the generation check in [`ResourceTask::commit`] is the
/// backstop.
#[derive(Clone)]
pub struct AbortSignal(Rc<Cell<bool>>);

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.0.get()
    }
}

struct AbortController(Rc<Cell<bool>>);

impl AbortController {
    fn new() -> Self {
        Self(Rc::new(Cell::new(false)))
    }

    fn abort(&self) {
        self.0.set(true);
    }

    fn signal(&self) -> AbortSignal {
        AbortSignal(self.0.clone())
    }
}

/// A resource's current value as observed by a reader: `pending` and
/// `value` are independent (a refresh keeps showing the previous value with
/// `pending: true` until the new generation resolves).
#[derive(Clone, Debug)]
pub struct ResourceSnapshot<T, E> {
    pub value: Option<T>,
    pub pending: bool,
    pub error: Option<E>,
}

impl<T, E> ResourceSnapshot<T, E> {
    /// `Some(value)` only once a generation has resolved successfully and no
    /// later refresh has superseded it; `None` while pending, errored, or
    /// before the first resolution.
    pub fn ready_value(&self) -> Option<&T> {
        if self.pending {
            None
        } else {
            self.value.as_ref()
        }
    }
}

type Producer<T, E> = Rc<dyn Fn(AbortSignal) -> LocalBoxFuture<'static, Result<T, E>>>;

struct ResourceInner<T, E, D> {
    producer: Producer<T, E>,
    deps: D,
    generation: u64,
    controller: AbortController,
    context: ContextFrame,
    value: Option<T>,
    pending: bool,
    error: Option<E>,
    readers: FxHashSet<ScopeId>,
}

/// An async value with generation-based staleness and cancellation, owned by
/// exactly one component instance.
pub struct ResourceCell<T: 'static, E: 'static = String, D: 'static = ()> {
    runtime: Rc<Runtime>,
    owner: ScopeId,
    inner: GenerationalBox<RefCell<ResourceInner<T, E, D>>>,
}

impl<T: 'static, E: 'static, D: 'static> Clone for ResourceCell<T, E, D> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            owner: self.owner,
            inner: self.inner,
        }
    }
}

impl<T: 'static, E: 'static, D: Clone + PartialEq + 'static> ResourceCell<T, E, D> {
    /// Creates a cell owned by the scope currently being rendered and spawns
    /// its first generation immediately.
    pub fn new(
        scope: &Scope,
        deps: D,
        producer: impl Fn(AbortSignal) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
    ) -> Self {
        let runtime = scope.runtime.clone();
        let context = scope.capture_context_frame();
        let hook_index = {
            let instances = runtime.instances.borrow();
            instances
                .get(scope.id)
                .map(|instance| instance.hook_cursor.get())
                .unwrap_or(0)
        };
        let inner = {
            let instances = runtime.instances.borrow();
            let instance = instances
                .get(scope.id)
                .expect("ResourceCell constructed for an unmounted scope");
            instance.gen_owner.insert(RefCell::new(ResourceInner {
                producer: Rc::new(producer),
                deps,
                generation: 0,
                controller: AbortController::new(),
                context,
                value: None,
                pending: true,
                error: None,
                readers: FxHashSet::default(),
            }))
        };

        if runtime.config.ssr {
            // No event loop drives a resource's future forward during SSR -
            // the whole render happens inside one synchronous call - so a
            // producer either resolves on its very first poll or it never
            // will, from this cell's point of view. `weave-ssr` is expected
            // to either serve data whose producer is already synchronous, or
            // prime it through a host-provided `ContextFrame` value the
            // producer consults with `Scope::consume_context` before
            // returning its future.
            let (signal, producer) = {
                let lock = inner.try_read().expect("resource cell gone");
                let guard = lock.borrow();
                (guard.controller.signal(), guard.producer.clone())
            };
            let mut future = producer(signal);
            let waker = Rc::new(NoopWake).into_waker();
            let mut cx = Context::from_waker(&waker);
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(result) => {
                    let lock = inner.try_read().expect("resource cell gone");
                    let mut guard = lock.borrow_mut();
                    guard.pending = false;
                    match result {
                        Ok(value) => {
                            guard.value = Some(value);
                            guard.error = None;
                        }
                        Err(error) => guard.error = Some(error),
                    }
                }
                Poll::Pending => {
                    std::panic::panic_any(SsrMissingPanic(format!(
                        "{:?}#{hook_index}",
                        scope.id()
                    )));
                }
            }
        } else {
            spawn_generation(&runtime, inner, 0);
        }

        scope.on_cleanup(move || {
            if let Ok(lock) = inner.try_read() {
                lock.borrow().controller.abort();
            }
        });

        Self {
            runtime,
            owner: scope.id,
            inner,
        }
    }

    /// The component instance that owns this cell.
    pub fn owner(&self) -> ScopeId {
        self.owner
    }

    /// Restarts the resource if `deps` differs from the stored dependency
    /// tuple by `PartialEq`. Intended to be called every render with the render's current
    /// arguments to `resource(...)`, the way `weave-hooks::use_resource`
    /// does.
    pub fn update_deps(&self, deps: D) {
        let changed = {
            let lock = self.inner.try_read().expect("resource cell gone");
            lock.borrow().deps != deps
        };
        if changed {
            self.restart(Some(deps));
        }
    }

    /// Forces a new generation regardless of whether the dependency tuple
    /// changed.
    pub fn refresh(&self) {
        self.restart(None);
    }

    fn restart(&self, new_deps: Option<D>) {
        let generation = {
            let lock = self.inner.try_read().expect("resource cell gone");
            let mut inner = lock.borrow_mut();
            inner.controller.abort();
            inner.controller = AbortController::new();
            inner.generation += 1;
            inner.pending = true;
            inner.error = None;
            if let Some(deps) = new_deps {
                inner.deps = deps;
            }
            inner.generation
        };
        spawn_generation(&self.runtime, self.inner, generation);
    }

    /// Reads the current snapshot, registering the scope currently
    /// rendering (if any) as a reader, the same way [`crate::state::StateCell::get`]
    /// does.
    pub fn snapshot(&self) -> ResourceSnapshot<T, E>
    where
        T: Clone,
        E: Clone,
    {
        let lock = self
            .inner
            .try_read()
            .expect("resource cell read after its owning component unmounted");
        let reader = self.runtime.current_scope_id();
        if let Some(reader) = reader {
            lock.borrow_mut().readers.insert(reader);
        }
        let snapshot = {
            let inner = lock.borrow();
            ResourceSnapshot {
                value: inner.value.clone(),
                pending: inner.pending,
                error: inner.error.clone(),
            }
        };
        drop(lock);
        if let Some(reader) = reader {
            self.runtime.record_read(reader, Box::new(self.clone()));
        }
        snapshot
    }

    pub fn is_valid(&self) -> bool {
        self.inner.try_read().is_ok()
    }
}

impl<T: 'static, E: 'static, D: 'static> ErasedStateHandle for ResourceCell<T, E, D> {
    fn box_id(&self) -> GenerationalBoxId {
        self.inner.id()
    }

    fn remove_reader(&self, scope: ScopeId) {
        if let Ok(lock) = self.inner.try_read() {
            lock.borrow_mut().readers.remove(&scope);
        }
    }
}

fn spawn_generation<T: 'static, E: 'static, D: 'static>(
    runtime: &Rc<Runtime>,
    cell: GenerationalBox<RefCell<ResourceInner<T, E, D>>>,
    generation: u64,
) {
    let (future, context) = {
        let lock = cell.try_read().expect("resource cell gone");
        let inner = lock.borrow();
        let signal = inner.controller.signal();
        ((inner.producer)(signal), inner.context.clone())
    };

    let task = Rc::new(ResourceTask {
        runtime: runtime.clone(),
        future: RefCell::new(Some(future)),
        cell,
        generation,
        context,
        task_id: Cell::new(None),
    });
    let id = runtime.register_task(task.clone());
    task.task_id.set(Some(id));
    task.drive();
}

struct ResourceTask<T: 'static, E: 'static, D: 'static> {
    runtime: Rc<Runtime>,
    future: RefCell<Option<LocalBoxFuture<'static, Result<T, E>>>>,
    cell: GenerationalBox<RefCell<ResourceInner<T, E, D>>>,
    generation: u64,
    context: ContextFrame,
    task_id: Cell<Option<TaskId>>,
}

impl<T: 'static, E: 'static, D: 'static> ResourceTask<T, E, D> {
    fn drive(self: &Rc<Self>) {
        let waker = self.clone().into_waker();
        let mut cx = Context::from_waker(&waker);
        let poll = match self.future.borrow_mut().as_mut() {
            None => return,
            Some(fut) => fut.as_mut().poll(&mut cx),
        };
        let Poll::Ready(result) = poll else {
            return;
        };
        *self.future.borrow_mut() = None;
        self.commit(result);
        if let Some(id) = self.task_id.take() {
            self.runtime.remove_task(id);
        }
    }

    fn commit(&self, result: Result<T, E>) {
        let runtime = self.runtime.clone();
        self.context.reinstall(&runtime, || {
            let still_current = match self.cell.try_read() {
                Ok(lock) => lock.borrow().generation == self.generation,
                Err(_) => false,
            };
            if !still_current {
                tracing::debug!(
                    generation = self.generation,
                    "discarding stale resource generation"
                );
                return;
            }

            let readers: Vec<ScopeId> = {
                let lock = match self.cell.try_read() {
                    Ok(lock) => lock,
                    Err(_) => return,
                };
                let mut inner = lock.borrow_mut();
                inner.pending = false;
                match result {
                    Ok(value) => {
                        inner.value = Some(value);
                        inner.error = None;
                    }
                    Err(error) => inner.error = Some(error),
                }
                inner.readers.iter().copied().collect()
            };

            let mut scheduler = self.runtime.scheduler.borrow_mut();
            for reader in readers {
                scheduler.enqueue(reader);
            }
        });
    }
}

impl<T: 'static, E: 'static, D: 'static> RcWake for ResourceTask<T, E, D> {
    fn wake_by_ref(self: &Rc<Self>) {
        if let Some(id) = self.task_id.get() {
            self.runtime.scheduler.borrow_mut().enqueue_task(id);
        }
    }
}

impl<T: 'static, E: 'static, D: 'static> AnyTask for ResourceTask<T, E, D> {
    fn poll(self: Rc<Self>, _runtime: &Rc<Runtime>) {
        self.drive();
    }
}

/// A waker that does nothing, used for the single synchronous poll a
/// resource gets in SSR mode. There is no later point in the render at
/// which waking it up could matter - the document string is already written
/// by the time this would fire.
struct NoopWake;

impl RcWake for NoopWake {
    fn wake_by_ref(self: &Rc<Self>) {}
}
