//! The runtime is the piece of shared state every component instance, hook
//! and scheduled task holds a clone of. It owns the instance arena, the
//! ancestor-scope stack used for context resolution, and the scheduler.
//!
//! A thread-local stack of "current" runtimes lets code outside the render
//! call graph (a spawned task resuming after an await, a dropped component's
//! cleanup) look up `Runtime::current()` without threading a handle through
//! every function signature.

use crate::arena::{GenerationalArena, ScopeId};
use crate::config::RuntimeConfig;
use crate::error::CoreError;
use crate::instance::{ComponentInstance, ErasedStateHandle};
use crate::resource::{AnyTask, TaskId};
use crate::scheduler::Scheduler;
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static RUNTIMES: RefCell<Vec<Rc<Runtime>>> = RefCell::new(Vec::new());
}

pub(crate) fn push_runtime(runtime: Rc<Runtime>) {
    RUNTIMES.with(|stack| stack.borrow_mut().push(runtime));
}

pub(crate) fn pop_runtime() {
    RUNTIMES.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Shared state for one [`crate::virtual_dom::VirtualDom`].
pub struct Runtime {
    pub(crate) instances: RefCell<GenerationalArena<ComponentInstance>>,
    pub(crate) scope_stack: RefCell<Vec<ScopeId>>,
    /// When set, context resolution and `current_scope_id` use this chain
    /// instead of `scope_stack`. Installed by
    /// [`crate::context::ContextFrame::reinstall`] while a resource
    /// continuation that captured an ancestor chain at spawn time is
    /// running, so `consume_context` inside it still sees the values that
    /// were visible when the resource was created.
    pub(crate) scope_stack_override: RefCell<Option<Rc<Vec<ScopeId>>>>,
    pub(crate) scheduler: RefCell<Scheduler>,
    pub(crate) config: RuntimeConfig,
    /// Depth of nested `AnyProps::render` calls currently on the stack.
    /// [`crate::state::StateCell::set`] consults this to enforce that no
    /// state mutation occurs while a render function is on the call stack,
    /// regardless of which scope is being rendered, since a parent's BUILD
    /// phase can have a child's render nested inside it.
    pub(crate) render_depth: std::cell::Cell<u32>,
    /// Resource continuations and other spawned local futures, keyed so a
    /// waker firing after the task has already completed (or the scheduler
    /// popped a stale `Job::PollTask`) is simply a no-op lookup miss rather
    /// than a dangling reference.
    pub(crate) tasks: RefCell<slab::Slab<Rc<dyn AnyTask>>>,
    /// First render panic observed during the BUILD pass currently in
    /// progress (initial mount or flush). A render exception aborts the
    /// whole pass - recording just the first one is enough since
    /// `build`/`with_config` bail out as soon as they notice it set.
    pub(crate) first_render_error: RefCell<Option<CoreError>>,
}

impl Runtime {
    pub(crate) fn new(config: RuntimeConfig) -> Rc<Self> {
        Rc::new(Self {
            instances: RefCell::new(GenerationalArena::new()),
            scope_stack: RefCell::new(Vec::new()),
            scope_stack_override: RefCell::new(None),
            scheduler: RefCell::new(Scheduler::new()),
            config,
            render_depth: std::cell::Cell::new(0),
            tasks: RefCell::new(slab::Slab::new()),
            first_render_error: RefCell::new(None),
        })
    }

    /// Records a render panic if none has been recorded yet for the pass
    /// currently in progress.
    pub(crate) fn record_render_error(&self, err: CoreError) {
        let mut slot = self.first_render_error.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    /// Takes and clears whatever render error was recorded, so the next
    /// BUILD pass starts clean.
    pub(crate) fn take_render_error(&self) -> Option<CoreError> {
        self.first_render_error.borrow_mut().take()
    }

    pub(crate) fn register_task(&self, task: Rc<dyn AnyTask>) -> TaskId {
        self.tasks.borrow_mut().insert(task)
    }

    pub(crate) fn remove_task(&self, id: TaskId) {
        let mut tasks = self.tasks.borrow_mut();
        if tasks.contains(id) {
            tasks.remove(id);
        }
    }

    /// Polls the task enqueued as `id`, if it's still registered. Called by
    /// the flush loop when it pops a [`crate::scheduler::Job::PollTask`].
    pub(crate) fn poll_task(self: &Rc<Self>, id: TaskId) {
        let task = self.tasks.borrow().get(id).cloned();
        if let Some(task) = task {
            task.poll(self);
        }
    }

    /// The scheduler's current flush version - bumped once per `build()`
    /// call, including the one that ran while constructing this handle.
    /// Exposed so [`crate::virtual_dom::VirtualDom::wait_for_flush`] can
    /// compare against a version a caller captured earlier.
    pub(crate) fn flush_version(&self) -> u64 {
        self.scheduler.borrow().flush_version()
    }

    pub(crate) fn is_rendering(&self) -> bool {
        self.render_depth.get() > 0
    }

    pub(crate) fn enter_render(&self) {
        self.render_depth.set(self.render_depth.get() + 1);
    }

    pub(crate) fn leave_render(&self) {
        self.render_depth.set(self.render_depth.get() - 1);
    }

    pub fn current() -> Option<Rc<Self>> {
        RUNTIMES.with(|stack| stack.borrow().last().cloned())
    }

    pub(crate) fn current_scope_id(&self) -> Option<ScopeId> {
        if let Some(chain) = self.scope_stack_override.borrow().as_ref() {
            return chain.last().copied();
        }
        self.scope_stack.borrow().last().copied()
    }

    /// Returns the full ancestor chain, root-first, ending with `id`.
    pub(crate) fn ancestor_chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let instances = self.instances.borrow();
        let mut chain = vec![id];
        let mut current = id;
        while let Some(instance) = instances.get(current) {
            match instance.parent {
                Some(parent) => {
                    chain.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    pub(crate) fn with_scope<O>(&self, id: ScopeId, f: impl FnOnce() -> O) -> O {
        self.scope_stack.borrow_mut().push(id);
        let result = f();
        self.scope_stack.borrow_mut().pop();
        result
    }

    /// Registers `handle` as read during `scope`'s render currently in
    /// progress. A no-op if `scope` has since unmounted.
    pub(crate) fn record_read(&self, scope: ScopeId, handle: Box<dyn ErasedStateHandle>) {
        let instances = self.instances.borrow();
        if let Some(instance) = instances.get(scope) {
            instance.reads_this_render.borrow_mut().push(handle);
        }
    }
}

/// Installs `runtime` as the thread-current runtime for the duration of the
/// guard's lifetime. Used when resuming a resource's continuation or
/// running a task outside of a `render` call.
pub struct RuntimeGuard(());

impl RuntimeGuard {
    pub fn new(runtime: Rc<Runtime>) -> Self {
        push_runtime(runtime);
        Self(())
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        pop_runtime();
    }
}
