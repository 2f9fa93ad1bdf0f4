//! The commit engine: BUILD/COMMIT two-phase application of a flush.
//!
//! BUILD runs every dirty component's render function and stages the
//! resulting edits into a [`MutationList`] without touching the document;
//! COMMIT replays that list against a live [`WriteMutations`] sink in one
//! pass. Splitting the two means a panic or an invariant violation midway
//! through BUILD can be rolled back before anything observable happens -
//! a flush either lands as a whole or not at all.
//!
//! [`CommitHost`] is this module's [`ComponentHost`] implementation: it owns
//! nothing of its own beyond a `Runtime` handle, since every piece of state
//! a mount/update/unmount needs (the instance arena, the scheduler, the
//! render-depth guard) already lives there.

use crate::any_props::RenderOutcome;
use crate::arena::ScopeId;
use crate::config::RuntimeConfig;
use crate::error::CoreError;
use crate::instance::{ComponentInstance, Scope};
use crate::mount::{self, ComponentHost, Mounted};
use crate::mutations::MutationList;
use crate::nodes::{Element, VComponent, VNode};
use crate::runtime::Runtime;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

/// Panic payload `render_scope` throws once it has recorded a render error,
/// to unwind straight out of the BUILD pass instead of letting
/// `mount_node`/`reconcile_node` keep walking into the rest of the tree. The
/// real [`CoreError`] travels separately through
/// `Runtime::record_render_error`/`take_render_error`; this type carries no
/// data of its own.
struct BuildAborted;

pub(crate) struct CommitHost<'a> {
    pub(crate) runtime: &'a Rc<Runtime>,
    /// Scopes freshly mounted during the BUILD attempt this host is
    /// serving, in mount order. If that attempt aborts partway through,
    /// these - and only these - need to be torn back out: every other live
    /// scope already existed before this BUILD started and is untouched by
    /// the abort.
    mounted_this_build: Vec<ScopeId>,
}

impl<'a> CommitHost<'a> {
    pub(crate) fn new(runtime: &'a Rc<Runtime>) -> Self {
        Self {
            runtime,
            mounted_this_build: Vec::new(),
        }
    }

    /// Unwinds every scope mounted so far during this BUILD attempt,
    /// child-before-parent, running its cleanups exactly as a normal
    /// unmount would. Called when the attempt aborts instead of committing.
    fn rollback_fresh_mounts(&mut self) {
        for scope_id in self.mounted_this_build.drain(..).rev() {
            let removed = self.runtime.instances.borrow_mut().remove(scope_id);
            if let Some(instance) = removed {
                for cleanup in instance.cleanups.into_inner().into_iter().rev() {
                    cleanup();
                }
            }
        }
    }
}

impl<'a> ComponentHost for CommitHost<'a> {
    fn mount_component(
        &mut self,
        parent: Option<ScopeId>,
        node: &VComponent,
        next_id: &mut usize,
        out: &mut MutationList,
    ) -> (ScopeId, Mounted) {
        let scope_id = self
            .runtime
            .instances
            .borrow_mut()
            .insert(ComponentInstance::new(parent, node.props.clone()));
        self.mounted_this_build.push(scope_id);
        let scope = Scope {
            id: scope_id,
            runtime: self.runtime.clone(),
        };

        let element = render_scope(&scope, node.props.as_ref());
        let placeholder = VNode::Placeholder;
        let tree_ref = element.as_ref().unwrap_or(&placeholder);
        let rendered = mount::mount_node(self, next_id, out, tree_ref, Some(scope_id));

        let instances = self.runtime.instances.borrow();
        if let Some(instance) = instances.get(scope_id) {
            *instance.last_tree.borrow_mut() = element;
        }
        drop(instances);

        out.dirty_scopes.insert(scope_id);
        (scope_id, rendered)
    }

    fn update_component(
        &mut self,
        scope_id: ScopeId,
        node: &VComponent,
        rendered: &mut Mounted,
        next_id: &mut usize,
        out: &mut MutationList,
    ) {
        {
            let instances = self.runtime.instances.borrow();
            let Some(instance) = instances.get(scope_id) else {
                return;
            };
            *instance.props.borrow_mut() = node.props.clone();
        }

        let scope = Scope {
            id: scope_id,
            runtime: self.runtime.clone(),
        };
        let element = render_scope(&scope, node.props.as_ref());
        let placeholder = VNode::Placeholder;
        let tree_ref = element.as_ref().unwrap_or(&placeholder);
        mount::reconcile_node(self, next_id, out, rendered, tree_ref, Some(scope_id));

        let instances = self.runtime.instances.borrow();
        if let Some(instance) = instances.get(scope_id) {
            *instance.last_tree.borrow_mut() = element;
        }
        drop(instances);

        out.dirty_scopes.insert(scope_id);
    }

    fn unmount_component(&mut self, scope_id: ScopeId) {
        let removed = self.runtime.instances.borrow_mut().remove(scope_id);
        if let Some(instance) = removed {
            for cleanup in instance.cleanups.into_inner().into_iter().rev() {
                cleanup();
            }
        }
    }

    fn config(&self) -> &RuntimeConfig {
        &self.runtime.config
    }
}

/// Runs one render of `scope`, bracketed by the hook-cursor reset/finish
/// pair and the crate-global render-depth guard. A render panic is recorded
/// on the runtime and immediately re-raised as [`BuildAborted`] - the
/// caller's outermost `catch_unwind` (in [`build`] or
/// `VirtualDom::with_config_and_props`) is the only place that stops the
/// unwind, so no sibling or nested component past this point gets mounted,
/// reconciled, or has its cleanups run.
fn render_scope(scope: &Scope, props: &dyn crate::any_props::AnyProps) -> Element {
    scope.reset_hook_cursor();
    scope.runtime.enter_render();
    let outcome = scope
        .runtime
        .with_scope(scope.id, || props.render(scope));
    scope.runtime.leave_render();

    match outcome {
        RenderOutcome::Ready(element) => {
            scope.finish_render();
            element
        }
        RenderOutcome::Panicked(err) => {
            tracing::error!(scope = ?scope.id, error = %err, "component render failed, aborting build");
            scope.runtime.record_render_error(err);
            std::panic::panic_any(BuildAborted)
        }
    }
}

/// Runs the BUILD phase for one flush: pops jobs from the scheduler until
/// it's empty or `update_depth_limit` is exceeded for a single scope,
/// staging every mutation into a fresh [`MutationList`] rather than
/// applying anything.
///
/// On success, returns the staged batch. On an update-depth violation, the
/// batch accumulated so far is discarded (a failed BUILD commits
/// nothing) and the error is returned instead.
pub(crate) fn build(runtime: &Rc<Runtime>, next_id: &mut usize, roots: &mut [Mounted]) -> Result<MutationList, CoreError> {
    let mut out = MutationList::new();
    let mut host = CommitHost::new(runtime);
    let mut render_counts: rustc_hash::FxHashMap<ScopeId, u32> = rustc_hash::FxHashMap::default();
    let limit = runtime.config.update_depth_limit;

    runtime.scheduler.borrow_mut().flush_started();

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), CoreError> {
        loop {
            let job = runtime.scheduler.borrow_mut().pop();
            let Some(job) = job else { break };
            match job {
                crate::scheduler::Job::Render(scope_id) => {
                    let count = render_counts.entry(scope_id).or_insert(0);
                    *count += 1;
                    if *count > limit {
                        return Err(CoreError::UpdateDepthExceeded { scope: scope_id, limit });
                    }
                    rerender_scope(&mut host, runtime, scope_id, next_id, &mut out, roots);
                }
                crate::scheduler::Job::PollTask(task_id) => {
                    runtime.poll_task(task_id);
                }
            }
        }
        Ok(())
    }));

    match outcome {
        Ok(Ok(())) => Ok(out),
        Ok(Err(err)) => {
            host.rollback_fresh_mounts();
            Err(err)
        }
        // A render aborted the pass via `BuildAborted`; the real error is
        // whatever `render_scope` recorded just before unwinding. Anything
        // else unwinding through here is a genuine bug, not a render
        // exception, and keeps propagating rather than being swallowed.
        Err(payload) => match runtime.take_render_error() {
            Some(err) => {
                host.rollback_fresh_mounts();
                Err(err)
            }
            None => std::panic::resume_unwind(payload),
        },
    }
}

/// Finds `scope_id` inside the mounted root forest and reconciles it in
/// place against a fresh render of its current props. A scope that has
/// since unmounted (its re-render was scheduled, then a parent removed it
/// before the flush reached it) is silently skipped.
fn rerender_scope(
    host: &mut CommitHost<'_>,
    runtime: &Rc<Runtime>,
    scope_id: ScopeId,
    next_id: &mut usize,
    out: &mut MutationList,
    roots: &mut [Mounted],
) {
    if !runtime.instances.borrow().contains(scope_id) {
        return;
    }
    for root in roots.iter_mut() {
        if find_and_update(host, runtime, scope_id, next_id, out, root) {
            return;
        }
    }
}

/// Walks a mounted tree looking for `scope_id`'s `Mounted::Component` node
/// and, once found, re-renders and reconciles it via
/// `ComponentHost::update_component` - the same path a structural diff
/// would have taken, just entered directly instead of from a parent's
/// reconcile pass.
fn find_and_update(
    host: &mut CommitHost<'_>,
    runtime: &Rc<Runtime>,
    scope_id: ScopeId,
    next_id: &mut usize,
    out: &mut MutationList,
    mounted: &mut Mounted,
) -> bool {
    match mounted {
        Mounted::Component { scope, rendered, .. } if *scope == scope_id => {
            let instances = runtime.instances.borrow();
            let Some(instance) = instances.get(scope_id) else {
                return true;
            };
            let props = instance.props.borrow().clone();
            drop(instances);
            let comp = VComponent::new(props, None);
            host.update_component(scope_id, &comp, rendered, next_id, out);
            true
        }
        Mounted::Component { rendered, .. } => {
            find_and_update(host, runtime, scope_id, next_id, out, rendered)
        }
        Mounted::Fragment { children } => children
            .iter_mut()
            .any(|c| find_and_update(host, runtime, scope_id, next_id, out, c)),
        Mounted::Element { children, .. } => children
            .iter_mut()
            .any(|c| find_and_update(host, runtime, scope_id, next_id, out, c)),
        _ => false,
    }
}

/// Replays a staged batch against a live sink - the COMMIT half. Kept as a
/// thin wrapper over [`MutationList::apply`] so call sites read the
/// BUILD/COMMIT split directly off this module.
pub(crate) fn commit(batch: &MutationList, sink: &mut dyn crate::mutations::WriteMutations) {
    batch.apply(sink);
}
