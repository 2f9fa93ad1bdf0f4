//! The top-level handle a host application drives.
//!
//! Built around this core's BUILD/COMMIT split ([`crate::commit`]):
//! `rebuild` primes a fresh document backend with the tree's initial
//! markup, `render` drains whatever the scheduler has queued and applies
//! the resulting batch through a [`WriteMutations`] sink in one COMMIT.
//! There is no deadline parameter - the scheduler is strictly
//! FIFO-to-completion within a flush, not cooperatively time-sliced.

use crate::any_props::VProps;
use crate::arena::ScopeId;
use crate::commit::{self, CommitHost};
use crate::config::RuntimeConfig;
use crate::error::CoreError;
use crate::events::{call_listener, UiEvent};
use crate::instance::Scope;
use crate::mount::{self, ComponentHost, Mounted};
use crate::mutations::{Mutation, MutationList, NoOpMutations, WriteMutations};
use crate::nodes::{AttributeValue, Element, VComponent};
use crate::runtime::{Runtime, RuntimeGuard};
use std::rc::Rc;

/// Adapter letting a zero-prop root function (`fn(&Scope) -> Element`) ride
/// through `VProps<P>`, which needs a genuine function pointer (not a
/// capturing closure) for its `render_fn` field. Shared with
/// `crate::hydrate`/`crate::island`, which hit the same need mounting a
/// zero-prop root.
#[derive(Clone, Copy)]
pub(crate) struct RootThunk(pub(crate) fn(&Scope) -> Element);

pub(crate) fn call_root_thunk(thunk: RootThunk, scope: &Scope) -> Element {
    (thunk.0)(scope)
}

/// Owns one mounted component tree and the runtime driving it.
pub struct VirtualDom {
    runtime: Rc<Runtime>,
    next_id: usize,
    root: Mounted,
}

impl VirtualDom {
    /// Mounts `root` (a zero-prop root component - nested components
    /// receive their props the ordinary way, through their parent's
    /// render) using the default runtime configuration.
    ///
    /// A render panic anywhere in the initial tree aborts the whole mount:
    /// no instance from this attempt survives and the caller receives the
    /// error instead of a partially built tree.
    pub fn new(root: fn(&Scope) -> Element) -> Result<Self, CoreError> {
        Self::with_config(root, RuntimeConfig::default())
    }

    pub fn with_config(root: fn(&Scope) -> Element, config: RuntimeConfig) -> Result<Self, CoreError> {
        Self::with_config_and_props(call_root_thunk, RootThunk(root), config)
    }

    /// Mounts a root component that takes props, for host entry points
    /// (`create_spa`) that need to pass a route table or similar
    /// configuration in rather than closing over it.
    pub fn new_with_props<P: Clone + 'static>(
        root: fn(P, &Scope) -> Element,
        props: P,
    ) -> Result<Self, CoreError> {
        Self::with_config_and_props(root, props, RuntimeConfig::default())
    }

    pub fn with_config_and_props<P: Clone + 'static>(
        root: fn(P, &Scope) -> Element,
        props: P,
        config: RuntimeConfig,
    ) -> Result<Self, CoreError> {
        let runtime = Runtime::new(config);
        let mut next_id = 0usize;
        let mut out = MutationList::new();
        let root_props = VProps::new(root, |_, _| false, props, "root");
        let comp = VComponent::new(Rc::new(root_props), None);
        let mut host = CommitHost::new(&runtime);

        // A render panic anywhere in the initial tree unwinds straight out
        // of `mount_component` (see `commit::render_scope`); caught here so
        // the caller gets a `CoreError` instead of the panic itself. Since
        // `runtime` never escapes this function on that path, every
        // instance created during the aborted attempt is dropped with it -
        // no explicit rollback needed, unlike a later flush's `commit::build`.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            host.mount_component(None, &comp, &mut next_id, &mut out)
        }));

        if let Some(err) = runtime.take_render_error() {
            return Err(err);
        }

        let (_, mounted) = result.unwrap_or_else(|payload| std::panic::resume_unwind(payload));

        Ok(Self {
            runtime,
            next_id,
            root: mounted,
        })
    }

    pub fn runtime(&self) -> &Rc<Runtime> {
        &self.runtime
    }

    /// Assembles a `VirtualDom` around a tree [`crate::hydrate`] already
    /// matched against an existing document - no further mount work is
    /// needed, unlike [`VirtualDom::with_config`].
    pub(crate) fn from_hydrated(runtime: Rc<Runtime>, next_id: usize, root: Mounted) -> Self {
        Self { runtime, next_id, root }
    }

    /// Replays the tree's current shape into `sink` - used to prime a
    /// fresh document backend with the initial markup before any flush
    /// has happened.
    pub fn rebuild(&self, sink: &mut dyn WriteMutations) {
        let mut out = MutationList::new();
        append_initial(&mut out, &self.root);
        out.apply(sink);
    }

    /// Whether a flush would currently have anything to do.
    pub fn has_pending_work(&self) -> bool {
        !self.runtime.scheduler.borrow().is_empty()
    }

    /// The scheduler's current flush version - bumped once per completed
    /// `render`/`flush_silently` call. Callers (chiefly tests) can capture
    /// this before triggering work and pass a later target to
    /// [`VirtualDom::wait_for_flush`].
    pub fn flush_version(&self) -> u64 {
        self.runtime.flush_version()
    }

    /// Blocks until the scheduler's flush version reaches `target_version`,
    /// or returns `CoreError::FlushTimeout` once `timeout` elapses first.
    ///
    /// This core's `render` is synchronous and single-threaded - nothing
    /// advances the flush version except a `render`/`flush_silently` call
    /// the caller itself makes, so in every ordinary use this either
    /// succeeds immediately (the target flush already ran) or times out
    /// (it hasn't, and this call has no way to make it happen on its own).
    /// It exists for parity with the scheduler's public contract: tests
    /// that drive flushes from a timer or another thread against a shared
    /// `Runtime` can still observe the version advance without polling by
    /// hand.
    pub fn wait_for_flush(&self, target_version: u64, timeout: std::time::Duration) -> Result<(), CoreError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let current = self.runtime.flush_version();
            if current >= target_version {
                return Ok(());
            }
            if std::time::Instant::now() >= deadline {
                return Err(CoreError::FlushTimeout {
                    target_version,
                    current_version: current,
                });
            }
            std::thread::yield_now();
        }
    }

    /// Runs one BUILD/COMMIT cycle: drains every job the scheduler has
    /// queued, computing the minimal mutation batch, then applies it to
    /// `sink` in a single pass. On an update-depth violation the whole
    /// batch is rolled back - `sink` observes nothing - and the error is
    /// returned (`UpdateDepthExceeded`).
    pub fn render(&mut self, sink: &mut dyn WriteMutations) -> Result<(), CoreError> {
        let _guard = RuntimeGuard::new(self.runtime.clone());
        let prior_root = self.root.clone();
        let placeholder = Mounted::Placeholder { id: crate::arena::ElementId(0) };
        let mut roots = [std::mem::replace(&mut self.root, placeholder)];
        let result = commit::build(&self.runtime, &mut self.next_id, &mut roots);
        let [root] = roots;

        match result {
            Ok(batch) => {
                self.root = root;
                commit::commit(&batch, sink);
                Ok(())
            }
            Err(err) => {
                // Discard whatever partial tree this aborted BUILD produced
                // and restore the mapping from before the attempt - the
                // staged mutation batch was already dropped with `result`,
                // so the document never saw any of it either.
                self.root = prior_root;
                Err(err)
            }
        }
    }

    /// Runs `render` against a sink that discards every mutation - used by
    /// server-side rendering, which only needs the dirty-scope bookkeeping
    /// a flush performs, not a document to write into.
    pub fn flush_silently(&mut self) -> Result<(), CoreError> {
        let mut sink = NoOpMutations;
        self.render(&mut sink)
    }

    /// Dispatches a UI event to the listener registered for `event.name`
    /// on `event.target`, bubbling up through ancestor elements until one
    /// is found or the root is reached. Panics inside the listener are
    /// caught ([`call_listener`]) so a bad handler can't take down the
    /// dispatch.
    pub fn handle_event(&mut self, event: UiEvent) {
        let _guard = RuntimeGuard::new(self.runtime.clone());
        dispatch(&self.root, &event);
    }

    /// Unmounts the whole tree, running every component's cleanup
    /// callbacks bottom-up.
    pub fn shutdown(mut self) {
        let mut out = MutationList::new();
        let mut host = CommitHost::new(&self.runtime);
        let placeholder = Mounted::Placeholder { id: crate::arena::ElementId(0) };
        let root = std::mem::replace(&mut self.root, placeholder);
        mount::unmount(&mut host, &mut out, root, false);
    }

    pub(crate) fn scopes(&self) -> rustc_hash::FxHashSet<ScopeId> {
        let mut set = rustc_hash::FxHashSet::default();
        mount::scopes_in(&self.root, &mut set);
        set
    }
}

fn append_initial(out: &mut MutationList, mounted: &Mounted) {
    match mounted {
        Mounted::Element { id, tag, attrs, children } => {
            out.edits.push(Mutation::CreateElement { id: *id, tag: tag.clone() });
            for attr in attrs {
                out.edits.push(Mutation::SetAttribute {
                    id: *id,
                    name: attr.name.clone(),
                    value: attr.value.clone(),
                });
            }
            for child in children {
                append_initial(out, child);
                out.edits.push(Mutation::AppendChild {
                    parent: *id,
                    child: child.anchor_id(),
                });
            }
        }
        Mounted::Text { id, text } => {
            out.edits.push(Mutation::CreateText { id: *id, value: text.to_string() });
        }
        Mounted::Placeholder { id } => {
            out.edits.push(Mutation::CreatePlaceholder { id: *id });
        }
        Mounted::Fragment { children } => {
            for child in children {
                append_initial(out, child);
            }
        }
        Mounted::Component { rendered, .. } => append_initial(out, rendered),
    }
}

fn dispatch(mounted: &Mounted, event: &UiEvent) -> bool {
    let Some(path) = target_path(mounted, event.target) else {
        return false;
    };
    // `path` runs target-first, root-last - exactly the order DOM bubbling
    // walks a listener search in, so the first matching listener found
    // along it is also the nearest one to the target.
    for node in path {
        if let Mounted::Element { attrs, .. } = node {
            if let Some(attr) = attrs.iter().find(|a| {
                matches!(&a.value, AttributeValue::Listener { event: name, .. } if *name == event.name)
            }) {
                if let AttributeValue::Listener { handler, .. } = &attr.value {
                    call_listener(handler, event);
                }
                return true;
            }
        }
    }
    false
}

/// Finds `target` within `mounted` and returns the chain of elements from
/// the target up to (but not including past) `mounted` itself, target
/// first. `None` if `target` isn't inside this subtree at all.
fn target_path<'a>(mounted: &'a Mounted, target: crate::arena::ElementId) -> Option<Vec<&'a Mounted>> {
    match mounted {
        Mounted::Element { id, children, .. } => {
            if *id == target {
                return Some(vec![mounted]);
            }
            for child in children {
                if let Some(mut path) = target_path(child, target) {
                    path.push(mounted);
                    return Some(path);
                }
            }
            None
        }
        Mounted::Fragment { children } => children.iter().find_map(|c| target_path(c, target)),
        Mounted::Component { rendered, .. } => target_path(rendered, target),
        Mounted::Text { id, .. } | Mounted::Placeholder { id } => {
            (*id == target).then(|| vec![mounted])
        }
    }
}
