//! Error taxonomy for the reactive core.
//!
//! Every fallible boundary described by the system's error handling design
//! surfaces one of these variants. Internal invariant violations (hook-order
//! breaks, stale generation reads that slip past debug assertions) panic
//! instead of returning an error, since they indicate a bug in a component
//! rather than a recoverable runtime condition.

use crate::arena::ScopeId;
use std::fmt;

/// Errors that can occur while driving the virtual DOM.
#[derive(thiserror::Error, Debug, Clone)]
pub enum CoreError {
    /// A component read past the end of its previous render's hook list, or
    /// skipped a hook that a previous render observed - a violation of the
    /// rule that hook calls for a given component must appear in the same
    /// order on every render.
    #[error("hook order violated in component {scope:?}: {detail}")]
    HookOrderViolation { scope: ScopeId, detail: String },

    /// A component's render function panicked. The panic is caught so that
    /// sibling subtrees are unaffected; the component keeps its last
    /// successfully rendered tree (or a placeholder, if it has none).
    #[error("component {scope:?} panicked while rendering: {detail}")]
    ComponentPanicked { scope: ScopeId, detail: String },

    /// A state cell was written to from inside a render function (BUILD
    /// phase). Only event handlers, effects and resource continuations may
    /// schedule writes.
    #[error("state write attempted during render in component {scope:?}")]
    WriteDuringRender { scope: ScopeId },

    /// A resource cell's continuation resumed after a newer generation had
    /// already started, and the result was discarded.
    #[error("stale resource generation discarded: cell produced generation {produced}, current is {current}")]
    StaleResourceGeneration { produced: u64, current: u64 },

    /// `render(ssr = true)` encountered a resource with no synchronously
    /// available value and no entry in the supplied data map.
    #[error("resource `{key}` has no synchronous value available for server-side rendering")]
    SsrDataMissing { key: String },

    /// The scheduler's flush loop exceeded its re-render depth guard,
    /// almost always caused by a component scheduling an unconditional
    /// update to itself every render.
    #[error("update depth exceeded: component {scope:?} scheduled more than {limit} updates within a single flush")]
    UpdateDepthExceeded { scope: ScopeId, limit: u32 },

    /// The BUILD phase produced a mutation batch but the COMMIT phase failed
    /// to apply it to the document; the whole batch was rolled back so the
    /// document is left exactly as it was before the flush began.
    #[error("commit failed and was rolled back: {detail}")]
    CommitFailed { detail: String },

    /// `create_spa` was called with an empty route table.
    #[error("cannot create a single-page application with an empty route table")]
    EmptyRouteTable,

    /// A context value was requested by type but no ancestor scope provided
    /// one.
    #[error("no context of the requested type is available above component {scope:?}")]
    ContextNotFound { scope: ScopeId },

    /// Hydration was asked to reconcile the document's initial markup with a
    /// tree that does not describe the same shape at some node.
    #[error("hydration mismatch at path {path}: {detail}")]
    HydrationMismatch { path: String, detail: String },

    /// [`crate::virtual_dom::VirtualDom::wait_for_flush`] timed out before
    /// the scheduler's flush version reached the requested target.
    #[error("timed out waiting for flush version {target_version}: current version is {current_version}")]
    FlushTimeout { target_version: u64, current_version: u64 },
}

/// A lightweight path used to describe where in a mount tree a hydration
/// mismatch or diff conflict occurred, printed as dot-separated child
/// indices (`0.2.1`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(pub Vec<usize>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
