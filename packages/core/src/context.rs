//! Dynamically scoped context propagation.
//!
//! A component provides a value with [`crate::instance::Scope::provide_context`];
//! any descendant resolves it with `consume_context` by walking up the
//! ancestor chain until a provider is found.
//!
//! Resolution also needs to keep working from *inside* a resource's
//! continuation after it resumes on a later poll - by then the render call
//! stack that made the ancestor chain available has long since unwound. A
//! [`ContextFrame`] is a snapshot of that chain captured at the moment the
//! resource's future is created, and [`ContextFrame::reinstall`] makes it
//! available again for the duration of a closure, by overriding what
//! [`crate::runtime::Runtime::current_scope_id`] reports.

use crate::arena::ScopeId;
use crate::runtime::Runtime;
use std::rc::Rc;

/// A captured ancestor chain, root-first, ending at the scope that captured
/// it. Cheap to clone: the chain itself is shared behind an `Rc`.
#[derive(Clone)]
pub struct ContextFrame {
    chain: Rc<Vec<ScopeId>>,
}

impl ContextFrame {
    /// Captures the current ancestor chain of `scope` for later
    /// reinstallation.
    pub fn capture(runtime: &Runtime, scope: ScopeId) -> Self {
        Self {
            chain: Rc::new(runtime.ancestor_chain(scope)),
        }
    }

    pub(crate) fn owner(&self) -> Option<ScopeId> {
        self.chain.last().copied()
    }

    /// Runs `f` with this frame's ancestor chain installed as the
    /// "current" scope stack, restoring whatever was installed before on
    /// return (including a plain render-time scope stack, if nothing else
    /// had overridden it).
    pub fn reinstall<R>(&self, runtime: &Runtime, f: impl FnOnce() -> R) -> R {
        let previous = runtime.scope_stack_override.replace(Some(self.chain.clone()));
        let result = f();
        *runtime.scope_stack_override.borrow_mut() = previous;
        result
    }
}
