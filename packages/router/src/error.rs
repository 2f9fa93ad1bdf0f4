//! Error surface for the router collaborator.

use thiserror::Error;

/// Errors `weave-router`'s hooks and builder can raise. The core itself
/// never returns these - they describe misuse of the router collaborator,
/// not a core invariant violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// `use_navigator`/`use_route` were called from a component not mounted
    /// underneath [`weave_core::create_spa`] (or
    /// [`weave_core::create_spa_with_config`]).
    #[error(
        "no Navigator found above this component; mount the route table with \
         weave_core::create_spa or create_spa_with_config"
    )]
    NotInsideRouter,
}
