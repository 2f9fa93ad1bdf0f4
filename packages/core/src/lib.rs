//! The reactive core: VNode model, scheduler, component instances and
//! hooks, keyed reconciler, commit engine, resources and context.
//!
//! A host binding (a browser DOM backend, an SSR string builder, an
//! in-memory test harness) drives one [`VirtualDom`] by implementing
//! [`WriteMutations`] and feeding it [`UiEvent`]s; everything else - what
//! to render, when, and how to turn one tree into the next with the
//! fewest possible document edits - lives in this crate.

mod any_props;
mod arena;
mod commit;
mod config;
mod context;
mod diff;
mod error;
mod events;
mod fastlane;
mod hydrate;
mod instance;
mod island;
mod mount;
mod mutations;
mod nodes;
mod resource;
mod runtime;
mod scheduler;
mod state;
mod virtual_dom;
mod waker;

pub use crate::arena::{ElementId, ScopeId};
pub use crate::config::RuntimeConfig;
pub use crate::context::ContextFrame;
pub use crate::error::{CoreError, CoreResult, NodePath};
pub use crate::events::UiEvent;
pub use crate::hydrate::HydrationSource;
pub use crate::instance::{HookRef, Scope};
pub use crate::island::{
    create_island, create_island_with_config, create_spa, create_spa_with_config, hydrate,
    hydrate_spa, hydrate_spa_with_config, hydrate_with_config, Navigator, Route,
};
pub use crate::mutations::{Mutation, MutationList, NoOpMutations, WriteMutations};
pub use crate::nodes::{
    AttributeValue, Element, NodeKey, VAttribute, VComponent, VElement, VNode,
};
pub use crate::resource::{AbortSignal, ResourceCell, ResourceSnapshot};
pub use crate::runtime::{Runtime, RuntimeGuard};
pub use crate::state::StateCell;
pub use crate::virtual_dom::VirtualDom;

/// Re-exports the handful of types a component author touches on every
/// render: the scope handle, the node builders, the two hook-backing
/// cells, and the host-facing mutation protocol. `weave-hooks` builds its
/// `use_state`/`use_resource`/`use_derive` sugar on top of this surface.
pub mod prelude {
    pub use crate::{
        AttributeValue, CoreError, CoreResult, Element, NodeKey, ResourceCell, ResourceSnapshot,
        Scope, ScopeId, StateCell, VComponent, VElement, VNode, VirtualDom, WriteMutations,
    };
}
