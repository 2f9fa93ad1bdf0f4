//! Router support for weave.
//!
//! This is deliberately thin: `weave-core::island` already provides
//! `Route`/`Navigator` and the `spa_root` component that matches the
//! current path against a route table, since the core needs that seam for
//! `create_spa`/`hydrate_spa` regardless of whether an app ever pulls in
//! this crate. What lives here is everything built *on top* of that seam -
//! an ergonomic table builder, `use_navigator`/`use_route` hooks, and a
//! `Link` component - none of which the core itself needs to know about.

mod builder;
mod error;
mod hooks;
mod link;
mod registration;

pub use builder::{routes, RouteTableBuilder};
pub use error::RouterError;
pub use hooks::{use_navigator, use_route};
pub use link::link;

pub use weave_core::{Navigator, Route};
