//! `use_navigator`/`use_route`: thin wrappers over the [`Navigator`] context
//! [`weave_core::create_spa`]'s root component provides. The router exposes
//! `navigate(path)` and `route()` to read the current route snapshot; it is
//! implemented as an ordinary component consuming state cells.

use crate::error::RouterError;
use std::rc::Rc;
use weave_core::{Navigator, Scope};

/// Looks up the [`Navigator`] provided by the nearest ancestor
/// `create_spa`/`create_spa_with_config` root.
pub fn use_navigator(scope: &Scope) -> Result<Navigator, RouterError> {
    scope
        .consume_context::<Navigator>()
        .map(|navigator| (*navigator).clone())
        .ok_or(RouterError::NotInsideRouter)
}

/// The current route's path, as last set by `navigate`.
pub fn use_route(scope: &Scope) -> Result<Rc<str>, RouterError> {
    use_navigator(scope).map(|navigator| navigator.route())
}
