//! Assembling a route table.
//!
//! What this DOM-less core actually needs is a flat, ordered list of
//! `(path, component)` pairs matched exactly against
//! [`weave_core::Navigator::route`].

use crate::registration;
use std::rc::Rc;
use weave_core::{Element, Route, Scope};

/// Builds a [`Route`] table, one entry at a time, then locks it against
/// rebuilding.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers `path` as matching `component`. Earlier calls take
    /// precedence: if two routes share a path, the first one registered
    /// wins, matching the "first match" rule `spa_root` applies.
    pub fn route(mut self, path: impl Into<Rc<str>>, component: fn(&Scope) -> Element) -> Self {
        self.routes.push(Route::new(path, component));
        self
    }

    /// Finalizes the table, locking it against a second registration for
    /// the lifetime of the process.
    pub fn build(self) -> Vec<Route> {
        registration::lock();
        self.routes
    }
}

/// Starts a fresh route table builder.
pub fn routes() -> RouteTableBuilder {
    RouteTableBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::unlock_for_test;
    use weave_core::VNode;

    fn home(_scope: &Scope) -> Element {
        Some(VNode::Text("home".into()))
    }

    fn about(_scope: &Scope) -> Element {
        Some(VNode::Text("about".into()))
    }

    #[test]
    fn build_collects_registered_routes_in_order() {
        unlock_for_test();
        let table = routes().route("/", home).route("/about", about).build();
        assert_eq!(table.len(), 2);
        assert_eq!(&*table[0].path, "/");
        assert_eq!(&*table[1].path, "/about");
        unlock_for_test();
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn building_twice_panics() {
        unlock_for_test();
        let _first = routes().route("/", home).build();
        let _second = routes().route("/", home).build();
    }
}
