//! Host-facing entry points: `create_island`/`create_spa`/`hydrate`/
//! `hydrate_spa`.
//!
//! Each of these hands back an owned [`VirtualDom`] plus whatever needed to
//! happen against the host's document to make the initial mount visible.
//! There is no separate `Island`/`Spa` wrapper type kept around afterwards -
//! a `VirtualDom` already is the single-ComponentInstance-owning handle the
//! host holds onto, so these functions are thin constructors rather than a
//! parallel API surface.

use crate::any_props::VProps;
use crate::arena::ElementId;
use crate::config::RuntimeConfig;
use crate::error::CoreError;
use crate::hydrate::{hydrate_root, HydrationSource};
use crate::instance::Scope;
use crate::mutations::WriteMutations;
use crate::nodes::{Element, VNode};
use crate::runtime::Runtime;
use crate::state::StateCell;
use crate::virtual_dom::VirtualDom;
use std::rc::Rc;

/// One entry of a single-page application's route table: a path matched
/// exactly against the current location, and the component mounted when it
/// matches. The router itself is an external collaborator; this struct is
/// the seam it's built on.
#[derive(Clone)]
pub struct Route {
    pub path: Rc<str>,
    pub component: fn(&Scope) -> Element,
}

impl Route {
    pub fn new(path: impl Into<Rc<str>>, component: fn(&Scope) -> Element) -> Self {
        Self { path: path.into(), component }
    }
}

/// Navigation context `create_spa`'s root component provides; `weave-router`
/// consumes it through [`Scope::consume_context`] to implement its
/// `navigate`/`route` surface without reaching into the scheduler directly.
#[derive(Clone)]
pub struct Navigator {
    current: StateCell<Rc<str>>,
}

impl Navigator {
    pub fn navigate(&self, path: impl Into<Rc<str>>) {
        self.current.set(path.into());
    }

    pub fn route(&self) -> Rc<str> {
        self.current.get()
    }
}

/// Mounts `component` as the sole instance of a fresh virtual tree and
/// replays its initial markup into `sink`. A render panic anywhere in
/// `component`'s tree aborts the mount entirely: no instance survives and
/// `sink` never observes a single mutation.
pub fn create_island(
    component: fn(&Scope) -> Element,
    sink: &mut dyn WriteMutations,
) -> Result<VirtualDom, CoreError> {
    create_island_with_config(component, RuntimeConfig::from_env(), sink)
}

pub fn create_island_with_config(
    component: fn(&Scope) -> Element,
    config: RuntimeConfig,
    sink: &mut dyn WriteMutations,
) -> Result<VirtualDom, CoreError> {
    let vdom = VirtualDom::with_config(component, config)?;
    vdom.rebuild(sink);
    Ok(vdom)
}

/// Mounts `routes` behind a minimal built-in router root and replays the
/// matching route's initial markup into `sink`. Requires a non-empty route
/// table.
pub fn create_spa(routes: Vec<Route>, sink: &mut dyn WriteMutations) -> Result<VirtualDom, CoreError> {
    create_spa_with_config(routes, RuntimeConfig::from_env(), sink)
}

pub fn create_spa_with_config(
    routes: Vec<Route>,
    config: RuntimeConfig,
    sink: &mut dyn WriteMutations,
) -> Result<VirtualDom, CoreError> {
    if routes.is_empty() {
        return Err(CoreError::EmptyRouteTable);
    }
    let props = SpaProps { routes: Rc::new(routes) };
    let vdom = VirtualDom::with_config_and_props(spa_root, props, config)?;
    vdom.rebuild(sink);
    Ok(vdom)
}

#[derive(Clone)]
struct SpaProps {
    routes: Rc<Vec<Route>>,
}

fn spa_root(props: SpaProps, scope: &Scope) -> Element {
    let initial = props.routes[0].path.clone();
    let hook = scope.use_hook(|| StateCell::new(scope, initial));
    let cell = hook.with(Clone::clone);
    let path = cell.get();
    scope.provide_context(Navigator { current: cell });

    let route = props
        .routes
        .iter()
        .find(|r| r.path == path)
        .unwrap_or(&props.routes[0]);
    (route.component)(scope)
}

/// Adopts an existing document subtree (produced by a prior SSR pass)
/// instead of creating one, attaching listeners and wiring up component
/// instances without moving any document nodes. A shape mismatch between
/// `component`'s render and `source`'s existing tree fails closed with
/// [`CoreError::HydrationMismatch`].
pub fn hydrate(
    component: fn(&Scope) -> Element,
    existing_root: ElementId,
    source: &dyn HydrationSource,
) -> Result<VirtualDom, CoreError> {
    hydrate_with_config(component, existing_root, source, RuntimeConfig::from_env())
}

pub fn hydrate_with_config(
    component: fn(&Scope) -> Element,
    existing_root: ElementId,
    source: &dyn HydrationSource,
    config: RuntimeConfig,
) -> Result<VirtualDom, CoreError> {
    let runtime = Runtime::new(config);
    let root_props = VProps::new(
        crate::virtual_dom::call_root_thunk,
        |_, _| false,
        crate::virtual_dom::RootThunk(component),
        "root",
    );
    let mut next_id = existing_root.0 + 1;
    let mounted = hydrate_root(&runtime, source, Rc::new(root_props), existing_root, &mut next_id)?;
    Ok(VirtualDom::from_hydrated(runtime, next_id, mounted))
}

/// `hydrateSPA({root, routes})`: hydrates a route table behind the same
/// built-in router root [`create_spa`] uses.
pub fn hydrate_spa(
    routes: Vec<Route>,
    existing_root: ElementId,
    source: &dyn HydrationSource,
) -> Result<VirtualDom, CoreError> {
    hydrate_spa_with_config(routes, existing_root, source, RuntimeConfig::from_env())
}

pub fn hydrate_spa_with_config(
    routes: Vec<Route>,
    existing_root: ElementId,
    source: &dyn HydrationSource,
    config: RuntimeConfig,
) -> Result<VirtualDom, CoreError> {
    if routes.is_empty() {
        return Err(CoreError::EmptyRouteTable);
    }
    let runtime = Runtime::new(config);
    let props = SpaProps { routes: Rc::new(routes) };
    let root_props = VProps::new(spa_root, |_, _| false, props, "root");
    let mut next_id = existing_root.0 + 1;
    let mounted = hydrate_root(&runtime, source, Rc::new(root_props), existing_root, &mut next_id)?;
    Ok(VirtualDom::from_hydrated(runtime, next_id, mounted))
}
