use futures_util::future::LocalBoxFuture;
use weave_core::{AbortSignal, ResourceCell, ResourceSnapshot, Scope};

/// A stable handle to a [`ResourceCell`], re-pointed at the producer's
/// current dependency tuple on every render.
#[derive(Clone)]
pub struct UseResource<T: 'static, E: 'static = String, D: 'static = ()> {
    cell: ResourceCell<T, E, D>,
}

impl<T: 'static, E: 'static, D: Clone + PartialEq + 'static> UseResource<T, E, D> {
    pub fn snapshot(&self) -> ResourceSnapshot<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.cell.snapshot()
    }

    pub fn refresh(&self) {
        self.cell.refresh();
    }
}

/// `let weather = use_resource(&scope, city.get(), |signal| async move { ... });`
///
/// `producer` is called again every time `deps` compares unequal to the
/// previous render's `deps` (including the very first render), matching
/// [`ResourceCell::update_deps`]. The returned handle's [`UseResource::snapshot`]
/// is what a component reads to drive its markup.
pub fn use_resource<T, E, D, F>(scope: &Scope, deps: D, producer: F) -> UseResource<T, E, D>
where
    T: 'static,
    E: 'static,
    D: Clone + PartialEq + 'static,
    F: Fn(AbortSignal) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
{
    let hook = scope.use_hook(|| ResourceCell::new(scope, deps.clone(), producer));
    let cell = hook.with(Clone::clone);
    cell.update_deps(deps);
    UseResource { cell }
}
