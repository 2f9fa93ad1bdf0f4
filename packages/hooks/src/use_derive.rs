use std::cell::RefCell;
use weave_core::Scope;

/// `derive(...)`'s primary form: a value recomputed every render, with
/// access to what it computed last time (`None` on the first render).
///
/// This is not read-tracked the way [`weave_core::StateCell`] is - it has no
/// subscribers and no `set` - it simply folds over its own previous output,
/// without any dependency gate.
pub fn use_derive<V: Clone + 'static>(scope: &Scope, f: impl FnOnce(Option<&V>) -> V) -> V {
    let hook = scope.use_hook(|| RefCell::new(None::<V>));
    let prev = hook.with(|cell| cell.borrow().clone());
    let next = f(prev.as_ref());
    hook.with(|cell| *cell.borrow_mut() = Some(next.clone()));
    next
}

/// `derive(source, map)`'s sugar form: per-instance memoization of
/// `map(source)`, recomputed only when `source` compares unequal to the
/// value it was last called with - a per-instance cache keyed by the
/// source's identity, built here on top of [`use_derive`] rather than as a
/// second hook-slot primitive.
pub fn use_derive_from<S, V, F>(scope: &Scope, source: S, map: F) -> V
where
    S: PartialEq + Clone + 'static,
    V: Clone + 'static,
    F: FnOnce(&S) -> V,
{
    let hook = scope.use_hook(|| RefCell::new(None::<(S, V)>));
    let cached = hook.with(|cell| cell.borrow().clone());
    if let Some((cached_source, cached_value)) = &cached {
        if *cached_source == source {
            return cached_value.clone();
        }
    }
    let value = map(&source);
    hook.with(|cell| *cell.borrow_mut() = Some((source, value.clone())));
    value
}
