//! The one-time route table registration lock.
//!
//! A real app builds its route table exactly once, early in startup, and
//! never rebuilds it afterward; [`RouteTableBuilder::build`] enforces that
//! by panicking on a second call. Tests build a fresh table per test case,
//! so the lock exposes a crate-internal escape hatch rather than a public
//! reset API, kept `#[cfg(test)]`-only.

use std::cell::Cell;

thread_local! {
    static REGISTERED: Cell<bool> = Cell::new(false);
}

/// Panics if the route table has already been registered once.
pub(crate) fn lock() {
    REGISTERED.with(|registered| {
        if registered.replace(true) {
            panic!(
                "weave-router: route table already registered; RouteTableBuilder::build may \
                 only be called once per process during app startup"
            );
        }
    });
}

#[cfg(test)]
pub(crate) fn unlock_for_test() {
    REGISTERED.with(|registered| registered.set(false));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lock_without_unlock_panics() {
        unlock_for_test();
        lock();
        let result = std::panic::catch_unwind(|| lock());
        assert!(result.is_err());
        unlock_for_test();
    }

    #[test]
    fn unlock_for_test_allows_relocking() {
        unlock_for_test();
        lock();
        unlock_for_test();
        lock();
        unlock_for_test();
    }
}
