use weave_core::{Scope, StateCell};

/// A stable handle to a single [`StateCell`], the thin per-component
/// wrapper a component author actually calls `.get()`/`.set()` on.
#[derive(Clone)]
pub struct UseState<T: 'static> {
    cell: StateCell<T>,
}

impl<T: 'static> UseState<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        self.cell.set(value);
    }

    /// Reads then writes in one step, without an intermediate clone beyond
    /// what `f` itself needs.
    pub fn modify(&self, f: impl FnOnce(&T) -> T)
    where
        T: PartialEq,
    {
        let next = self.cell.with(f);
        self.cell.set(next);
    }
}

/// The per-instance counter hook: `let count = use_state(&scope, || 0);`.
///
/// `init` runs once, on the component's first render, the same
/// call-order-is-identity discipline as [`weave_core::Scope::use_hook`]
/// itself.
pub fn use_state<T: 'static>(scope: &Scope, init: impl FnOnce() -> T) -> UseState<T> {
    let hook = scope.use_hook(|| StateCell::new(scope, init()));
    UseState { cell: hook.with(Clone::clone) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use weave_core::{VElement, VNode};

    thread_local! {
        static HANDLE: RefCell<Option<UseState<i32>>> = RefCell::new(None);
    }

    fn counter(scope: &Scope) -> weave_core::Element {
        let count = use_state(scope, || 0i32);
        HANDLE.with(|h| *h.borrow_mut() = Some(count.clone()));
        Some(VNode::Element(VElement::new("div")))
    }

    #[test]
    fn use_state_persists_across_renders() {
        let mut vdom = weave_core::VirtualDom::new(counter).unwrap();
        let mut recorder = weave_testing::MutationRecorder::new();
        vdom.rebuild(&mut recorder);
        assert_eq!(HANDLE.with(|h| h.borrow().as_ref().unwrap().get()), 0);

        // Mutating from outside render (the way an event-handler closure
        // would) schedules exactly one follow-up render.
        HANDLE.with(|h| h.borrow().as_ref().unwrap().set(1));
        vdom.render(&mut recorder).unwrap();
        assert_eq!(HANDLE.with(|h| h.borrow().as_ref().unwrap().get()), 1);
    }
}
