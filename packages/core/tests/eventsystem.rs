//! End-to-end event handling: a listener driving a state write schedules and
//! produces exactly the re-render that write implies, and dispatch against
//! an id nothing in the tree owns is a silent no-op rather than a panic
//! (`VirtualDom::handle_event`).

use std::cell::RefCell;
use weave_core::{AttributeValue, Element, Mutation, Scope, StateCell, UiEvent, VElement, VNode};

thread_local! {
    static COUNT: RefCell<Option<StateCell<i32>>> = RefCell::new(None);
}

fn counter_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, 0i32));
    let cell = hook.with(Clone::clone);
    COUNT.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let value = cell.get();
    Some(VNode::Element(
        VElement::new("button")
            .with_attr(
                "onclick",
                AttributeValue::Listener {
                    event: "click",
                    handler: std::rc::Rc::new(move |_| cell.set(value + 1)),
                },
            )
            .with_children(vec![VNode::Text(value.to_string().into())]),
    ))
}

#[test]
fn clicking_increments_counter_and_rerenders() {
    let mut vdom = weave_core::VirtualDom::new(counter_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 0);

    recorder.edits.clear();
    vdom.handle_event(UiEvent {
        target: weave_core::ElementId(0),
        name: "click",
        data: Box::new(()),
    });
    // The listener's write only schedules the follow-up render; it hasn't
    // happened yet.
    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 1);
    assert!(recorder.edits.is_empty());

    vdom.render(&mut recorder).unwrap();
    assert_eq!(recorder.edits, vec![Mutation::SetText { id: weave_core::ElementId(1), value: "1".into() }]);
}

#[test]
fn dispatching_an_unknown_target_is_a_silent_no_op() {
    let mut vdom = weave_core::VirtualDom::new(counter_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    vdom.handle_event(UiEvent {
        target: weave_core::ElementId(999),
        name: "click",
        data: Box::new(()),
    });
    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 0);
    assert!(!vdom.has_pending_work());
}

#[test]
fn dispatching_an_event_name_with_no_matching_listener_does_nothing() {
    let mut vdom = weave_core::VirtualDom::new(counter_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    vdom.handle_event(UiEvent {
        target: weave_core::ElementId(0),
        name: "mouseover",
        data: Box::new(()),
    });
    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 0);
    assert!(!vdom.has_pending_work());
}
