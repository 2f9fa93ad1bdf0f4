//! Event dispatch bubbles from the targeted element up to the nearest
//! ancestor holding a matching listener, and a panicking listener doesn't
//! abort dispatch (`crate::events::call_listener`).

use std::cell::RefCell;
use std::rc::Rc;
use weave_core::{AttributeValue, Element, Scope, UiEvent, VElement, VNode};

thread_local! {
    static LOG: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
}

fn log(label: &'static str) {
    LOG.with(|l| l.borrow_mut().push(label));
}

fn nested_root(_scope: &Scope) -> Element {
    let inner = VElement::new("button")
        .with_attr("onclick", AttributeValue::Listener { event: "click", handler: Rc::new(|_| log("button")) });
    let outer = VElement::new("div")
        .with_attr("onclick", AttributeValue::Listener { event: "click", handler: Rc::new(|_| log("div")) })
        .with_children(vec![VNode::Element(inner)]);
    Some(VNode::Element(outer))
}

#[test]
fn click_on_the_button_only_invokes_the_buttons_listener() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(nested_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    // div = ElementId(0), button = ElementId(1), matching allocation order
    // in `mount_element`.
    vdom.handle_event(UiEvent { target: weave_core::ElementId(1), name: "click", data: Box::new(()) });
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["button"]);
}

fn unlistened_leaf_root(_scope: &Scope) -> Element {
    let inner = VElement::new("span");
    let outer = VElement::new("div")
        .with_attr("onclick", AttributeValue::Listener { event: "click", handler: Rc::new(|_| log("div")) })
        .with_children(vec![VNode::Element(inner)]);
    Some(VNode::Element(outer))
}

#[test]
fn click_on_a_child_with_no_listener_bubbles_to_the_ancestor() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(unlistened_leaf_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    vdom.handle_event(UiEvent { target: weave_core::ElementId(1), name: "click", data: Box::new(()) });
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["div"]);
}

fn panicking_root(_scope: &Scope) -> Element {
    Some(VNode::Element(VElement::new("button").with_attr(
        "onclick",
        AttributeValue::Listener {
            event: "click",
            handler: Rc::new(|_| {
                log("before panic");
                panic!("listener blew up");
            }),
        },
    )))
}

#[test]
fn a_panicking_listener_does_not_abort_dispatch() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(panicking_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    vdom.handle_event(UiEvent { target: weave_core::ElementId(0), name: "click", data: Box::new(()) });
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["before panic"]);
    // The VirtualDom itself is still usable afterward.
    vdom.render(&mut recorder).unwrap();
}
