//! Reconciling a single element across renders: unchanged text/attributes
//! emit nothing, changed ones emit the minimal edit, and a changed tag
//! replaces the node wholesale (`VNode::same_shape`).

use std::cell::RefCell;
use weave_core::{AttributeValue, Element, Mutation, Scope, StateCell, VElement, VNode};

thread_local! {
    static COUNTER: RefCell<Option<StateCell<i32>>> = RefCell::new(None);
}

fn counter_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, 0i32));
    let cell = hook.with(Clone::clone);
    COUNTER.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let value = cell.get();
    Some(VNode::Element(VElement::new("h1").with_children(vec![VNode::Text(
        format!("hello {value}").into(),
    )])))
}

#[test]
fn text_diff_emits_set_text_only_on_the_changed_node() {
    let mut vdom = weave_core::VirtualDom::new(counter_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    for n in 1..=3 {
        recorder.edits.clear();
        COUNTER.with(|c| c.borrow().as_ref().unwrap().set(n));
        vdom.render(&mut recorder).unwrap();
        assert_eq!(
            recorder.edits,
            vec![Mutation::SetText { id: weave_core::ElementId(1), value: format!("hello {n}") }]
        );
    }
}

thread_local! {
    static TAG: RefCell<Option<StateCell<bool>>> = RefCell::new(None);
}

fn swapping_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, false));
    let cell = hook.with(Clone::clone);
    TAG.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let tag = if cell.get() { "h2" } else { "h1" };
    Some(VNode::Element(VElement::new(tag)))
}

#[test]
fn element_swap_replaces_the_node_when_the_tag_changes() {
    let mut vdom = weave_core::VirtualDom::new(swapping_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(
        recorder.count(|m| matches!(m, Mutation::CreateElement { tag, .. } if &**tag == "h1")),
        1
    );

    recorder.edits.clear();
    TAG.with(|c| c.borrow().as_ref().unwrap().set(true));
    vdom.render(&mut recorder).unwrap();
    assert!(recorder
        .edits
        .iter()
        .any(|m| matches!(m, Mutation::CreateElement { tag, .. } if &**tag == "h2")));
    assert!(recorder.edits.iter().any(|m| matches!(m, Mutation::ReplaceWith { .. })));

    // Setting back to the same tag as before mounts a brand new node - it
    // doesn't reuse the one from the first render.
    recorder.edits.clear();
    TAG.with(|c| c.borrow().as_ref().unwrap().set(false));
    vdom.render(&mut recorder).unwrap();
    assert!(recorder
        .edits
        .iter()
        .any(|m| matches!(m, Mutation::CreateElement { tag, .. } if &**tag == "h1")));
}

thread_local! {
    static ATTR: RefCell<Option<StateCell<bool>>> = RefCell::new(None);
}

fn attr_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, false));
    let cell = hook.with(Clone::clone);
    ATTR.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let mut el = VElement::new("div");
    if cell.get() {
        el = el.with_attr("disabled", AttributeValue::Bool(true));
    }
    Some(VNode::Element(el))
}

#[test]
fn attribute_added_then_removed_across_renders() {
    let mut vdom = weave_core::VirtualDom::new(attr_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(recorder.count(|m| matches!(m, Mutation::SetAttribute { .. })), 0);

    recorder.edits.clear();
    ATTR.with(|c| c.borrow().as_ref().unwrap().set(true));
    vdom.render(&mut recorder).unwrap();
    assert_eq!(
        recorder.edits,
        vec![Mutation::SetAttribute {
            id: weave_core::ElementId(0),
            name: "disabled".into(),
            value: AttributeValue::Bool(true),
        }]
    );

    recorder.edits.clear();
    ATTR.with(|c| c.borrow().as_ref().unwrap().set(false));
    vdom.render(&mut recorder).unwrap();
    assert_eq!(
        recorder.edits,
        vec![Mutation::RemoveAttribute { id: weave_core::ElementId(0), name: "disabled".into() }]
    );
}
