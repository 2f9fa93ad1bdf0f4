//! Component teardown runs cleanups bottom-up: a child's `on_cleanup`
//! callback fires before its parent's, the same order `mount::unmount`
//! walks a tree it's tearing down.

use std::cell::RefCell;
use weave_core::{Element, Scope, StateCell, VComponent, VElement, VNode};

thread_local! {
    static LOG: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
    static TOGGLE: RefCell<Option<StateCell<bool>>> = RefCell::new(None);
}

fn log(label: &'static str) {
    LOG.with(|l| l.borrow_mut().push(label));
}

#[derive(Clone, PartialEq)]
struct Label(&'static str);

fn child(props: Label, scope: &Scope) -> Element {
    let label = props.0;
    scope.on_cleanup(move || log(label));
    Some(VNode::Element(VElement::new("span")))
}

fn parent(_props: Label, scope: &Scope) -> Element {
    scope.on_cleanup(|| log("parent"));
    Some(VNode::Element(VElement::new("div").with_children(vec![VNode::Component(
        VComponent::component(child, |a, b| a == b, Label("child"), "child", None),
    )])))
}

fn root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, true));
    let cell = hook.with(Clone::clone);
    TOGGLE.with(|c| *c.borrow_mut() = Some(cell.clone()));
    if cell.get() {
        Some(VNode::Component(VComponent::component(parent, |a, b| a == b, Label("parent"), "parent", None)))
    } else {
        Some(VNode::Element(VElement::new("div")))
    }
}

fn toggle(value: bool) {
    TOGGLE.with(|c| c.borrow().as_ref().unwrap().set(value));
}

#[test]
fn unmounting_a_subtree_runs_child_cleanup_before_parent_cleanup() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert!(LOG.with(|l| l.borrow().is_empty()));

    toggle(false);
    vdom.render(&mut recorder).unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["child", "parent"]);
}

#[test]
fn remounting_after_unmount_runs_fresh_cleanups_on_the_next_teardown() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    toggle(false);
    vdom.render(&mut recorder).unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["child", "parent"]);

    LOG.with(|l| l.borrow_mut().clear());
    toggle(true);
    vdom.render(&mut recorder).unwrap();
    assert!(LOG.with(|l| l.borrow().is_empty()));

    toggle(false);
    vdom.render(&mut recorder).unwrap();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["child", "parent"]);
}

#[test]
fn shutdown_runs_every_live_scopes_cleanup_bottom_up() {
    LOG.with(|l| l.borrow_mut().clear());
    let vdom = weave_core::VirtualDom::new(root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    vdom.shutdown();
    assert_eq!(LOG.with(|l| l.borrow().clone()), vec!["child", "parent"]);
}
