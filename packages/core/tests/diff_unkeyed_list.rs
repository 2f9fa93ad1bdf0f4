//! Positional (unkeyed) children diffing: same-length lists patch element-
//! wise, a shrinking list removes the tail, a growing list mounts and
//! appends the extra children (`diff_positional`).

use std::cell::RefCell;
use weave_core::{Element, Mutation, Scope, StateCell, VElement, VNode};

thread_local! {
    static ITEMS: RefCell<Option<StateCell<Vec<i32>>>> = RefCell::new(None);
}

fn list_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, vec![1, 2, 3]));
    let cell = hook.with(Clone::clone);
    ITEMS.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let items = cell.get();
    Some(VNode::Element(VElement::new("ul").with_children(
        items
            .into_iter()
            .map(|n| VNode::Element(VElement::new("li").with_children(vec![VNode::Text(n.to_string().into())])))
            .collect(),
    )))
}

fn set(items: Vec<i32>) {
    ITEMS.with(|c| c.borrow().as_ref().unwrap().set(items));
}

#[test]
fn same_length_list_patches_each_child_in_place() {
    let mut vdom = weave_core::VirtualDom::new(list_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    recorder.edits.clear();
    set(vec![1, 20, 3]);
    vdom.render(&mut recorder).unwrap();
    // Only the middle <li>'s text changes; no element is created, moved or
    // removed.
    assert_eq!(recorder.count(|m| matches!(m, Mutation::SetText { .. })), 1);
    assert_eq!(recorder.count(|m| matches!(m, Mutation::CreateElement { .. })), 0);
    assert_eq!(recorder.count(|m| matches!(m, Mutation::Remove { .. })), 0);
}

#[test]
fn shrinking_list_removes_the_tail() {
    let mut vdom = weave_core::VirtualDom::new(list_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    recorder.edits.clear();
    set(vec![1]);
    vdom.render(&mut recorder).unwrap();
    // Two <li> elements removed, nothing created.
    assert_eq!(recorder.count(|m| matches!(m, Mutation::Remove { .. })), 2);
    assert_eq!(recorder.count(|m| matches!(m, Mutation::CreateElement { .. })), 0);
}

#[test]
fn growing_list_appends_the_new_tail() {
    let mut vdom = weave_core::VirtualDom::new(list_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    recorder.edits.clear();
    set(vec![1, 2, 3, 4, 5]);
    vdom.render(&mut recorder).unwrap();
    let created = recorder.count(|m| matches!(m, Mutation::CreateElement { tag, .. } if &**tag == "li"));
    assert_eq!(created, 2);
    assert_eq!(recorder.count(|m| matches!(m, Mutation::AppendChild { .. })), 4); // 2 <li> + 2 text children
    assert_eq!(recorder.count(|m| matches!(m, Mutation::Remove { .. })), 0);
}

#[test]
fn emptying_the_list_removes_every_child() {
    let mut vdom = weave_core::VirtualDom::new(list_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);

    recorder.edits.clear();
    set(Vec::new());
    vdom.render(&mut recorder).unwrap();
    assert_eq!(recorder.count(|m| matches!(m, Mutation::Remove { .. })), 3);
}
