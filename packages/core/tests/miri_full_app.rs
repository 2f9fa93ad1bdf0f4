//! A fuller integration scenario combining the pieces the narrower tests
//! exercise in isolation: a keyed list that reorders, grows and shrinks
//! across many renders in a row, where each item is itself a component
//! instance whose own state must survive a reorder by key rather than being
//! recreated.

use std::cell::{Cell, RefCell};
use weave_core::{Element, Scope, StateCell, VComponent, VElement, VNode};
use weave_testing::FakeDocument;

#[derive(Clone, PartialEq)]
struct ItemProps {
    id: u32,
}

/// Each item tracks how many times *it specifically* has rendered, in a
/// plain hook slot (not a `StateCell` - mutating one of those mid-render is
/// itself an invariant violation, and isn't what this counter needs: it
/// just wants storage that survives across this one instance's renders). If
/// the reconciler ever recreated an item instead of reusing it by key, this
/// counter would reset to zero instead of continuing to climb.
fn item(props: ItemProps, scope: &Scope) -> Element {
    let hook = scope.use_hook(|| Cell::new(0u32));
    let renders = hook.with(|c| c.get() + 1);
    hook.with(|c| c.set(renders));
    RENDER_COUNTS.with(|c| {
        c.borrow_mut().insert(props.id, renders);
    });
    Some(VNode::Element(VElement::new("li")))
}

thread_local! {
    static ITEMS: RefCell<Option<StateCell<Vec<u32>>>> = RefCell::new(None);
    static RENDER_COUNTS: RefCell<std::collections::HashMap<u32, u32>> = RefCell::new(std::collections::HashMap::new());
}

fn list_root(scope: &Scope) -> Element {
    let hook = scope.use_hook(|| StateCell::new(scope, vec![1u32, 2, 3, 4, 5]));
    let cell = hook.with(Clone::clone);
    ITEMS.with(|c| *c.borrow_mut() = Some(cell.clone()));
    let ids = cell.get();
    Some(VNode::Element(VElement::new("ul").with_children(
        ids.into_iter()
            .map(|id| {
                VNode::Component(VComponent::component(
                    item,
                    |a, b| a == b,
                    ItemProps { id },
                    "item",
                    Some((id as u64).into()),
                ))
            })
            .collect(),
    )))
}

fn set_items(ids: Vec<u32>) {
    ITEMS.with(|c| c.borrow().as_ref().unwrap().set(ids));
}

#[test]
fn repeated_reorder_grow_and_shrink_cycles_preserve_identity_and_stay_consistent() {
    RENDER_COUNTS.with(|c| c.borrow_mut().clear());
    let mut vdom = weave_core::VirtualDom::new(list_root).unwrap();
    let mut doc = FakeDocument::new();
    vdom.rebuild(&mut doc);

    let ul = weave_core::ElementId(0);
    assert_eq!(doc.children_of(ul).len(), 5);
    for id in 1..=5u32 {
        assert_eq!(RENDER_COUNTS.with(|c| c.borrow()[&id]), 1);
    }

    // Reverse the list repeatedly: every item keeps its own render count
    // climbing by exactly one per cycle - none of them is ever torn down
    // and recreated purely because its position in the list changed.
    let mut forward = true;
    for cycle in 1..=6u32 {
        let ids: Vec<u32> = if forward { vec![5, 4, 3, 2, 1] } else { vec![1, 2, 3, 4, 5] };
        forward = !forward;
        set_items(ids);
        vdom.render(&mut doc).unwrap();
        assert_eq!(doc.children_of(ul).len(), 5);
        for id in 1..=5u32 {
            assert_eq!(RENDER_COUNTS.with(|c| c.borrow()[&id]), cycle + 1);
        }
    }

    // Now shrink, grow past the original size, then empty the list; the
    // document's child count must track the state exactly at every step.
    set_items(vec![2, 4]);
    vdom.render(&mut doc).unwrap();
    assert_eq!(doc.children_of(ul).len(), 2);

    set_items(vec![2, 4, 6, 7, 8, 9]);
    vdom.render(&mut doc).unwrap();
    assert_eq!(doc.children_of(ul).len(), 6);
    // The items that survived the shrink (2 and 4) kept accumulating their
    // own render count; the brand new ones (6, 7, 8, 9) start from one.
    assert!(RENDER_COUNTS.with(|c| c.borrow()[&2]) > 1);
    for id in [6u32, 7, 8, 9] {
        assert_eq!(RENDER_COUNTS.with(|c| c.borrow()[&id]), 1);
    }

    set_items(Vec::new());
    vdom.render(&mut doc).unwrap();
    assert_eq!(doc.children_of(ul).len(), 0);
}
