//! Literal end-to-end scenarios asserting exact render-invocation counts:
//! one render per flush that actually reaches a dirty scope, never more,
//! never fewer - a thousand separately-flushed clicks produce a thousand
//! renders plus the initial mount, and a hundred writes coalesced into one
//! event handler still produce exactly one post-handler render.

use std::cell::RefCell;
use weave_core::{AttributeValue, Element, Mutation, Scope, StateCell, UiEvent, VElement, VNode};

thread_local! {
    static COUNT: RefCell<Option<StateCell<i32>>> = RefCell::new(None);
    static RENDER_COUNT: RefCell<u32> = RefCell::new(0);
}

fn reset_render_count() {
    RENDER_COUNT.with(|c| *c.borrow_mut() = 0);
}

fn render_count() -> u32 {
    RENDER_COUNT.with(|c| *c.borrow())
}

fn counter_root(scope: &Scope) -> Element {
    RENDER_COUNT.with(|c| *c.borrow_mut() += 1);
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

fn counter_bump_100(scope: &Scope) -> Element {
    RENDER_COUNT.with(|c| *c.borrow_mut() += 1);
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
                    handler: std::rc::Rc::new(move |_| {
                        for _ in 0..100 {
                            let next = cell.get() + 1;
                            cell.set(next);
                        }
                    }),
                },
            )
            .with_children(vec![VNode::Text(value.to_string().into())]),
    ))
}

/// Scenario: a counter clicked 1000 times, flushing after every click.
/// Button text ends at "1000"; the component's render function was
/// invoked 1001 times (the initial mount render plus one per flush).
#[test]
fn clicking_1000_times_renders_1001_times() {
    reset_render_count();
    let mut vdom = weave_core::VirtualDom::new(counter_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(render_count(), 1);

    for _ in 0..1000 {
        vdom.handle_event(UiEvent {
            target: weave_core::ElementId(0),
            name: "click",
            data: Box::new(()),
        });
        vdom.render(&mut recorder).unwrap();
    }

    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 1000);
    assert_eq!(render_count(), 1001);
    assert!(recorder
        .edits
        .iter()
        .any(|e| matches!(e, Mutation::SetText { value, .. } if value == "1000")));
}

/// Scenario: one event handler performs 100 coalesced writes to the same
/// state cell. After flushing, the rendered text is "100" and the
/// component's render function ran exactly twice: once at mount, once for
/// the single post-handler flush.
#[test]
fn coalesced_batch_of_100_writes_renders_exactly_twice() {
    reset_render_count();
    let mut vdom = weave_core::VirtualDom::new(counter_bump_100).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(render_count(), 1);

    vdom.handle_event(UiEvent {
        target: weave_core::ElementId(0),
        name: "click",
        data: Box::new(()),
    });
    assert_eq!(render_count(), 1, "writes inside the handler must not render synchronously");

    vdom.render(&mut recorder).unwrap();

    assert_eq!(COUNT.with(|c| c.borrow().as_ref().unwrap().get()), 100);
    assert_eq!(render_count(), 2);
    assert!(recorder
        .edits
        .iter()
        .any(|e| matches!(e, Mutation::SetText { value, .. } if value == "100")));
}
