//! Initial mount: the markup `rebuild` replays into a fresh document sink
//! matches the VNode tree a root component produced, across every node
//! shape.

use weave_core::{
    AttributeValue, Element, NoOpMutations, NodeKey, Scope, VComponent, VElement, VNode,
    VirtualDom,
};
use weave_testing::FakeDocument;

fn leaf(_scope: &Scope) -> Element {
    Some(VNode::Element(
        VElement::new("div")
            .with_attr("class", AttributeValue::Text("box".into()))
            .with_children(vec![VNode::Text("hello".into())]),
    ))
}

#[test]
fn mounts_a_single_element_with_attribute_and_text_child() {
    let vdom = VirtualDom::new(leaf).unwrap();
    let mut doc = FakeDocument::new();
    vdom.rebuild(&mut doc);

    let root = weave_core::ElementId(0);
    assert_eq!(doc.tag_of(root), Some("div"));
    assert_eq!(doc.attr(root, "class"), Some(&AttributeValue::Text("box".into())));
    let children = doc.children_of(root);
    assert_eq!(children.len(), 1);
    assert_eq!(doc.text_of(children[0]), Some("hello"));
}

fn fragment_root(_scope: &Scope) -> Element {
    Some(VNode::Fragment(vec![
        VNode::Element(VElement::new("span")),
        VNode::Element(VElement::new("span")),
    ]))
}

#[test]
fn mounts_every_root_of_a_fragment() {
    let vdom = VirtualDom::new(fragment_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    let spans = recorder.count(|m| matches!(m, weave_core::Mutation::CreateElement { tag, .. } if &**tag == "span"));
    assert_eq!(spans, 2);
}

fn empty_fragment_root(_scope: &Scope) -> Element {
    Some(VNode::Fragment(Vec::new()))
}

#[test]
fn empty_fragment_mounts_a_placeholder_so_it_has_an_anchor() {
    let vdom = VirtualDom::new(empty_fragment_root).unwrap();
    let mut recorder = weave_testing::MutationRecorder::new();
    vdom.rebuild(&mut recorder);
    assert_eq!(
        recorder.count(|m| matches!(m, weave_core::Mutation::CreatePlaceholder { .. })),
        1
    );
}

#[derive(Clone, PartialEq)]
struct ItemProps {
    label: &'static str,
}

fn item(props: ItemProps, _scope: &Scope) -> Element {
    Some(VNode::Element(
        VElement::new("li").with_children(vec![VNode::Text(props.label.into())]),
    ))
}

fn list_root(_scope: &Scope) -> Element {
    Some(VNode::Element(VElement::new("ul").with_children(vec![
        VNode::Component(VComponent::component(
            item,
            |a, b| a == b,
            ItemProps { label: "first" },
            "item",
            Some(NodeKey::Int(0)),
        )),
        VNode::Component(VComponent::component(
            item,
            |a, b| a == b,
            ItemProps { label: "second" },
            "item",
            Some(NodeKey::Int(1)),
        )),
    ])))
}

#[test]
fn mounts_nested_components_inside_a_host_element() {
    let vdom = VirtualDom::new(list_root).unwrap();
    let mut doc = FakeDocument::new();
    vdom.rebuild(&mut doc);
    let ul = weave_core::ElementId(0);
    let items = doc.children_of(ul);
    assert_eq!(items.len(), 2);
    let first_text = doc.children_of(items[0]);
    assert_eq!(doc.text_of(first_text[0]), Some("first"));
}

#[test]
fn new_virtual_dom_does_not_touch_the_sink_until_rebuild() {
    let mut sink = NoOpMutations;
    let vdom = VirtualDom::new(leaf).unwrap();
    // Construction only stages into an internal buffer; `rebuild` is the
    // step that actually replays it.
    vdom.rebuild(&mut sink);
}
