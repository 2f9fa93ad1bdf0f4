use weave_core::{AttributeValue, Scope, VComponent, VElement, VNode};

#[derive(Clone, PartialEq)]
struct ItemProps {
    label: &'static str,
}

fn item(props: ItemProps, _scope: &Scope) -> weave_core::Element {
    Some(VNode::Element(
        VElement::new("li").with_children(vec![VNode::Text(props.label.into())]),
    ))
}

fn list(_scope: &Scope) -> weave_core::Element {
    Some(VNode::Element(VElement::new("ul").with_children(vec![
        VNode::Component(VComponent::component(
            item,
            |a, b| a == b,
            ItemProps { label: "first" },
            "item",
            None,
        )),
        VNode::Component(VComponent::component(
            item,
            |a, b| a == b,
            ItemProps { label: "second" },
            "item",
            None,
        )),
    ])))
}

#[test]
fn renders_nested_component_tree() {
    let html = weave_ssr::render_root(list).unwrap();
    assert_eq!(html, "<ul><li>first</li><li>second</li></ul>");
}

#[test]
fn attribute_values_render_without_quotes_around_numbers() {
    fn counter(_scope: &Scope) -> weave_core::Element {
        Some(VNode::Element(
            VElement::new("div").with_attr("data-count", AttributeValue::Int(3)),
        ))
    }
    let html = weave_ssr::render_root(counter).unwrap();
    assert_eq!(html, r#"<div data-count="3"></div>"#);
}
