use weave_core::{Scope, VElement, VNode};
use weave_hooks::use_derive;

fn greeting(scope: &Scope) -> weave_core::Element {
    let text = use_derive(scope, |_prev: Option<&String>| "hello from a hook".to_string());
    Some(VNode::Element(VElement::new("p").with_children(vec![VNode::Text(text.into())])))
}

#[test]
fn renders_a_value_produced_by_a_hook() {
    let html = weave_ssr::render_root(greeting).unwrap();
    assert_eq!(html, "<p>hello from a hook</p>");
}
