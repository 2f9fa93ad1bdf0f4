//! Synchronous render-to-string serializer.
//!
//! A `weave-ssr` render is a one-shot [`weave_core::VirtualDom`] mount with
//! [`RuntimeConfig::ssr`] set: every component renders exactly once, every
//! resource resolves or fails synchronously, and the resulting tree is
//! walked once into an HTML string - there is no event loop, no listener
//! wiring, and no later flush. Preloading a resource ahead of time (so its
//! producer can return a future that is already `Ready`) is a host-level
//! convention built on [`weave_core::Scope::provide_context`] /
//! `consume_context`, not something this crate's API surface needs to know
//! about.

mod document;
mod error;

pub use error::SsrError;

use document::HtmlDocument;
use weave_core::{Element, RuntimeConfig, Scope, VirtualDom};

/// Renders an already-mounted [`VirtualDom`] to an HTML string.
///
/// The caller is responsible for having constructed `vdom` with
/// [`RuntimeConfig::ssr`] set (see [`render_root`]); this function does not
/// check that and will happily serialize a tree built without it, which is
/// occasionally useful for rendering a test double's fixed markup but not
/// for a real resource-bearing tree (an unresolved resource mounted without
/// `ssr` just renders its pending state, instead of raising
/// [`SsrError::DataMissing`]).
pub fn render(vdom: &VirtualDom) -> String {
    let mut doc = HtmlDocument::new();
    vdom.rebuild(&mut doc);
    doc.into_html()
}

/// Mounts a zero-prop root component with SSR mode enabled and renders it
/// to an HTML string in one step.
pub fn render_root(root: fn(&Scope) -> Element) -> Result<String, SsrError> {
    let config = ssr_config();
    let vdom = VirtualDom::with_config(root, config).map_err(SsrError::from)?;
    Ok(render(&vdom))
}

/// As [`render_root`], for a root component that takes props (a route
/// table, initial server-provided data) rather than closing over them.
pub fn render_root_with_props<P: Clone + 'static>(
    root: fn(P, &Scope) -> Element,
    props: P,
) -> Result<String, SsrError> {
    let config = ssr_config();
    let vdom = VirtualDom::with_config_and_props(root, props, config).map_err(SsrError::from)?;
    Ok(render(&vdom))
}

fn ssr_config() -> RuntimeConfig {
    RuntimeConfig {
        ssr: true,
        ..RuntimeConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{AttributeValue, VElement, VNode};

    fn hello(scope: &Scope) -> Element {
        let _ = scope;
        Some(VNode::Element(
            VElement::new("div")
                .with_attr("class", AttributeValue::Text("greeting".into()))
                .with_children(vec![VNode::Text("hello & welcome".into())]),
        ))
    }

    #[test]
    fn renders_element_with_escaped_text() {
        let html = render_root(hello).unwrap();
        assert_eq!(html, r#"<div class="greeting">hello &amp; welcome</div>"#);
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        fn picture(scope: &Scope) -> Element {
            let _ = scope;
            Some(VNode::Element(
                VElement::new("img").with_attr("src", AttributeValue::Text("a.png".into())),
            ))
        }
        let html = render_root(picture).unwrap();
        assert_eq!(html, r#"<img src="a.png">"#);
    }

    #[test]
    fn false_boolean_attribute_is_omitted() {
        fn field(scope: &Scope) -> Element {
            let _ = scope;
            Some(VNode::Element(
                VElement::new("input").with_attr("disabled", AttributeValue::Bool(false)),
            ))
        }
        let html = render_root(field).unwrap();
        assert_eq!(html, r#"<input>"#);
    }

    #[test]
    fn true_boolean_attribute_is_bare() {
        fn field(scope: &Scope) -> Element {
            let _ = scope;
            Some(VNode::Element(
                VElement::new("input").with_attr("disabled", AttributeValue::Bool(true)),
            ))
        }
        let html = render_root(field).unwrap();
        assert_eq!(html, r#"<input disabled>"#);
    }

    #[test]
    fn pending_resource_without_synchronous_value_raises_data_missing() {
        fn pending(scope: &Scope) -> Element {
            let resource = weave_core::ResourceCell::<i32, String, ()>::new(scope, (), |_signal| {
                Box::pin(std::future::pending::<Result<i32, String>>())
            });
            let _ = resource.snapshot();
            Some(VNode::Element(VElement::new("div")))
        }

        let err = render_root(pending).unwrap_err();
        assert!(matches!(err, SsrError::DataMissing { .. }));
    }

    #[test]
    fn resource_already_ready_on_first_poll_renders_its_value() {
        fn ready(scope: &Scope) -> Element {
            let resource = weave_core::ResourceCell::<i32, String, ()>::new(scope, (), |_signal| {
                Box::pin(async { Ok(42) })
            });
            let snapshot = resource.snapshot();
            Some(VNode::Element(VElement::new("div").with_children(vec![VNode::Text(
                snapshot.ready_value().map(|v| v.to_string()).unwrap_or_default().into(),
            )])))
        }

        let html = render_root(ready).unwrap();
        assert_eq!(html, "<div>42</div>");
    }
}
