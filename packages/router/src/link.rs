//! `Link`: a navigable anchor, built on this core's renderer-agnostic
//! attribute/listener model.
//!
//! There is no history-stack push or scroll restoration here - those are
//! DOM specifics outside this core, which has no renderer of its own.
//! `Link` only needs to turn a click into a `Navigator::navigate` call; a
//! host binding maps the emitted `href`/`click` attributes onto whatever
//! native anchor behavior it wants to suppress.

use crate::error::RouterError;
use crate::hooks::use_navigator;
use std::rc::Rc;
use weave_core::{AttributeValue, Element, Scope, VElement, VNode};

/// Renders `children` inside an `<a href=to>` that calls
/// [`weave_core::Navigator::navigate`] on click instead of letting the host
/// follow the link natively.
///
/// Returns [`RouterError::NotInsideRouter`] mounted as an empty fragment
/// would be silently wrong, so this panics the way every other hook does
/// when used outside its required context - a `Link` rendered outside a
/// router is a programming error, not a runtime condition callers recover
/// from.
pub fn link(scope: &Scope, to: impl Into<Rc<str>>, children: Vec<VNode>) -> Element {
    let to = to.into();
    let navigator = use_navigator(scope).unwrap_or_else(|RouterError::NotInsideRouter| {
        panic!("Link rendered outside a router: mount the route table with weave_core::create_spa")
    });

    let href = to.clone();
    let onclick: Rc<dyn Fn(&dyn std::any::Any)> = Rc::new(move |_event| {
        navigator.navigate(to.clone());
    });

    Some(VNode::Element(
        VElement::new("a")
            .with_attr("href", AttributeValue::Text(href))
            .with_attr(
                "onclick",
                AttributeValue::Listener {
                    event: "click",
                    handler: onclick,
                },
            )
            .with_children(children),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{create_spa, Mutation, NoOpMutations};

    fn page(scope: &Scope) -> Element {
        link(scope, "/about", vec![VNode::Text("About".into())])
    }

    #[test]
    fn link_renders_an_anchor_with_href() {
        let mut recorder = weave_testing::MutationRecorder::new();
        let vdom = create_spa(
            vec![weave_core::Route::new("/", page), weave_core::Route::new("/about", page)],
            &mut recorder,
        )
        .unwrap();
        drop(vdom);

        let created_anchor = recorder
            .edits
            .iter()
            .any(|edit| matches!(edit, Mutation::CreateElement { tag, .. } if &**tag == "a"));
        assert!(created_anchor);

        let set_href = recorder.edits.iter().any(|edit| {
            matches!(
                edit,
                Mutation::SetAttribute { name, value, .. }
                    if &**name == "href" && matches!(value, AttributeValue::Text(v) if &**v == "/about")
            )
        });
        assert!(set_href);
    }

    #[test]
    fn link_outside_router_reports_a_component_panic() {
        fn root(scope: &Scope) -> Element {
            link(scope, "/x", vec![])
        }
        let mut sink = NoOpMutations;
        let err = weave_core::create_island(root, &mut sink).unwrap_err();
        match err {
            weave_core::CoreError::ComponentPanicked { detail, .. } => {
                assert!(detail.contains("outside a router"));
            }
            other => panic!("expected ComponentPanicked, got {other:?}"),
        }
    }
}
