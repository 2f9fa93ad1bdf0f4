//! Hydration: adopting a document subtree a server already produced instead
//! of creating one from scratch.
//!
//! The closest relative here is the ordinary mount path in `mount.rs`,
//! walked with the same recursive shape but sourcing identities from the
//! host's existing tree (via [`HydrationSource`]) instead of minting fresh
//! ones. Where the shapes disagree, hydration fails closed with
//! [`crate::error::CoreError::HydrationMismatch`] rather than guessing -
//! this is the only policy; there is no warn-and-fall-back-to-client
//! re-render mode (a host wanting that behavior reruns `create_island`
//! itself after catching the error).
//!
//! Multi-root fragments are only supported as the sole child at a given
//! position; a component or fragment producing more than one root during
//! hydration fails with a mismatch rather than attempting sibling
//! reconciliation, since the host's existing tree doesn't expose enough
//! structure (just one id per VNode position) to disambiguate extra roots
//! from unrelated siblings. Real component trees almost never hit this in
//! practice - a bare `Fragment` at the very root of a hydrated subtree is
//! the one place it could.

use crate::any_props::RenderOutcome;
use crate::arena::{ElementId, ScopeId};
use crate::error::{CoreError, NodePath};
use crate::instance::{ComponentInstance, Scope};
use crate::mount::Mounted;
use crate::mutations::{Mutation, MutationList};
use crate::nodes::{AttributeValue, Element, VComponent, VNode};
use crate::runtime::Runtime;
use std::rc::Rc;

/// What a host document exposes about its existing shape so hydration can
/// walk it in lockstep with a freshly rendered `VNode` tree. A real host
/// implements this against the markup a prior SSR pass wrote; `weave-testing`
/// provides an implementation backed by its in-memory document.
pub trait HydrationSource {
    /// `Some(tag)` if `id` names an existing element; `None` for a text node
    /// or a placeholder.
    fn tag_of(&self, id: ElementId) -> Option<Rc<str>>;
    /// The children of the element at `id`, in document order. Meaningless
    /// (and never called) for anything `tag_of` reports as not an element.
    fn children_of(&self, id: ElementId) -> Vec<ElementId>;
}

fn mismatch(path: &[usize], detail: impl Into<String>) -> CoreError {
    CoreError::HydrationMismatch {
        path: NodePath(path.to_vec()).to_string(),
        detail: detail.into(),
    }
}

/// Hydrates `root_fn`'s output against the existing subtree rooted at
/// `existing_root`, attaching listeners and wiring up component instances
/// without emitting any `Create*`/`Remove` mutations - the nodes already
/// exist. Returns the runtime pieces a [`crate::virtual_dom::VirtualDom`]
/// needs to take ownership of the result.
pub(crate) fn hydrate_root(
    runtime: &Rc<Runtime>,
    source: &dyn HydrationSource,
    root_fn_props: Rc<dyn crate::any_props::AnyProps>,
    existing_root: ElementId,
    next_id: &mut usize,
) -> Result<Mounted, CoreError> {
    let comp = VComponent::new(root_fn_props, None);
    let mut out = MutationList::new();
    let mut path = Vec::new();
    let mounted = hydrate_component(runtime, source, &mut out, &comp, existing_root, None, &mut path, next_id)?;
    Ok(mounted)
}

fn hydrate_node(
    runtime: &Rc<Runtime>,
    source: &dyn HydrationSource,
    out: &mut MutationList,
    node: &VNode,
    existing: ElementId,
    parent_scope: Option<ScopeId>,
    path: &mut Vec<usize>,
    next_id: &mut usize,
) -> Result<Mounted, CoreError> {
    *next_id = (*next_id).max(existing.0 + 1);
    match node {
        VNode::Text(text) => {
            if source.tag_of(existing).is_some() {
                return Err(mismatch(path, "expected text, found an element"));
            }
            Ok(Mounted::Text { id: existing, text: text.clone() })
        }
        VNode::Placeholder => {
            if source.tag_of(existing).is_some() {
                return Err(mismatch(path, "expected a placeholder, found an element"));
            }
            Ok(Mounted::Placeholder { id: existing })
        }
        VNode::Element(el) => {
            let tag = source
                .tag_of(existing)
                .ok_or_else(|| mismatch(path, "expected an element, found text/placeholder"))?;
            if tag != el.tag {
                return Err(mismatch(path, format!("expected <{}>, found <{tag}>", el.tag)));
            }
            for attr in &el.attrs {
                if let AttributeValue::Listener { event, .. } = &attr.value {
                    out.edits.push(Mutation::NewEventListener { id: existing, name: event });
                }
            }
            let existing_children = source.children_of(existing);
            if existing_children.len() != el.children.len() {
                return Err(mismatch(
                    path,
                    format!(
                        "expected {} children, document has {}",
                        el.children.len(),
                        existing_children.len()
                    ),
                ));
            }
            let mut children = Vec::with_capacity(el.children.len());
            for (i, (child, existing_child)) in el.children.iter().zip(existing_children).enumerate() {
                path.push(i);
                let result = hydrate_node(runtime, source, out, child, existing_child, parent_scope, path, next_id);
                path.pop();
                children.push(result?);
            }
            Ok(Mounted::Element {
                id: existing,
                tag: el.tag.clone(),
                key: el.key.clone(),
                attrs: el.attrs.clone(),
                children,
            })
        }
        VNode::Fragment(children) => match children.as_slice() {
            [] => {
                if source.tag_of(existing).is_some() {
                    return Err(mismatch(path, "expected an empty fragment's placeholder, found an element"));
                }
                Ok(Mounted::Fragment { children: vec![Mounted::Placeholder { id: existing }] })
            }
            [only] => {
                let child = hydrate_node(runtime, source, out, only, existing, parent_scope, path, next_id)?;
                Ok(Mounted::Fragment { children: vec![child] })
            }
            _ => Err(mismatch(path, "multi-root fragment hydration is not supported")),
        },
        VNode::Component(comp) => {
            hydrate_component(runtime, source, out, comp, existing, parent_scope, path, next_id)
        }
    }
}

fn hydrate_component(
    runtime: &Rc<Runtime>,
    source: &dyn HydrationSource,
    out: &mut MutationList,
    node: &VComponent,
    existing: ElementId,
    parent_scope: Option<ScopeId>,
    path: &mut Vec<usize>,
    next_id: &mut usize,
) -> Result<Mounted, CoreError> {
    let scope_id = runtime
        .instances
        .borrow_mut()
        .insert(ComponentInstance::new(parent_scope, node.props.clone()));
    let scope = Scope { id: scope_id, runtime: runtime.clone() };

    scope.reset_hook_cursor();
    runtime.enter_render();
    let outcome = runtime.with_scope(scope_id, || node.props.render(&scope));
    runtime.leave_render();

    let element: Element = match outcome {
        RenderOutcome::Ready(element) => {
            scope.finish_render();
            element
        }
        RenderOutcome::Panicked(err) => {
            runtime.instances.borrow_mut().remove(scope_id);
            return Err(err);
        }
    };

    let tree = element.clone().unwrap_or(VNode::Placeholder);
    let rendered = match hydrate_node(runtime, source, out, &tree, existing, Some(scope_id), path, next_id) {
        Ok(mounted) => mounted,
        Err(err) => {
            runtime.instances.borrow_mut().remove(scope_id);
            return Err(err);
        }
    };

    if let Some(instance) = runtime.instances.borrow().get(scope_id) {
        *instance.last_tree.borrow_mut() = element;
    }
    out.dirty_scopes.insert(scope_id);

    Ok(Mounted::Component {
        scope: scope_id,
        key: node.key.clone(),
        render_identity: node.render_identity(),
        rendered: Box::new(rendered),
    })
}
