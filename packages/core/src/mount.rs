//! The mount tree and the general-purpose reconciler.
//!
//! A [`VNode`] tree produced by a render carries no identity of its own -
//! two renders in a row produce two unrelated trees that happen to look
//! alike. [`Mounted`] is the parallel structure that does carry identity: it
//! shadows a `VNode` tree node-for-node, but every leaf and every mounted
//! component remembers the real [`ElementId`]/[`ScopeId`] the previous BUILD
//! phase assigned it. Diffing compares a fresh `VNode` tree against the
//! `Mounted` tree left over from the last commit, in place, and appends the
//! edits needed to bring the document in line to a [`MutationList`].
//!
//! Component mounting and unmounting is intentionally not handled in this
//! module - it owns the shape of the tree, not the lifecycle of component
//! instances. That lifecycle belongs to [`crate::commit`], which implements
//! [`ComponentHost`] and is handed to every function here that might cross a
//! component boundary.

use crate::arena::{ElementId, ScopeId};
use crate::config::RuntimeConfig;
use crate::diff::{match_children, stationary_positions};
use crate::fastlane::{try_bulk_text, try_fastlane};
use crate::mutations::{Mutation, MutationList};
use crate::nodes::{AttributeValue, NodeKey, VAttribute, VComponent, VElement, VNode};
use rustc_hash::FxHashSet;
use std::collections::HashSet;

/// A previously mounted tree, shadowing a `VNode` tree with real identities.
#[derive(Debug, Clone)]
pub enum Mounted {
    Element {
        id: ElementId,
        tag: std::rc::Rc<str>,
        key: Option<NodeKey>,
        attrs: Vec<VAttribute>,
        children: Vec<Mounted>,
    },
    Text {
        id: ElementId,
        text: std::rc::Rc<str>,
    },
    Placeholder {
        id: ElementId,
    },
    /// `children` is never empty: an empty fragment mounts a single
    /// placeholder so it still has a position to anchor on.
    Fragment {
        children: Vec<Mounted>,
    },
    Component {
        scope: ScopeId,
        key: Option<NodeKey>,
        render_identity: usize,
        rendered: Box<Mounted>,
    },
}

impl Mounted {
    pub fn key(&self) -> Option<&NodeKey> {
        match self {
            Mounted::Element { key, .. } => key.as_ref(),
            Mounted::Component { key, .. } => key.as_ref(),
            _ => None,
        }
    }

    /// The id to anchor sibling inserts/moves on. For a multi-root fragment
    /// or a component that rendered one, this is the first root only - good
    /// enough for ordering purposes since every other root of that fragment
    /// is kept contiguous by construction.
    pub fn anchor_id(&self) -> ElementId {
        match self {
            Mounted::Element { id, .. } | Mounted::Text { id, .. } | Mounted::Placeholder { id } => {
                *id
            }
            Mounted::Fragment { children } => children[0].anchor_id(),
            Mounted::Component { rendered, .. } => rendered.anchor_id(),
        }
    }
}

/// Mounts and unmounts component instances. Implemented by the commit
/// engine; kept as a trait here so this module never depends on component
/// storage directly.
pub trait ComponentHost {
    /// Mounts a fresh instance for `node` under `parent`, runs its first
    /// render, recursively mounts the tree it produced, and returns both.
    fn mount_component(
        &mut self,
        parent: Option<ScopeId>,
        node: &VComponent,
        next_id: &mut usize,
        out: &mut MutationList,
    ) -> (ScopeId, Mounted);

    /// Re-renders an existing instance with `node`'s props and reconciles
    /// its output against `rendered` in place.
    fn update_component(
        &mut self,
        scope: ScopeId,
        node: &VComponent,
        rendered: &mut Mounted,
        next_id: &mut usize,
        out: &mut MutationList,
    );

    /// Runs cleanup for `scope` and removes its instance. Does not touch the
    /// document; the caller is responsible for emitting `Remove` mutations.
    fn unmount_component(&mut self, scope: ScopeId);

    /// Tunables the reconciler itself needs (fast-lane thresholds).
    fn config(&self) -> &RuntimeConfig;
}

fn alloc(next_id: &mut usize) -> ElementId {
    let id = ElementId(*next_id);
    *next_id += 1;
    id
}

/// Mounts a brand new `VNode` tree, emitting the mutations needed to build
/// it and appending its root(s) are left to the caller (the caller knows
/// whether this is the first child, an append, or an insert-before).
pub fn mount_node(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    node: &VNode,
    parent_scope: Option<ScopeId>,
) -> Mounted {
    match node {
        VNode::Text(text) => {
            let id = alloc(next_id);
            out.edits.push(Mutation::CreateText {
                id,
                value: text.to_string(),
            });
            Mounted::Text { id, text: text.clone() }
        }
        VNode::Placeholder => {
            let id = alloc(next_id);
            out.edits.push(Mutation::CreatePlaceholder { id });
            Mounted::Placeholder { id }
        }
        VNode::Element(el) => mount_element(host, next_id, out, el, parent_scope),
        VNode::Fragment(children) => {
            if children.is_empty() {
                let id = alloc(next_id);
                out.edits.push(Mutation::CreatePlaceholder { id });
                return Mounted::Fragment {
                    children: vec![Mounted::Placeholder { id }],
                };
            }
            let mounted = children
                .iter()
                .map(|c| mount_node(host, next_id, out, c, parent_scope))
                .collect();
            Mounted::Fragment { children: mounted }
        }
        VNode::Component(comp) => {
            let (scope, rendered) = host.mount_component(parent_scope, comp, next_id, out);
            Mounted::Component {
                scope,
                key: comp.key.clone(),
                render_identity: comp.render_identity(),
                rendered: Box::new(rendered),
            }
        }
    }
}

fn mount_element(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    el: &VElement,
    parent_scope: Option<ScopeId>,
) -> Mounted {
    let id = alloc(next_id);
    out.edits.push(Mutation::CreateElement {
        id,
        tag: el.tag.clone(),
    });
    for attr in &el.attrs {
        apply_new_attribute(out, id, attr);
    }

    let mut children = Vec::with_capacity(el.children.len());
    for child in &el.children {
        let mounted = mount_node(host, next_id, out, child, parent_scope);
        append_roots(out, id, &mounted);
        children.push(mounted);
    }

    Mounted::Element {
        id,
        tag: el.tag.clone(),
        key: el.key.clone(),
        attrs: el.attrs.clone(),
        children,
    }
}

fn apply_new_attribute(out: &mut MutationList, id: ElementId, attr: &VAttribute) {
    if let AttributeValue::Listener { event, .. } = &attr.value {
        out.edits.push(Mutation::NewEventListener { id, name: event });
    } else {
        out.edits.push(Mutation::SetAttribute {
            id,
            name: attr.name.clone(),
            value: attr.value.clone(),
        });
    }
}

/// Appends every root id of a freshly mounted node to `parent`, in order -
/// more than one id only when `mounted` is a multi-root fragment.
fn append_roots(out: &mut MutationList, parent: ElementId, mounted: &Mounted) {
    match mounted {
        Mounted::Fragment { children } => {
            for child in children {
                append_roots(out, parent, child);
            }
        }
        Mounted::Component { rendered, .. } => append_roots(out, parent, rendered),
        _ => out.edits.push(Mutation::AppendChild {
            parent,
            child: mounted.anchor_id(),
        }),
    }
}

/// Reconciles `mounted` in place against a freshly rendered `new` node. When
/// the two aren't the same shape, `mounted` is torn down and replaced
/// wholesale; otherwise the existing identities are kept and only the
/// difference is written out.
pub fn reconcile_node(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    mounted: &mut Mounted,
    new: &VNode,
    parent_scope: Option<ScopeId>,
) {
    let same_shape = match (&*mounted, new) {
        (Mounted::Element { tag, .. }, VNode::Element(e)) => *tag == e.tag,
        (Mounted::Text { .. }, VNode::Text(_)) => true,
        (Mounted::Placeholder { .. }, VNode::Placeholder) => true,
        (Mounted::Fragment { .. }, VNode::Fragment(_)) => true,
        (Mounted::Component { render_identity, .. }, VNode::Component(c)) => {
            *render_identity == c.render_identity()
        }
        _ => false,
    };

    if !same_shape {
        let old_anchor = mounted.anchor_id();
        let replacement = mount_node(host, next_id, out, new, parent_scope);
        let new_anchor = replacement.anchor_id();
        out.edits.push(Mutation::ReplaceWith {
            old: old_anchor,
            new: new_anchor,
        });
        unmount(host, out, std::mem::replace(mounted, replacement), false);
        return;
    }

    match (mounted, new) {
        (Mounted::Text { id, text }, VNode::Text(new_text)) => {
            if text != new_text {
                out.edits.push(Mutation::SetText {
                    id: *id,
                    value: new_text.to_string(),
                });
                *text = new_text.clone();
            }
        }
        (Mounted::Placeholder { .. }, VNode::Placeholder) => {}
        (
            Mounted::Element { id, attrs, children, .. },
            VNode::Element(new_el),
        ) => {
            diff_attrs(out, *id, attrs, &new_el.attrs);
            *attrs = new_el.attrs.clone();
            diff_children(host, next_id, out, *id, children, &new_el.children, parent_scope);
        }
        (Mounted::Fragment { children }, VNode::Fragment(new_children)) => {
            diff_fragment_children(host, next_id, out, children, new_children, parent_scope);
        }
        (
            Mounted::Component { scope, rendered, render_identity, .. },
            VNode::Component(new_comp),
        ) => {
            *render_identity = new_comp.render_identity();
            host.update_component(*scope, new_comp, rendered, next_id, out);
        }
        _ => unreachable!("same_shape guarantees matching variants"),
    }
}

fn diff_attrs(out: &mut MutationList, id: ElementId, old: &[VAttribute], new: &[VAttribute]) {
    for old_attr in old {
        if !new.iter().any(|a| a.name == old_attr.name) {
            if let AttributeValue::Listener { event, .. } = &old_attr.value {
                out.edits.push(Mutation::RemoveEventListener { id, name: event });
            } else {
                out.edits.push(Mutation::RemoveAttribute {
                    id,
                    name: old_attr.name.clone(),
                });
            }
        }
    }

    for new_attr in new {
        match old.iter().find(|a| a.name == new_attr.name) {
            Some(old_attr) if old_attr.value == new_attr.value => {}
            _ => apply_new_attribute(out, id, new_attr),
        }
    }
}

/// Reconciles an element's children, taking the keyed path if any child on
/// either side carries a key and the plain positional path otherwise.
fn diff_children(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    parent: ElementId,
    old: &mut Vec<Mounted>,
    new: &[VNode],
    parent_scope: Option<ScopeId>,
) {
    let keyed = old.iter().any(|m| m.key().is_some()) || new.iter().any(|n| n.key().is_some());
    if !keyed {
        diff_positional(host, next_id, out, parent, old, new, parent_scope);
        return;
    }

    if try_fastlane(host.config(), out, parent, old, new).is_some() {
        return;
    }
    diff_keyed(host, next_id, out, parent, old, new, parent_scope);
}

/// Fragments have no element id of their own to append/insert/move against;
/// the only shape change a fragment's children can undergo without a host
/// parent is an in-place positional/keyed diff of the same length class as
/// `diff_children`, but every structural edit (insert/move/remove) has to
/// target whichever *real* host element encloses the fragment. Since that
/// enclosing id isn't available at this recursion depth in the owned-tree
/// model, fragments are restricted to the positional path here; keyed
/// fragments-of-fragments are rare enough in practice that forcing a full
/// remount on a key mismatch is an acceptable simplification.
fn diff_fragment_children(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    old: &mut Vec<Mounted>,
    new: &[VNode],
    parent_scope: Option<ScopeId>,
) {
    let common = old.len().min(new.len());
    for i in 0..common {
        reconcile_node(host, next_id, out, &mut old[i], &new[i], parent_scope);
    }
    for extra in old.drain(common..) {
        unmount(host, out, extra, true);
    }
    for new_child in &new[common..] {
        let mounted = mount_node(host, next_id, out, new_child, parent_scope);
        old.push(mounted);
    }
}

fn diff_positional(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    parent: ElementId,
    old: &mut Vec<Mounted>,
    new: &[VNode],
    parent_scope: Option<ScopeId>,
) {
    if try_bulk_text(host.config(), out, old, new).is_some() {
        return;
    }

    let common = old.len().min(new.len());
    for i in 0..common {
        reconcile_node(host, next_id, out, &mut old[i], &new[i], parent_scope);
    }

    for extra in old.drain(common..) {
        let id = extra.anchor_id();
        unmount(host, out, extra, false);
        out.edits.push(Mutation::Remove { id });
    }

    for new_child in &new[common..] {
        let mounted = mount_node(host, next_id, out, new_child, parent_scope);
        append_roots(out, parent, &mounted);
        old.push(mounted);
    }
}

/// Diffs a child list containing at least one keyed node. Matching goes
/// through [`match_children`], so unkeyed siblings mixed in with the keyed
/// ones keep their positional identity instead of being torn down and
/// remounted every time.
fn diff_keyed(
    host: &mut dyn ComponentHost,
    next_id: &mut usize,
    out: &mut MutationList,
    parent: ElementId,
    old: &mut Vec<Mounted>,
    new: &[VNode],
    parent_scope: Option<ScopeId>,
) {
    let matched = match_children(old.iter().map(Mounted::key), new.iter().map(|n| n.key()));

    let mut subseq_old_indices = Vec::new();
    for m in &matched {
        if let Some(oi) = m {
            subseq_old_indices.push(*oi);
        }
    }
    let stationary: HashSet<usize> = stationary_positions(&subseq_old_indices)
        .into_iter()
        .collect();

    let mut old_slots: Vec<Option<Mounted>> = old.drain(..).map(Some).collect();
    let mut new_mounted: Vec<Option<Mounted>> = (0..new.len()).map(|_| None).collect();

    let mut next_anchor: Option<ElementId> = None;
    let mut subseq_cursor = subseq_old_indices.len();

    for i in (0..new.len()).rev() {
        match matched[i] {
            None => {
                let mounted = mount_node(host, next_id, out, &new[i], parent_scope);
                let root = mounted.anchor_id();
                match next_anchor {
                    Some(before) => out.edits.push(Mutation::InsertBefore {
                        parent,
                        child: root,
                        before,
                    }),
                    None => out.edits.push(Mutation::AppendChild { parent, child: root }),
                }
                next_anchor = Some(root);
                new_mounted[i] = Some(mounted);
            }
            Some(oi) => {
                subseq_cursor -= 1;
                let mut mounted = old_slots[oi].take().expect("old slot used at most once");
                reconcile_node(host, next_id, out, &mut mounted, &new[i], parent_scope);
                let root = mounted.anchor_id();
                if !stationary.contains(&subseq_cursor) {
                    out.edits.push(Mutation::MoveBefore {
                        parent,
                        child: root,
                        before: next_anchor,
                    });
                }
                next_anchor = Some(root);
                new_mounted[i] = Some(mounted);
            }
        }
    }

    for leftover in old_slots.into_iter().flatten() {
        let id = leftover.anchor_id();
        unmount(host, out, leftover, false);
        out.edits.push(Mutation::Remove { id });
    }

    *old = new_mounted.into_iter().map(|m| m.expect("every position filled")).collect();
}

/// Tears down a mounted subtree, running component cleanup bottom-up.
/// `emit_remove` controls whether this call is responsible for removing its
/// own root node(s) from the document: `false` when an ancestor element is
/// itself about to be removed (and will take this subtree with it), `true`
/// at every other call site.
pub fn unmount(host: &mut dyn ComponentHost, out: &mut MutationList, mounted: Mounted, emit_remove: bool) {
    match mounted {
        Mounted::Element { id, children, .. } => {
            for child in children {
                unmount(host, out, child, false);
            }
            if emit_remove {
                out.edits.push(Mutation::Remove { id });
            }
        }
        Mounted::Fragment { children } => {
            for child in children {
                unmount(host, out, child, emit_remove);
            }
        }
        Mounted::Component { scope, rendered, .. } => {
            unmount(host, out, *rendered, emit_remove);
            host.unmount_component(scope);
        }
        Mounted::Text { id, .. } | Mounted::Placeholder { id } => {
            if emit_remove {
                out.edits.push(Mutation::Remove { id });
            }
        }
    }
}

/// Every `ScopeId` still live within a mounted subtree, innermost first -
/// used by the commit engine to validate that an unmount didn't leave a
/// dangling scheduler entry.
pub fn scopes_in(mounted: &Mounted, out: &mut FxHashSet<ScopeId>) {
    match mounted {
        Mounted::Element { children, .. } => {
            for child in children {
                scopes_in(child, out);
            }
        }
        Mounted::Fragment { children } => {
            for child in children {
                scopes_in(child, out);
            }
        }
        Mounted::Component { scope, rendered, .. } => {
            out.insert(*scope);
            scopes_in(rendered, out);
        }
        Mounted::Text { .. } | Mounted::Placeholder { .. } => {}
    }
}
