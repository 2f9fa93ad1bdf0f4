//! The document-mutation protocol.
//!
//! `Mutation` and `WriteMutations` are this crate's equivalent of the
//! teacher's template-stack-based edit protocol, reshaped around the
//! owned-`VNode` model: there is no bump-allocated template to load and
//! clone, so every instruction names the concrete [`ElementId`]s it
//! operates on instead of a path into a template. The trait/recording-impl/
//! no-op-impl trio is kept as-is, since it is exactly the seam a host
//! document backend plugs into.

use crate::arena::ElementId;
use crate::nodes::AttributeValue;
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Sink for the edits produced by a commit. A real host implements this
/// against its actual document (a browser DOM, a terminal cell grid, an
/// HTML string builder); `weave-testing` provides an in-memory
/// implementation for assertions.
pub trait WriteMutations {
    fn create_element(&mut self, id: ElementId, tag: &str);
    fn create_text(&mut self, id: ElementId, value: &str);
    fn create_placeholder(&mut self, id: ElementId);

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttributeValue);
    fn remove_attribute(&mut self, id: ElementId, name: &str);
    fn set_text(&mut self, id: ElementId, value: &str);

    fn append_child(&mut self, parent: ElementId, child: ElementId);
    fn insert_before(&mut self, parent: ElementId, child: ElementId, before: ElementId);
    /// Moves an already-mounted node to a new position among its current
    /// siblings without recreating it - the instruction the keyed
    /// reconciler and the fast-lane use to satisfy the minimal-mutation
    /// guarantee for reordered children.
    fn move_before(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>);
    fn replace_with(&mut self, old: ElementId, new: ElementId);
    fn remove(&mut self, id: ElementId);

    fn create_event_listener(&mut self, id: ElementId, name: &'static str);
    fn remove_event_listener(&mut self, id: ElementId, name: &'static str);

    /// Marks a scope as having committed, for renderers that track
    /// per-subtree dirtiness (hydration, islands).
    fn mark_scope_committed(&mut self, _scope: crate::arena::ScopeId) {}
}

/// A single instruction for the document backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement { id: ElementId, tag: Rc<str> },
    CreateText { id: ElementId, value: String },
    CreatePlaceholder { id: ElementId },
    SetAttribute { id: ElementId, name: Rc<str>, value: AttributeValue },
    RemoveAttribute { id: ElementId, name: Rc<str> },
    SetText { id: ElementId, value: String },
    AppendChild { parent: ElementId, child: ElementId },
    InsertBefore { parent: ElementId, child: ElementId, before: ElementId },
    MoveBefore { parent: ElementId, child: ElementId, before: Option<ElementId> },
    ReplaceWith { old: ElementId, new: ElementId },
    Remove { id: ElementId },
    NewEventListener { id: ElementId, name: &'static str },
    RemoveEventListener { id: ElementId, name: &'static str },
}

/// Records mutations into a plain `Vec` instead of applying them anywhere;
/// used by the commit engine's BUILD phase, which must finish computing the
/// entire batch before any of it is allowed to touch the real document.
#[derive(Default)]
pub struct MutationList {
    pub dirty_scopes: FxHashSet<crate::arena::ScopeId>,
    pub edits: Vec<Mutation>,
}

impl MutationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays every recorded edit against a live `WriteMutations` sink -
    /// the COMMIT half of the BUILD/COMMIT split.
    pub fn apply(&self, sink: &mut dyn WriteMutations) {
        for edit in &self.edits {
            apply_one(edit, sink);
        }
        for scope in &self.dirty_scopes {
            sink.mark_scope_committed(*scope);
        }
    }
}

fn apply_one(edit: &Mutation, sink: &mut dyn WriteMutations) {
    match edit {
        Mutation::CreateElement { id, tag } => sink.create_element(*id, tag),
        Mutation::CreateText { id, value } => sink.create_text(*id, value),
        Mutation::CreatePlaceholder { id } => sink.create_placeholder(*id),
        Mutation::SetAttribute { id, name, value } => sink.set_attribute(*id, name, value),
        Mutation::RemoveAttribute { id, name } => sink.remove_attribute(*id, name),
        Mutation::SetText { id, value } => sink.set_text(*id, value),
        Mutation::AppendChild { parent, child } => sink.append_child(*parent, *child),
        Mutation::InsertBefore { parent, child, before } => {
            sink.insert_before(*parent, *child, *before)
        }
        Mutation::MoveBefore { parent, child, before } => {
            sink.move_before(*parent, *child, *before)
        }
        Mutation::ReplaceWith { old, new } => sink.replace_with(*old, *new),
        Mutation::Remove { id } => sink.remove(*id),
        Mutation::NewEventListener { id, name } => sink.create_event_listener(*id, name),
        Mutation::RemoveEventListener { id, name } => sink.remove_event_listener(*id, name),
    }
}

/// Discards every mutation. Used when only the dirty-scope bookkeeping of a
/// flush matters (server-side rendering re-renders) or in tests that only
/// assert on what the reconciler *decided*, not what it wrote.
pub struct NoOpMutations;

impl WriteMutations for NoOpMutations {
    fn create_element(&mut self, _id: ElementId, _tag: &str) {}
    fn create_text(&mut self, _id: ElementId, _value: &str) {}
    fn create_placeholder(&mut self, _id: ElementId) {}
    fn set_attribute(&mut self, _id: ElementId, _name: &str, _value: &AttributeValue) {}
    fn remove_attribute(&mut self, _id: ElementId, _name: &str) {}
    fn set_text(&mut self, _id: ElementId, _value: &str) {}
    fn append_child(&mut self, _parent: ElementId, _child: ElementId) {}
    fn insert_before(&mut self, _parent: ElementId, _child: ElementId, _before: ElementId) {}
    fn move_before(&mut self, _parent: ElementId, _child: ElementId, _before: Option<ElementId>) {}
    fn replace_with(&mut self, _old: ElementId, _new: ElementId) {}
    fn remove(&mut self, _id: ElementId) {}
    fn create_event_listener(&mut self, _id: ElementId, _name: &'static str) {}
    fn remove_event_listener(&mut self, _id: ElementId, _name: &'static str) {}
}
