//! Test-only document backends for `weave-core`.
//!
//! `weave-core::mutations::WriteMutations` is deliberately a thin seam: a
//! real host implements it against a browser DOM or a terminal cell grid,
//! and this crate provides the two standard test doubles every one of
//! `weave-core`'s own tests (and any downstream component's tests) plugs
//! into instead - a flat recorder for asserting on the edit stream itself,
//! and a fake in-memory tree for asserting on the resulting document shape.

use rustc_hash::FxHashMap;
use weave_core::{AttributeValue, ElementId, HydrationSource, Mutation, ScopeId, WriteMutations};

/// Records every mutation into a flat `Vec`, in the order received. Use
/// this when the assertion is about *what the reconciler decided to do*
/// (e.g. "no `SetText` was emitted for an unchanged node") rather than
/// about the resulting tree shape.
#[derive(Default)]
pub struct MutationRecorder {
    pub edits: Vec<Mutation>,
    pub committed_scopes: Vec<ScopeId>,
}

impl MutationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, matches: impl Fn(&Mutation) -> bool) -> usize {
        self.edits.iter().filter(|m| matches(m)).count()
    }
}

impl WriteMutations for MutationRecorder {
    fn create_element(&mut self, id: ElementId, tag: &str) {
        self.edits.push(Mutation::CreateElement { id, tag: tag.into() });
    }

    fn create_text(&mut self, id: ElementId, value: &str) {
        self.edits.push(Mutation::CreateText { id, value: value.to_string() });
    }

    fn create_placeholder(&mut self, id: ElementId) {
        self.edits.push(Mutation::CreatePlaceholder { id });
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttributeValue) {
        self.edits.push(Mutation::SetAttribute {
            id,
            name: name.into(),
            value: value.clone(),
        });
    }

    fn remove_attribute(&mut self, id: ElementId, name: &str) {
        self.edits.push(Mutation::RemoveAttribute { id, name: name.into() });
    }

    fn set_text(&mut self, id: ElementId, value: &str) {
        self.edits.push(Mutation::SetText { id, value: value.to_string() });
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.edits.push(Mutation::AppendChild { parent, child });
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, before: ElementId) {
        self.edits.push(Mutation::InsertBefore { parent, child, before });
    }

    fn move_before(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>) {
        self.edits.push(Mutation::MoveBefore { parent, child, before });
    }

    fn replace_with(&mut self, old: ElementId, new: ElementId) {
        self.edits.push(Mutation::ReplaceWith { old, new });
    }

    fn remove(&mut self, id: ElementId) {
        self.edits.push(Mutation::Remove { id });
    }

    fn create_event_listener(&mut self, id: ElementId, name: &'static str) {
        self.edits.push(Mutation::NewEventListener { id, name });
    }

    fn remove_event_listener(&mut self, id: ElementId, name: &'static str) {
        self.edits.push(Mutation::RemoveEventListener { id, name });
    }

    fn mark_scope_committed(&mut self, scope: ScopeId) {
        self.committed_scopes.push(scope);
    }
}

enum FakeNode {
    Element { tag: String, attrs: FxHashMap<String, AttributeValue>, children: Vec<ElementId> },
    Text(String),
    Placeholder,
}

/// A minimal in-memory tree that actually applies mutations, so a test can
/// assert on the resulting shape (child order, attribute values, text
/// content) rather than the raw edit stream. Closer to what a real host
/// document backend does than [`MutationRecorder`], at the cost of not
/// preserving the order mutations arrived in.
#[derive(Default)]
pub struct FakeDocument {
    nodes: FxHashMap<ElementId, FakeNode>,
    parents: FxHashMap<ElementId, ElementId>,
    roots: Vec<ElementId>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children_of(&self, id: ElementId) -> Vec<ElementId> {
        match self.nodes.get(&id) {
            Some(FakeNode::Element { children, .. }) => children.clone(),
            _ => Vec::new(),
        }
    }

    pub fn text_of(&self, id: ElementId) -> Option<&str> {
        match self.nodes.get(&id) {
            Some(FakeNode::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&AttributeValue> {
        match self.nodes.get(&id) {
            Some(FakeNode::Element { attrs, .. }) => attrs.get(name),
            _ => None,
        }
    }

    pub fn tag_of(&self, id: ElementId) -> Option<&str> {
        match self.nodes.get(&id) {
            Some(FakeNode::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(FakeNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
                children.retain(|c| *c != id);
            }
        } else {
            self.roots.retain(|r| *r != id);
        }
    }
}

impl WriteMutations for FakeDocument {
    fn create_element(&mut self, id: ElementId, tag: &str) {
        self.nodes.insert(
            id,
            FakeNode::Element {
                tag: tag.to_string(),
                attrs: FxHashMap::default(),
                children: Vec::new(),
            },
        );
        self.roots.push(id);
    }

    fn create_text(&mut self, id: ElementId, value: &str) {
        self.nodes.insert(id, FakeNode::Text(value.to_string()));
        self.roots.push(id);
    }

    fn create_placeholder(&mut self, id: ElementId) {
        self.nodes.insert(id, FakeNode::Placeholder);
        self.roots.push(id);
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttributeValue) {
        if let Some(FakeNode::Element { attrs, .. }) = self.nodes.get_mut(&id) {
            attrs.insert(name.to_string(), value.clone());
        }
    }

    fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(FakeNode::Element { attrs, .. }) = self.nodes.get_mut(&id) {
            attrs.remove(name);
        }
    }

    fn set_text(&mut self, id: ElementId, value: &str) {
        if let Some(FakeNode::Text(text)) = self.nodes.get_mut(&id) {
            *text = value.to_string();
        }
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(FakeNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
            children.push(child);
        }
        self.parents.insert(child, parent);
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, before: ElementId) {
        self.detach(child);
        if let Some(FakeNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
            let position = children.iter().position(|c| *c == before).unwrap_or(children.len());
            children.insert(position, child);
        }
        self.parents.insert(child, parent);
    }

    fn move_before(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>) {
        self.detach(child);
        if let Some(FakeNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
            let position = before
                .and_then(|b| children.iter().position(|c| *c == b))
                .unwrap_or(children.len());
            children.insert(position, child);
        }
        self.parents.insert(child, parent);
    }

    fn replace_with(&mut self, old: ElementId, new: ElementId) {
        if let Some(parent) = self.parents.get(&old).copied() {
            self.detach(new);
            if let Some(FakeNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
                if let Some(slot) = children.iter_mut().find(|c| **c == old) {
                    *slot = new;
                }
            }
            self.parents.insert(new, parent);
        }
        self.detach(old);
        self.nodes.remove(&old);
    }

    fn remove(&mut self, id: ElementId) {
        self.detach(id);
        self.nodes.remove(&id);
    }

    fn create_event_listener(&mut self, _id: ElementId, _name: &'static str) {}
    fn remove_event_listener(&mut self, _id: ElementId, _name: &'static str) {}
}

/// Lets a [`FakeDocument`] double as the existing-document side of a
/// hydration test: tags and children are read straight out of its own
/// node table rather than from a second, independent store.
impl HydrationSource for FakeDocument {
    fn tag_of(&self, id: ElementId) -> Option<std::rc::Rc<str>> {
        match self.nodes.get(&id)? {
            FakeNode::Element { tag, .. } => Some(std::rc::Rc::from(tag.as_str())),
            _ => None,
        }
    }

    fn children_of(&self, id: ElementId) -> Vec<ElementId> {
        FakeDocument::children_of(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::ElementId;

    #[test]
    fn fake_document_tracks_append_order() {
        let mut doc = FakeDocument::new();
        doc.create_element(ElementId(0), "ul");
        doc.create_element(ElementId(1), "li");
        doc.create_element(ElementId(2), "li");
        doc.append_child(ElementId(0), ElementId(1));
        doc.append_child(ElementId(0), ElementId(2));
        assert_eq!(doc.children_of(ElementId(0)), vec![ElementId(1), ElementId(2)]);
    }

    #[test]
    fn move_before_reorders_without_detaching_others() {
        let mut doc = FakeDocument::new();
        doc.create_element(ElementId(0), "ul");
        for i in 1..=3 {
            doc.create_element(ElementId(i), "li");
            doc.append_child(ElementId(0), ElementId(i));
        }
        doc.move_before(ElementId(0), ElementId(3), Some(ElementId(1)));
        assert_eq!(
            doc.children_of(ElementId(0)),
            vec![ElementId(3), ElementId(1), ElementId(2)]
        );
    }
}
