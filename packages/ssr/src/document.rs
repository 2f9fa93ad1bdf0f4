//! An in-memory document tree that serializes to an HTML string.
//!
//! Grounded on `weave-testing::FakeDocument`: the same `WriteMutations`
//! implementation shape (a flat node table keyed by `ElementId`, a parent
//! map, and a root list), except this tree is built only once, via
//! [`weave_core::VirtualDom::rebuild`], and then walked exactly once to
//! produce a string rather than being queried by assertions.

use askama_escape::{escape, Html};
use rustc_hash::FxHashMap;
use std::fmt::Write;
use weave_core::{AttributeValue, ElementId, ScopeId, WriteMutations};

/// Tags with no closing tag and no children, per the HTML5 void element
/// list. Any attempt to give one of these children would come from a
/// producer bug, not a case this serializer needs to handle; it only
/// changes how the opening tag is written.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

enum DocNode {
    Element {
        tag: String,
        attrs: Vec<(String, AttributeValue)>,
        children: Vec<ElementId>,
    },
    Text(String),
    Placeholder,
}

/// A [`WriteMutations`] sink that only ever sees the single, flat batch of
/// edits an SSR [`weave_core::VirtualDom::rebuild`] produces (create-only:
/// no diffing mutation reaches a sink that is never handed a second flush),
/// then renders that tree to a string on demand.
#[derive(Default)]
pub(crate) struct HtmlDocument {
    nodes: FxHashMap<ElementId, DocNode>,
    parents: FxHashMap<ElementId, ElementId>,
    roots: Vec<ElementId>,
}

impl HtmlDocument {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serializes every root, in the order mutations created them, as the
    /// document's top-level markup.
    pub(crate) fn into_html(self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.write_node(&mut out, *root);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: ElementId) {
        match self.nodes.get(&id) {
            Some(DocNode::Text(text)) => {
                write!(out, "{}", escape(text, Html)).expect("writing to a String never fails");
            }
            Some(DocNode::Placeholder) => {}
            Some(DocNode::Element { tag, attrs, children }) => {
                write!(out, "<{tag}").expect("writing to a String never fails");
                for (name, value) in attrs {
                    write_attribute(out, name, value);
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    self.write_node(out, *child);
                }
                write!(out, "</{tag}>").expect("writing to a String never fails");
            }
            None => {}
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(DocNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
                children.retain(|c| *c != id);
            }
        } else {
            self.roots.retain(|r| *r != id);
        }
    }
}

fn write_attribute(out: &mut String, name: &str, value: &AttributeValue) {
    match value {
        AttributeValue::Text(text) => {
            write!(out, " {name}=\"{}\"", escape(text, Html)).expect("writing to a String never fails");
        }
        AttributeValue::Float(v) => write!(out, " {name}=\"{v}\"").expect("writing to a String never fails"),
        AttributeValue::Int(v) => write!(out, " {name}=\"{v}\"").expect("writing to a String never fails"),
        // HTML boolean attribute convention: present (bare) when true,
        // entirely absent when false - `disabled` rather than
        // `disabled="false"`.
        AttributeValue::Bool(true) => write!(out, " {name}").expect("writing to a String never fails"),
        AttributeValue::Bool(false) | AttributeValue::None => {}
        // An event listener has no serialized form; SSR output is static
        // markup, and the client's hydration pass is what wires listeners
        // back up against the DOM this string became.
        AttributeValue::Listener { .. } => {}
    }
}

impl WriteMutations for HtmlDocument {
    fn create_element(&mut self, id: ElementId, tag: &str) {
        self.nodes.insert(
            id,
            DocNode::Element {
                tag: tag.to_string(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
        );
        self.roots.push(id);
    }

    fn create_text(&mut self, id: ElementId, value: &str) {
        self.nodes.insert(id, DocNode::Text(value.to_string()));
        self.roots.push(id);
    }

    fn create_placeholder(&mut self, id: ElementId) {
        self.nodes.insert(id, DocNode::Placeholder);
        self.roots.push(id);
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &AttributeValue) {
        if let Some(DocNode::Element { attrs, .. }) = self.nodes.get_mut(&id) {
            attrs.retain(|(existing, _)| existing != name);
            attrs.push((name.to_string(), value.clone()));
        }
    }

    fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(DocNode::Element { attrs, .. }) = self.nodes.get_mut(&id) {
            attrs.retain(|(existing, _)| existing != name);
        }
    }

    fn set_text(&mut self, id: ElementId, value: &str) {
        if let Some(DocNode::Text(text)) = self.nodes.get_mut(&id) {
            *text = value.to_string();
        }
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        if let Some(DocNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
            children.push(child);
        }
        self.parents.insert(child, parent);
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, before: ElementId) {
        self.detach(child);
        if let Some(DocNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
            let position = children.iter().position(|c| *c == before).unwrap_or(children.len());
            children.insert(position, child);
        }
        self.parents.insert(child, parent);
    }

    fn move_before(&mut self, parent: ElementId, child: ElementId, before: Option<ElementId>) {
        self.detach(child);
        if let Some(DocNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
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
            if let Some(DocNode::Element { children, .. }) = self.nodes.get_mut(&parent) {
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
    fn mark_scope_committed(&mut self, _scope: ScopeId) {}
}
