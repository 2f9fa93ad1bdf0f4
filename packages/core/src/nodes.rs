//! The VNode model.
//!
//! Unlike the bump-arena template system this crate's ancestor used, trees
//! here are plain owned values: a render produces a brand new [`VNode`] tree
//! every time, and nothing about a `VNode` is ever mutated after
//! construction. The reconciler compares a freshly produced tree against the
//! previous one and emits [`crate::mutations::Mutation`]s describing the
//! delta; it never reaches back into either tree to patch it in place.

use crate::any_props::{AnyProps, VProps};
use crate::instance::Scope;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// The identity used for keyed reconciliation. Two sibling nodes with the
/// same key are treated as the same logical child across renders even if
/// their position in the list changes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Int(u64),
    Str(Rc<str>),
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(i) => write!(f, "{i}"),
            NodeKey::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<u64> for NodeKey {
    fn from(v: u64) -> Self {
        NodeKey::Int(v)
    }
}

impl From<&str> for NodeKey {
    fn from(v: &str) -> Self {
        NodeKey::Str(Rc::from(v))
    }
}

impl From<String> for NodeKey {
    fn from(v: String) -> Self {
        NodeKey::Str(Rc::from(v.as_str()))
    }
}

/// A description of a tree rooted at a single logical position. Component
/// renders always produce one of these (or `None`, for a component that
/// chooses to render nothing).
pub type Element = Option<VNode>;

/// A host-element attribute value.
#[derive(Clone)]
pub enum AttributeValue {
    Text(Rc<str>),
    Float(f64),
    Int(i64),
    Bool(bool),
    /// An event listener; compared by pointer identity only, never by value,
    /// since closures capturing component state cannot be meaningfully
    /// diffed. `event` is the host event name ("click", "input", ...) and is
    /// registered separately from ordinary attributes via
    /// `WriteMutations::create_event_listener`.
    Listener {
        event: &'static str,
        handler: Rc<dyn Fn(&dyn Any)>,
    },
    None,
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Listener { event, .. } => write!(f, "Listener({event})"),
            Self::None => f.write_str("None"),
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Listener { handler: a, .. }, Self::Listener { handler: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            (Self::None, Self::None) => true,
            _ => false,
        }
    }
}

/// A single attribute on an element, paired with its name.
#[derive(Debug, Clone, PartialEq)]
pub struct VAttribute {
    pub name: Rc<str>,
    pub value: AttributeValue,
}

/// A host element (`div`, `button`, ...) with its attributes and children.
#[derive(Debug, Clone)]
pub struct VElement {
    pub tag: Rc<str>,
    pub key: Option<NodeKey>,
    pub attrs: Vec<VAttribute>,
    pub children: Vec<VNode>,
}

/// A mounted component call site: which function produced this subtree, the
/// type-erased props it was called with, and the key used to match it
/// across renders of a keyed list.
#[derive(Clone)]
pub struct VComponent {
    pub key: Option<NodeKey>,
    pub(crate) props: Rc<dyn AnyProps>,
}

impl fmt::Debug for VComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VComponent")
            .field("name", &self.props.component_name())
            .field("key", &self.key)
            .finish()
    }
}

impl VComponent {
    pub fn new(props: Rc<dyn AnyProps>, key: Option<NodeKey>) -> Self {
        Self { key, props }
    }

    /// Builds a component call site from a plain render function, without
    /// exposing the `AnyProps` type-erasure machinery to callers outside
    /// this crate. `memo` is consulted nowhere yet (child components always
    /// re-render alongside their parent); it exists so a future skip-if-equal
    /// optimization has somewhere to read from without changing this
    /// signature.
    pub fn component<P: Clone + 'static>(
        render_fn: fn(P, &Scope) -> Element,
        memo: fn(&P, &P) -> bool,
        props: P,
        name: &'static str,
        key: Option<NodeKey>,
    ) -> Self {
        Self::new(Rc::new(VProps::new(render_fn, memo, props, name)), key)
    }

    /// Identity used for the "same shape" check: two component nodes at the
    /// same position are considered the same *type* of component only if
    /// the function pointer that would render them is identical.
    pub(crate) fn render_identity(&self) -> usize {
        self.props.fn_ptr()
    }
}

/// A node in a rendered tree.
#[derive(Debug, Clone)]
pub enum VNode {
    Element(VElement),
    Text(Rc<str>),
    Fragment(Vec<VNode>),
    Component(VComponent),
    /// A placeholder reserved for a subtree that is not yet available (an
    /// unresolved resource, a suspended boundary). Holds no children and no
    /// key; the slot it occupies is identified purely by its position.
    Placeholder,
}

impl VNode {
    pub fn key(&self) -> Option<&NodeKey> {
        match self {
            VNode::Element(e) => e.key.as_ref(),
            VNode::Component(c) => c.key.as_ref(),
            _ => None,
        }
    }

    /// Whether `self` and `other` describe the same *shape* of node (same
    /// variant, and for elements/components the same tag/identity), so that
    /// the reconciler may attempt an in-place diff instead of a full
    /// replace. Does not compare attributes, text content or children.
    pub(crate) fn same_shape(&self, other: &VNode) -> bool {
        match (self, other) {
            (VNode::Element(a), VNode::Element(b)) => a.tag == b.tag,
            (VNode::Text(_), VNode::Text(_)) => true,
            (VNode::Fragment(_), VNode::Fragment(_)) => true,
            (VNode::Component(a), VNode::Component(b)) => {
                a.render_identity() == b.render_identity()
            }
            (VNode::Placeholder, VNode::Placeholder) => true,
            _ => false,
        }
    }
}

impl VElement {
    pub fn new(tag: impl Into<Rc<str>>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<NodeKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<Rc<str>>, value: AttributeValue) -> Self {
        self.attrs.push(VAttribute {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_children(mut self, children: Vec<VNode>) -> Self {
        self.children = children;
        self
    }
}
