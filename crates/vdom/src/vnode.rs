//! Virtual node construction.
//!
//! The factory flattens arbitrarily nested child sequences into one ordered
//! list, dropping empty slots at every level. No validation of tag or prop
//! shapes happens here; construction is pure.

use dom::{Event, Node};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Delegated event handler. Receives the node the handler was registered on
/// (the invocation context) and the live event. Identity is `Rc::ptr_eq`.
pub type Handler = Rc<dyn Fn(&Node, &Event)>;

/// Component function: props plus the original (unnormalized) children.
pub type Component = Rc<dyn Fn(&Props, &[VNode]) -> VNode>;

#[derive(Clone)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Handler(Handler),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(text) => write!(f, "Str({text:?})"),
            PropValue::Bool(flag) => write!(f, "Bool({flag})"),
            PropValue::Handler(h) => write!(f, "Handler({:p})", Rc::as_ptr(h)),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        PropValue::Handler(value)
    }
}

/// Wraps a closure as a delegated event handler.
pub fn handler(f: impl Fn(&Node, &Event) + 'static) -> Handler {
    Rc::new(f)
}

/// Ordered prop map. Iteration order is canonical (sorted by key).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Props::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }
}

/// A virtual node, pre-normalization.
#[derive(Clone, Debug)]
pub enum VNode {
    /// Renders to nothing; also produced from absent/`false` children.
    Empty,
    Text(String),
    /// Ordered sequence flattened into the parent's child list; never
    /// materialized as a node of its own.
    Fragment(Vec<VNode>),
    Element(Box<VElement>),
    /// Exists only pre-normalization.
    Component(ComponentVNode),
}

#[derive(Clone, Debug)]
pub struct VElement {
    pub tag: String,
    pub props: Props,
    pub children: Vec<VNode>,
}

#[derive(Clone)]
pub struct ComponentVNode {
    pub func: Component,
    pub props: Props,
    pub children: Vec<VNode>,
}

impl fmt::Debug for ComponentVNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentVNode")
            .field("func", &format_args!("{:p}", Rc::as_ptr(&self.func)))
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        VNode::Text(value)
    }
}

impl From<i64> for VNode {
    fn from(value: i64) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<f64> for VNode {
    fn from(value: f64) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<bool> for VNode {
    fn from(_: bool) -> Self {
        // booleans never render; `false` is additionally dropped by flatten
        VNode::Empty
    }
}

impl From<Vec<VNode>> for VNode {
    fn from(value: Vec<VNode>) -> Self {
        VNode::Fragment(value)
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => VNode::Empty,
        }
    }
}

/// Builds an element VNode. The child argument is flattened recursively:
/// nested fragments collapse into one ordered sequence and empty slots are
/// dropped at every level, while `"0"` and `""` text survive.
pub fn el(tag: impl Into<String>, props: Props, children: impl Into<VNode>) -> VNode {
    VNode::Element(Box::new(VElement {
        tag: tag.into(),
        props,
        children: flatten(children.into()),
    }))
}

/// Builds a component VNode; the function runs during normalization.
pub fn component(
    func: impl Fn(&Props, &[VNode]) -> VNode + 'static,
    props: Props,
    children: impl Into<VNode>,
) -> VNode {
    VNode::Component(ComponentVNode {
        func: Rc::new(func),
        props,
        children: flatten(children.into()),
    })
}

fn flatten(node: VNode) -> Vec<VNode> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

fn collect(node: VNode, out: &mut Vec<VNode>) {
    match node {
        VNode::Empty => {}
        VNode::Fragment(children) => {
            for child in children {
                collect(child, out);
            }
        }
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(node: &VNode) -> Vec<String> {
        let VNode::Element(element) = node else {
            panic!("expected element");
        };
        element
            .children
            .iter()
            .map(|child| match child {
                VNode::Element(e) => e.tag.clone(),
                VNode::Text(t) => format!("#{t}"),
                other => panic!("unexpected child {other:?}"),
            })
            .collect()
    }

    #[test]
    fn flatten_drops_empty_slots_at_every_level() {
        let node = el(
            "ul",
            Props::new(),
            vec![
                el("li", Props::new(), "a"),
                VNode::from(false),
                VNode::Fragment(vec![
                    VNode::Empty,
                    el("li", Props::new(), "b"),
                    VNode::Fragment(vec![VNode::Empty, el("li", Props::new(), "c")]),
                ]),
            ],
        );
        assert_eq!(tags(&node), ["li", "li", "li"]);
    }

    #[test]
    fn flatten_preserves_zero_and_empty_string() {
        let node = el(
            "div",
            Props::new(),
            vec![VNode::from(0i64), VNode::from(""), VNode::from(false)],
        );
        assert_eq!(tags(&node), ["#0", "#"]);
    }

    #[test]
    fn prop_handlers_compare_by_identity() {
        let a = handler(|_, _| {});
        let b = handler(|_, _| {});
        assert_eq!(
            PropValue::Handler(a.clone()),
            PropValue::Handler(a.clone())
        );
        assert_ne!(PropValue::Handler(a), PropValue::Handler(b));
    }
}
