use crate::event::Listener;
use crate::stats;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Errors from fallible tree mutations.
#[derive(Debug, PartialEq, Eq)]
pub enum DomError {
    NotAChild,
}

/// Live (reflecting) property value, distinct from static attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Str(String),
}

enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        properties: BTreeMap<String, PropertyValue>,
    },
    Text {
        text: String,
    },
}

struct NodeData {
    kind: NodeKind,
    parent: Option<WeakNode>,
    children: Vec<Node>,
    listeners: Vec<(String, Listener)>,
}

/// Cheap-clone handle to a display node. Identity is pointer identity;
/// use [`Node::ptr_eq`] to compare handles.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

/// Non-owning handle; upgrades to `None` once the node is dropped.
#[derive(Clone)]
pub struct WeakNode(Weak<RefCell<NodeData>>);

/// Copyable map key derived from a node's allocation. A key on its own
/// cannot prove the node is still alive; pair it with a [`WeakNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind: NodeKind::Element {
                tag: tag.into(),
                attributes: BTreeMap::new(),
                properties: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind: NodeKind::Text { text: value.into() },
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn key(&self) -> NodeKey {
        NodeKey(Rc::as_ptr(&self.0) as usize)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text { .. })
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn text_content(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text { text } => Some(text.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn set_text(&self, value: impl Into<String>) {
        let mut data = self.0.borrow_mut();
        match &mut data.kind {
            NodeKind::Text { text } => {
                *text = value.into();
                stats::record_attribute();
            }
            NodeKind::Element { .. } => {
                log::warn!(target: "dom", "set_text on an element node ignored");
            }
        }
    }

    // --- tree structure ---

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.as_ref().and_then(WeakNode::upgrade)
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Appends `child` at the end of the child list, detaching it from any
    /// previous parent first.
    pub fn append_child(&self, child: &Node) {
        child.detach();
        child.0.borrow_mut().parent = Some(self.downgrade());
        self.0.borrow_mut().children.push(child.clone());
        stats::record_structural();
    }

    pub fn remove_child(&self, child: &Node) -> Result<(), DomError> {
        let mut data = self.0.borrow_mut();
        let Some(pos) = data.children.iter().position(|c| Node::ptr_eq(c, child)) else {
            return Err(DomError::NotAChild);
        };
        data.children.remove(pos);
        drop(data);
        child.0.borrow_mut().parent = None;
        stats::record_structural();
        Ok(())
    }

    pub fn replace_child(&self, new: &Node, old: &Node) -> Result<(), DomError> {
        new.detach();
        let mut data = self.0.borrow_mut();
        let Some(pos) = data.children.iter().position(|c| Node::ptr_eq(c, old)) else {
            return Err(DomError::NotAChild);
        };
        data.children[pos] = new.clone();
        drop(data);
        old.0.borrow_mut().parent = None;
        new.0.borrow_mut().parent = Some(self.downgrade());
        stats::record_structural();
        Ok(())
    }

    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = None;
            stats::record_structural();
        }
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            let _ = parent.remove_child(self);
        }
    }

    // --- attributes and properties ---

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut data = self.0.borrow_mut();
        match &mut data.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
                stats::record_attribute();
            }
            NodeKind::Text { .. } => {
                log::warn!(target: "dom", "set_attribute({name}) on a text node ignored");
            }
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let mut data = self.0.borrow_mut();
        match &mut data.kind {
            NodeKind::Element { attributes, .. } => {
                if attributes.remove(name).is_some() {
                    stats::record_attribute();
                }
            }
            NodeKind::Text { .. } => {
                log::warn!(target: "dom", "remove_attribute({name}) on a text node ignored");
            }
        }
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            NodeKind::Text { .. } => Vec::new(),
        }
    }

    pub fn set_property(&self, name: &str, value: PropertyValue) {
        let mut data = self.0.borrow_mut();
        match &mut data.kind {
            NodeKind::Element { properties, .. } => {
                properties.insert(name.to_string(), value);
                stats::record_attribute();
            }
            NodeKind::Text { .. } => {
                log::warn!(target: "dom", "set_property({name}) on a text node ignored");
            }
        }
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        match &self.0.borrow().kind {
            NodeKind::Element { properties, .. } => properties.get(name).cloned(),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn properties(&self) -> Vec<(String, PropertyValue)> {
        match &self.0.borrow().kind {
            NodeKind::Element { properties, .. } => properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            NodeKind::Text { .. } => Vec::new(),
        }
    }

    // --- native event listeners ---

    pub fn add_event_listener(&self, event_type: &str, listener: Listener) {
        self.0
            .borrow_mut()
            .listeners
            .push((event_type.to_string(), listener));
    }

    /// Removes the first listener matching by pointer identity for the type.
    pub fn remove_event_listener(&self, event_type: &str, listener: &Listener) {
        let mut data = self.0.borrow_mut();
        if let Some(pos) = data
            .listeners
            .iter()
            .position(|(t, l)| t.as_str() == event_type && Rc::ptr_eq(l, listener))
        {
            data.listeners.remove(pos);
        }
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(t, _)| t.as_str() == event_type)
            .count()
    }

    /// Snapshot of the listeners for a type. Cloned out so that listener
    /// invocation never holds the node borrow (listeners may mutate the node).
    pub(crate) fn listeners_for(&self, event_type: &str) -> Vec<Listener> {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(t, _)| t.as_str() == event_type)
            .map(|(_, l)| l.clone())
            .collect()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => write!(f, "Node::Element(<{tag}>)"),
            NodeKind::Text { text } => write!(f, "Node::Text({text:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_moves_node_between_parents() {
        let a = Node::element("div");
        let b = Node::element("span");
        let child = Node::text("x");
        a.append_child(&child);
        assert_eq!(a.child_count(), 1);
        b.append_child(&child);
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(Node::ptr_eq(&child.parent().unwrap(), &b));
    }

    #[test]
    fn remove_child_rejects_non_children() {
        let parent = Node::element("div");
        let stranger = Node::element("p");
        assert_eq!(parent.remove_child(&stranger), Err(DomError::NotAChild));
    }

    #[test]
    fn replace_child_swaps_in_place() {
        let parent = Node::element("ul");
        let first = Node::element("li");
        let second = Node::element("li");
        parent.append_child(&first);
        parent.append_child(&second);
        let replacement = Node::element("p");
        parent.replace_child(&replacement, &first).unwrap();
        assert!(Node::ptr_eq(&parent.child(0).unwrap(), &replacement));
        assert!(Node::ptr_eq(&parent.child(1).unwrap(), &second));
        assert!(first.parent().is_none());
    }

    #[test]
    fn attributes_and_properties_are_separate() {
        let node = Node::element("input");
        node.set_attribute("type", "checkbox");
        node.set_property("checked", PropertyValue::Bool(true));
        assert_eq!(node.attribute("type").as_deref(), Some("checkbox"));
        assert_eq!(node.attribute("checked"), None);
        assert_eq!(node.property("checked"), Some(PropertyValue::Bool(true)));
    }

    #[test]
    fn text_nodes_ignore_attribute_calls() {
        let node = Node::text("hi");
        node.set_attribute("class", "x");
        assert_eq!(node.attribute("class"), None);
        assert_eq!(node.text_content().as_deref(), Some("hi"));
        node.set_text("bye");
        assert_eq!(node.text_content().as_deref(), Some("bye"));
    }
}
