//! Materialization: first-time construction of display nodes from a
//! normalized tree, including the attribute-application rule shared with
//! the reconciler.

use crate::events::EventRegistry;
use crate::normalize::{RenderElement, RenderNode};
use crate::vnode::PropValue;
use dom::{Node, PropertyValue};

/// Materializes a single text or element node. Fragments cannot become a
/// single node; route them through [`create_nodes`].
pub fn create_node(vnode: &RenderNode, events: &EventRegistry) -> Node {
    match vnode {
        RenderNode::Text(text) => Node::text(text.clone()),
        RenderNode::Element(element) => create_element(element, events),
        RenderNode::Fragment(_) => {
            panic!("fragments materialize as siblings; use create_nodes")
        }
    }
}

/// Materializes any normalized node, expanding a top-level fragment into
/// the sibling sequence it represents.
pub fn create_nodes(vnode: &RenderNode, events: &EventRegistry) -> Vec<Node> {
    match vnode {
        RenderNode::Fragment(children) => children
            .iter()
            .flat_map(|child| create_nodes(child, events))
            .collect(),
        other => vec![create_node(other, events)],
    }
}

fn create_element(element: &RenderElement, events: &EventRegistry) -> Node {
    let node = Node::element(element.tag.clone());
    for (key, value) in element.props.iter() {
        apply_prop(&node, key, value, events);
    }
    for child in &element.children {
        let created = create_node(child, events);
        node.append_child(&created);
    }
    node
}

/// The event type encoded by a handler prop key (`onClick` -> `click`).
pub(crate) fn event_type_of(key: &str) -> Option<String> {
    key.strip_prefix("on")
        .filter(|rest| !rest.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Applies one prop to a live node. Used on creation and by the reconciler
/// when a value changes.
pub(crate) fn apply_prop(node: &Node, key: &str, value: &PropValue, events: &EventRegistry) {
    if let PropValue::Handler(handler) = value {
        let Some(event_type) = event_type_of(key) else {
            // silent failure here would corrupt later prop diffs
            panic!("event handler bound to non-event prop {key:?}");
        };
        events.register(node, &event_type, handler);
        return;
    }
    if key == "className" {
        node.set_attribute("class", &attr_value(value));
        return;
    }
    if key.starts_with("data-") {
        node.set_attribute(key, &attr_value(value));
        return;
    }
    if key == "checked" || key == "selected" {
        // interactive state: live property only, never a static attribute
        node.set_property(key, property_value(value));
        return;
    }
    if let PropValue::Bool(flag) = value {
        node.set_property(key, PropertyValue::Bool(*flag));
        if *flag {
            node.set_attribute(key, "");
        } else {
            node.remove_attribute(key);
        }
        return;
    }
    node.set_attribute(key, &attr_value(value));
}

/// Undoes one prop's effect when its key disappears from the new tree.
pub(crate) fn clear_prop(node: &Node, key: &str, value: &PropValue, events: &EventRegistry) {
    if let PropValue::Handler(handler) = value {
        if let Some(event_type) = event_type_of(key) {
            events.unregister(node, &event_type, handler);
        }
        return;
    }
    if key == "className" {
        node.remove_attribute("class");
        return;
    }
    if key == "checked" || key == "selected" {
        node.set_property(key, PropertyValue::Bool(false));
        return;
    }
    if matches!(value, PropValue::Bool(_)) {
        node.set_property(key, PropertyValue::Bool(false));
        node.remove_attribute(key);
        return;
    }
    node.remove_attribute(key);
}

fn attr_value(value: &PropValue) -> String {
    match value {
        PropValue::Str(text) => text.clone(),
        PropValue::Bool(flag) => flag.to_string(),
        PropValue::Handler(_) => unreachable!("handler props never coerce to attributes"),
    }
}

fn property_value(value: &PropValue) -> PropertyValue {
    match value {
        PropValue::Bool(flag) => PropertyValue::Bool(*flag),
        PropValue::Str(text) => PropertyValue::Str(text.clone()),
        PropValue::Handler(_) => unreachable!("handler props never coerce to properties"),
    }
}
