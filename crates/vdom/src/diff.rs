//! Positional reconciliation of a live display tree against a new
//! normalized tree, given the previous one.
//!
//! Contract:
//! - The live child at position `index` is assumed to correspond to the
//!   old node at that position; there is no keyed matching.
//! - Decision order per position: remove, append, text replace/no-op,
//!   tag replace, in-place update.
//! - Excess old children are trimmed from the end first, so indices of
//!   the children still to be removed stay valid.
//! - A missing live node at an index means the tree was mutated by another
//!   actor; removals and updates there are warn-and-skip, not a crash.

use crate::create::{apply_prop, clear_prop, create_node, event_type_of};
use crate::events::EventRegistry;
use crate::normalize::RenderNode;
use crate::vnode::{PropValue, Props};
use dom::Node;

/// Applies the minimal mutation at `index` under `parent` to take the live
/// child from `old` to `new`.
pub fn patch(
    parent: &Node,
    new: Option<&RenderNode>,
    old: Option<&RenderNode>,
    index: usize,
    events: &EventRegistry,
) {
    match (new, old) {
        (None, None) => {}
        (None, Some(_)) => remove_at(parent, index),
        (Some(new), None) => {
            // prior siblings are already positioned; appending lands at `index`
            let node = create_node(new, events);
            parent.append_child(&node);
        }
        (Some(new), Some(old)) => patch_existing(parent, new, old, index, events),
    }
}

/// The per-child loop shared by in-place element updates and the top-level
/// render entry: trim excess old children from the end, patch the shared
/// prefix, append the new tail.
pub fn patch_children(
    parent: &Node,
    new: &[RenderNode],
    old: &[RenderNode],
    events: &EventRegistry,
) {
    for index in (new.len()..old.len()).rev() {
        remove_at(parent, index);
    }
    let shared = new.len().min(old.len());
    for index in 0..shared {
        patch(parent, Some(&new[index]), Some(&old[index]), index, events);
    }
    for index in shared..new.len() {
        patch(parent, Some(&new[index]), None, index, events);
    }
}

fn patch_existing(
    parent: &Node,
    new: &RenderNode,
    old: &RenderNode,
    index: usize,
    events: &EventRegistry,
) {
    if matches!(new, RenderNode::Text(_)) || matches!(old, RenderNode::Text(_)) {
        // text-kind on either side: value equality decides replace vs no-op
        if new != old {
            replace_at(parent, new, index, events);
        }
        return;
    }
    let (RenderNode::Element(new_el), RenderNode::Element(old_el)) = (new, old) else {
        // fragments never appear below the top level of a normalized tree
        replace_at(parent, new, index, events);
        return;
    };
    if new_el.tag != old_el.tag {
        log::trace!(target: "vdom.diff", "tag change {} -> {} at index {index}", old_el.tag, new_el.tag);
        replace_at(parent, new, index, events);
        return;
    }
    let Some(node) = parent.child(index) else {
        log::warn!(target: "vdom.diff", "no live child at index {index}; update skipped");
        return;
    };
    update_props(&node, &new_el.props, &old_el.props, events);
    patch_children(&node, &new_el.children, &old_el.children, events);
}

/// Reconciles one prop map against another on a live node. Only keys whose
/// values actually differ are touched; a changed event-kind key retires its
/// old binding (handler or stale attribute) before the new value is applied.
fn update_props(node: &Node, new: &Props, old: &Props, events: &EventRegistry) {
    for (key, value) in old.iter() {
        if !new.contains(key) {
            clear_prop(node, key, value, events);
        }
    }
    for (key, value) in new.iter() {
        let previous = old.get(key);
        if previous == Some(value) {
            continue;
        }
        if let Some(event_type) = event_type_of(key) {
            match (previous, value) {
                // an old handler must stop dispatching whatever kind the
                // new value is, and its type count must drop
                (Some(PropValue::Handler(old_handler)), _) => {
                    events.unregister(node, &event_type, old_handler);
                }
                // a plain value became a handler: the attribute it left
                // behind is stale, apply_prop will not touch it
                (Some(_), PropValue::Handler(_)) => node.remove_attribute(key),
                _ => {}
            }
        }
        apply_prop(node, key, value, events);
    }
}

fn remove_at(parent: &Node, index: usize) {
    let Some(child) = parent.child(index) else {
        log::warn!(target: "vdom.diff", "no live child at index {index}; removal skipped");
        return;
    };
    if let Err(err) = parent.remove_child(&child) {
        log::warn!(target: "vdom.diff", "removal at index {index} failed: {err:?}");
    }
}

fn replace_at(parent: &Node, new: &RenderNode, index: usize, events: &EventRegistry) {
    let replacement = create_node(new, events);
    match parent.child(index) {
        Some(existing) => {
            if let Err(err) = parent.replace_child(&replacement, &existing) {
                log::warn!(target: "vdom.diff", "replace at index {index} failed: {err:?}");
            }
        }
        None => {
            log::warn!(target: "vdom.diff", "no live child at index {index}; appending replacement");
            parent.append_child(&replacement);
        }
    }
}
