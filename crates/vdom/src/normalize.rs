//! Normalization: resolving virtual nodes into a canonical, DOM-renderable
//! form.
//!
//! Invariants on the output:
//! - no component nodes remain (functions are invoked, results normalized);
//! - element children contain no empty leaves and no nested fragments;
//! - a fragment can only appear at the top level.
//!
//! Components are re-invoked on every render that reaches them; there is no
//! memoization. A panicking component propagates to the render caller — the
//! library's only error-propagation path.

use crate::vnode::{Props, VNode};

/// Normalized virtual node, ready for materialization and diffing.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    Text(String),
    Element(RenderElement),
    /// Only at the top level of a tree.
    Fragment(Vec<RenderNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderElement {
    pub tag: String,
    pub props: Props,
    pub children: Vec<RenderNode>,
}

pub fn normalize(vnode: &VNode) -> RenderNode {
    match vnode {
        // canonical empty text
        VNode::Empty => RenderNode::Text(String::new()),
        VNode::Text(text) => RenderNode::Text(text.clone()),
        VNode::Fragment(children) => RenderNode::Fragment(normalize_children(children)),
        VNode::Component(c) => {
            // components receive the original, unnormalized children
            let rendered = (c.func)(&c.props, &c.children);
            normalize(&rendered)
        }
        VNode::Element(e) => RenderNode::Element(RenderElement {
            tag: e.tag.clone(),
            props: e.props.clone(),
            children: normalize_children(&e.children),
        }),
    }
}

fn normalize_children(children: &[VNode]) -> Vec<RenderNode> {
    let mut out = Vec::new();
    for child in children {
        push_normalized(normalize(child), &mut out);
    }
    out
}

fn push_normalized(node: RenderNode, out: &mut Vec<RenderNode>) {
    match node {
        RenderNode::Text(text) if text.is_empty() => {}
        RenderNode::Fragment(children) => {
            for child in children {
                push_normalized(child, out);
            }
        }
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::{Props, component, el};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn empty_kinds_become_canonical_empty_text() {
        assert_eq!(normalize(&VNode::Empty), RenderNode::Text(String::new()));
        assert_eq!(
            normalize(&VNode::from(false)),
            RenderNode::Text(String::new())
        );
    }

    #[test]
    fn component_returning_nothing_yields_empty_text() {
        let node = component(|_, _| VNode::Empty, Props::new(), VNode::Empty);
        assert_eq!(normalize(&node), RenderNode::Text(String::new()));
    }

    #[test]
    fn element_children_are_filtered_after_normalization() {
        let node = el(
            "ul",
            Props::new(),
            vec![
                el("li", Props::new(), "a"),
                component(|_, _| VNode::Empty, Props::new(), VNode::Empty),
                el("li", Props::new(), "b"),
            ],
        );
        let RenderNode::Element(element) = normalize(&node) else {
            panic!("expected element");
        };
        assert_eq!(element.children.len(), 2);
    }

    #[test]
    fn component_fragments_splice_into_parent_children() {
        let items = component(
            |_, _| {
                VNode::Fragment(vec![
                    el("li", Props::new(), "a"),
                    el("li", Props::new(), "b"),
                ])
            },
            Props::new(),
            VNode::Empty,
        );
        let RenderNode::Element(element) = normalize(&el("ul", Props::new(), vec![items])) else {
            panic!("expected element");
        };
        assert_eq!(element.children.len(), 2);
        assert!(
            element
                .children
                .iter()
                .all(|c| matches!(c, RenderNode::Element(e) if e.tag == "li"))
        );
    }

    #[test]
    fn component_receives_unnormalized_children() {
        let saw_component_child = Rc::new(Cell::new(false));
        let probe = Rc::clone(&saw_component_child);
        let inner = component(|_, _| VNode::from("x"), Props::new(), VNode::Empty);
        let outer = component(
            move |_, children| {
                probe.set(matches!(children.first(), Some(VNode::Component(_))));
                VNode::Empty
            },
            Props::new(),
            vec![inner],
        );
        normalize(&outer);
        assert!(saw_component_child.get());
    }

    #[test]
    fn components_are_reinvoked_every_normalization() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let node = component(
            move |_, _| {
                counter.set(counter.get() + 1);
                VNode::from("x")
            },
            Props::new(),
            VNode::Empty,
        );
        normalize(&node);
        normalize(&node);
        assert_eq!(calls.get(), 2);
    }
}
