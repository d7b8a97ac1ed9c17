//! Render entry point: normalize, then materialize or reconcile against the
//! container's stored baseline.
//!
//! Each container owns exactly one previously-rendered normalized tree. The
//! baseline is weakly keyed by container and replaced only after the render
//! completed, so a panicking component leaves both the live tree and the
//! baseline untouched.

use crate::create::create_node;
use crate::diff::patch_children;
use crate::events::EventRegistry;
use crate::normalize::{RenderNode, normalize};
use crate::vnode::VNode;
use dom::{Node, NodeKey, WeakNode};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
pub struct Renderer {
    events: EventRegistry,
    baselines: RefCell<HashMap<NodeKey, Baseline>>,
}

struct Baseline {
    container: WeakNode,
    children: Vec<RenderNode>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer::default()
    }

    /// The delegation context used by this renderer.
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Renders `vnode` into `container`: a full build on first render, a
    /// positional diff against the stored baseline afterwards.
    pub fn render(&self, vnode: &VNode, container: &Node) {
        // normalize before any mutation; component panics escape here,
        // leaving the previous render fully intact
        let new_children = into_child_list(normalize(vnode));

        self.events.attach_root(container);
        self.prune_baselines();

        let key = container.key();
        let previous = self.baselines.borrow().get(&key).and_then(|baseline| {
            baseline
                .container
                .upgrade()
                .filter(|node| Node::ptr_eq(node, container))
                .map(|_| baseline.children.clone())
        });

        match previous {
            Some(old_children) => {
                patch_children(container, &new_children, &old_children, &self.events);
            }
            None => {
                container.clear_children();
                for child in &new_children {
                    let node = create_node(child, &self.events);
                    container.append_child(&node);
                }
            }
        }

        self.baselines.borrow_mut().insert(
            key,
            Baseline {
                container: container.downgrade(),
                children: new_children,
            },
        );
    }

    fn prune_baselines(&self) {
        self.baselines
            .borrow_mut()
            .retain(|_, baseline| baseline.container.upgrade().is_some());
    }
}

/// A top-level fragment renders as the container's child list; anything
/// else is a single child.
fn into_child_list(node: RenderNode) -> Vec<RenderNode> {
    match node {
        RenderNode::Fragment(children) => children,
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::{Props, component, el};

    #[test]
    fn first_render_replaces_existing_container_content() {
        let renderer = Renderer::new();
        let container = Node::element("main");
        container.append_child(&Node::text("stale"));

        renderer.render(&el("div", Props::new(), "fresh"), &container);
        assert_eq!(container.child_count(), 1);
        assert_eq!(container.child(0).unwrap().tag().as_deref(), Some("div"));
    }

    #[test]
    fn rerender_reuses_the_live_root_node() {
        let renderer = Renderer::new();
        let container = Node::element("main");
        renderer.render(&el("div", Props::new(), "a"), &container);
        let before = container.child(0).unwrap();
        renderer.render(&el("div", Props::new(), "b"), &container);
        assert!(Node::ptr_eq(&container.child(0).unwrap(), &before));
    }

    #[test]
    fn top_level_fragment_renders_as_sibling_children() {
        let renderer = Renderer::new();
        let container = Node::element("main");
        renderer.render(
            &VNode::Fragment(vec![
                el("header", Props::new(), VNode::Empty),
                el("footer", Props::new(), VNode::Empty),
            ]),
            &container,
        );
        assert_eq!(container.child_count(), 2);
        assert_eq!(container.child(0).unwrap().tag().as_deref(), Some("header"));
        assert_eq!(container.child(1).unwrap().tag().as_deref(), Some("footer"));
    }

    #[test]
    fn independent_containers_keep_independent_baselines() {
        let renderer = Renderer::new();
        let first = Node::element("main");
        let second = Node::element("aside");
        renderer.render(&el("div", Props::new(), "a"), &first);
        renderer.render(&el("p", Props::new(), "b"), &second);

        renderer.render(&el("div", Props::new(), "a2"), &first);
        assert_eq!(first.child(0).unwrap().tag().as_deref(), Some("div"));
        assert_eq!(second.child(0).unwrap().tag().as_deref(), Some("p"));
    }

    #[test]
    fn panicking_component_leaves_previous_render_intact() {
        let renderer = Renderer::new();
        let container = Node::element("main");
        renderer.render(&el("div", Props::new(), "keep"), &container);

        let boom = component(|_, _| panic!("render failure"), Props::new(), VNode::Empty);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            renderer.render(&boom, &container);
        }));
        assert!(result.is_err());
        assert_eq!(container.child_count(), 1);
        assert_eq!(container.child(0).unwrap().tag().as_deref(), Some("div"));

        // the baseline is also untouched: the next render still diffs
        let before = container.child(0).unwrap();
        renderer.render(&el("div", Props::new(), "keep"), &container);
        assert!(Node::ptr_eq(&container.child(0).unwrap(), &before));
    }
}
