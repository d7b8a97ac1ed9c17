//! Native event objects and synchronous bubbling dispatch.
//!
//! Contract:
//! - Dispatch starts at the event target and walks parent links upward.
//! - Every listener registered for the type on a node runs before the walk
//!   moves on; `stop_propagation` takes effect between nodes, not between
//!   listeners on the same node.
//! - Listener lists are snapshotted before invocation, so a listener may
//!   add or remove listeners on the node being dispatched.

use crate::node::Node;
use std::cell::Cell;
use std::rc::Rc;

/// Native listener callback. Identity is `Rc::ptr_eq`.
pub type Listener = Rc<dyn Fn(&Event)>;

/// A native event: a type, a target, and a shared cancellation flag.
pub struct Event {
    event_type: String,
    target: Node,
    stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: Node) -> Self {
        Event {
            event_type: event_type.into(),
            target,
            stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn target(&self) -> Node {
        self.target.clone()
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// Synchronously dispatches `event` from its target up to the tree root.
pub fn dispatch(event: &Event) {
    log::trace!(target: "dom", "dispatch {} at {:?}", event.event_type(), event.target());
    let mut cursor = Some(event.target());
    while let Some(node) = cursor {
        for listener in node.listeners_for(event.event_type()) {
            listener(event);
        }
        if event.propagation_stopped() {
            break;
        }
        cursor = node.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn dispatch_bubbles_to_ancestors() {
        let root = Node::element("div");
        let leaf = Node::element("button");
        root.append_child(&leaf);

        let order = Rc::new(RefCell::new(Vec::new()));
        let at_leaf = Rc::clone(&order);
        leaf.add_event_listener("click", Rc::new(move |_| at_leaf.borrow_mut().push("leaf")));
        let at_root = Rc::clone(&order);
        root.add_event_listener("click", Rc::new(move |_| at_root.borrow_mut().push("root")));

        dispatch(&Event::new("click", leaf.clone()));
        assert_eq!(*order.borrow(), vec!["leaf", "root"]);
    }

    #[test]
    fn stop_propagation_halts_between_nodes() {
        let root = Node::element("div");
        let leaf = Node::element("button");
        root.append_child(&leaf);

        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        leaf.add_event_listener(
            "click",
            Rc::new(move |event: &Event| {
                first.borrow_mut().push("stop");
                event.stop_propagation();
            }),
        );
        let second = Rc::clone(&order);
        leaf.add_event_listener("click", Rc::new(move |_| second.borrow_mut().push("same-node")));
        let above = Rc::clone(&order);
        root.add_event_listener("click", Rc::new(move |_| above.borrow_mut().push("root")));

        dispatch(&Event::new("click", leaf.clone()));
        // listeners on the cancelled node still run; the ancestor does not
        assert_eq!(*order.borrow(), vec!["stop", "same-node"]);
    }

    #[test]
    fn listener_may_mutate_listener_list_during_dispatch() {
        let node = Node::element("div");
        let target = node.clone();
        let fired = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&fired);
        node.add_event_listener(
            "click",
            Rc::new(move |_| {
                count.set(count.get() + 1);
                target.add_event_listener("click", Rc::new(|_| {}));
            }),
        );
        dispatch(&Event::new("click", node.clone()));
        assert_eq!(fired.get(), 1);
        assert_eq!(node.listener_count("click"), 2);
    }
}
