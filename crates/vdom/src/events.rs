//! Event delegation.
//!
//! Instead of one native listener per node, each delegation root carries one
//! native listener per event type in use anywhere in the registry. The
//! listener walks from the event target up to the root, simulating bubbling
//! and invoking the handlers registered on each visited node.
//!
//! Contract:
//! - `register` is idempotent per (node, type, handler) triple.
//! - The first registration of a type anywhere installs a native listener
//!   on every delegation root; a root attached later catches up immediately.
//! - Handler counts are tracked per type; when the last handler of a type
//!   is gone (unregistered or its node dropped), the native root listeners
//!   for that type are removed.
//! - Node associations are weak: an entry never keeps a dropped display
//!   node alive, and dead entries are pruned on the next registry mutation.
//! - Dispatch snapshots the handler list per node, so handlers may mutate
//!   the registry they are being dispatched from.

use crate::vnode::Handler;
use dom::{Event, Listener, Node, NodeKey, WeakNode};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Delegation context. Cheap to clone; clones share one registry. Multiple
/// independent registries may coexist in a process (e.g. under test).
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Rc<RefCell<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    nodes: HashMap<NodeKey, NodeEntry>,
    type_counts: HashMap<String, usize>,
    roots: HashMap<NodeKey, RootEntry>,
}

struct NodeEntry {
    node: WeakNode,
    by_type: HashMap<String, Vec<Handler>>,
}

struct RootEntry {
    root: WeakNode,
    listeners: HashMap<String, Listener>,
}

impl EventRegistry {
    pub fn new() -> Self {
        EventRegistry::default()
    }

    /// Registers `handler` for `event_type` on `node`. Re-registering the
    /// same triple does not create duplicate dispatch.
    pub fn register(&self, node: &Node, event_type: &str, handler: &Handler) {
        self.prune();
        let weak_inner = Rc::downgrade(&self.inner);
        let mut state = self.inner.borrow_mut();

        let entry = state
            .nodes
            .entry(node.key())
            .or_insert_with(|| NodeEntry {
                node: node.downgrade(),
                by_type: HashMap::new(),
            });
        let handlers = entry.by_type.entry(event_type.to_string()).or_default();
        if handlers.iter().any(|h| Rc::ptr_eq(h, handler)) {
            return;
        }
        handlers.push(handler.clone());
        log::trace!(target: "vdom.events", "register {event_type} on {node:?}");

        let count = state.type_counts.entry(event_type.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            // first handler of this type anywhere: every root needs a listener
            let RegistryState { roots, .. } = &mut *state;
            for root_entry in roots.values_mut() {
                install_listener(root_entry, &weak_inner, event_type);
            }
        }
    }

    /// Removes exactly the (node, type, handler) triple, dropping empty
    /// entries and releasing the type's native listeners when it was the
    /// last handler of its type.
    pub fn unregister(&self, node: &Node, event_type: &str, handler: &Handler) {
        self.prune();
        let mut state = self.inner.borrow_mut();
        let key = node.key();
        let Some(entry) = state.nodes.get_mut(&key) else {
            return;
        };
        let Some(handlers) = entry.by_type.get_mut(event_type) else {
            return;
        };
        let Some(pos) = handlers.iter().position(|h| Rc::ptr_eq(h, handler)) else {
            return;
        };
        handlers.remove(pos);
        if handlers.is_empty() {
            entry.by_type.remove(event_type);
        }
        if entry.by_type.is_empty() {
            state.nodes.remove(&key);
        }
        log::trace!(target: "vdom.events", "unregister {event_type} on {node:?}");
        release_type(&mut state, event_type);
    }

    /// Marks `root` as a delegation root and installs native listeners for
    /// every event type currently in use. Idempotent.
    pub fn attach_root(&self, root: &Node) {
        self.prune();
        let weak_inner = Rc::downgrade(&self.inner);
        let mut state = self.inner.borrow_mut();
        let key = root.key();
        let RegistryState {
            roots, type_counts, ..
        } = &mut *state;
        let entry = roots.entry(key).or_insert_with(|| RootEntry {
            root: root.downgrade(),
            listeners: HashMap::new(),
        });
        for event_type in type_counts.keys() {
            install_listener(entry, &weak_inner, event_type);
        }
    }

    /// Teardown for a delegation root: removes its native listeners.
    pub fn detach_root(&self, root: &Node) {
        let mut state = self.inner.borrow_mut();
        if let Some(entry) = state.roots.remove(&root.key()) {
            for (event_type, listener) in &entry.listeners {
                root.remove_event_listener(event_type, listener);
            }
        }
    }

    /// Drops entries whose node or root has been dropped, releasing the
    /// handler counts they held.
    fn prune(&self) {
        let mut state = self.inner.borrow_mut();
        let dead: Vec<NodeKey> = state
            .nodes
            .iter()
            .filter(|(_, entry)| entry.node.upgrade().is_none())
            .map(|(key, _)| *key)
            .collect();
        for key in dead {
            if let Some(entry) = state.nodes.remove(&key) {
                for (event_type, handlers) in entry.by_type {
                    for _ in handlers {
                        release_type(&mut state, &event_type);
                    }
                }
            }
        }
        state
            .roots
            .retain(|_, entry| entry.root.upgrade().is_some());
    }
}

/// Decrements the global count for a type; on zero, removes the type's
/// native listener from every root.
fn release_type(state: &mut RegistryState, event_type: &str) {
    let Some(count) = state.type_counts.get_mut(event_type) else {
        return;
    };
    *count -= 1;
    if *count > 0 {
        return;
    }
    state.type_counts.remove(event_type);
    for entry in state.roots.values_mut() {
        if let Some(listener) = entry.listeners.remove(event_type) {
            if let Some(root) = entry.root.upgrade() {
                root.remove_event_listener(event_type, &listener);
            }
        }
    }
}

fn install_listener(
    entry: &mut RootEntry,
    inner: &Weak<RefCell<RegistryState>>,
    event_type: &str,
) {
    if entry.listeners.contains_key(event_type) {
        return;
    }
    let Some(root) = entry.root.upgrade() else {
        return;
    };
    let listener = make_listener(inner.clone(), entry.root.clone(), event_type.to_string());
    root.add_event_listener(event_type, listener.clone());
    entry.listeners.insert(event_type.to_string(), listener);
}

/// The one native listener per (root, type): synthetic bubbling from the
/// event target up to and including the root.
fn make_listener(
    inner: Weak<RefCell<RegistryState>>,
    root: WeakNode,
    event_type: String,
) -> Listener {
    Rc::new(move |event: &Event| {
        let Some(state) = inner.upgrade() else {
            return;
        };
        let Some(root) = root.upgrade() else {
            return;
        };
        let mut cursor = Some(event.target());
        while let Some(node) = cursor {
            // snapshot, then drop the registry borrow before invoking:
            // handlers may re-enter the registry
            let handlers = handlers_for(&state.borrow(), &node, &event_type);
            for handler in &handlers {
                handler(&node, event);
            }
            // cancellation takes effect between nodes; handlers already
            // scheduled at this node have all run
            if event.propagation_stopped() {
                break;
            }
            if Node::ptr_eq(&node, &root) {
                break;
            }
            cursor = node.parent();
        }
    })
}

fn handlers_for(state: &RegistryState, node: &Node, event_type: &str) -> Vec<Handler> {
    let Some(entry) = state.nodes.get(&node.key()) else {
        return Vec::new();
    };
    // a key can be reused by a new allocation; confirm the entry's weak
    // handle still points at this node
    match entry.node.upgrade() {
        Some(live) if Node::ptr_eq(&live, node) => {}
        _ => return Vec::new(),
    }
    entry
        .by_type
        .get(event_type)
        .cloned()
        .unwrap_or_default()
}
