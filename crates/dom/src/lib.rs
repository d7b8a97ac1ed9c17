//! In-memory display tree.
//!
//! This crate is the host side of the rendering boundary: reference-counted
//! nodes with weak parent links, attribute and live-property storage, and
//! synchronous native event dispatch with bubbling. It knows nothing about
//! virtual nodes or diffing.

pub mod event;
pub mod node;
pub mod snapshot;
pub mod stats;

pub use crate::event::{Event, Listener, dispatch};
pub use crate::node::{DomError, Node, NodeKey, PropertyValue, WeakNode};
pub use crate::snapshot::{TreeSnapshot, assert_tree_eq};
