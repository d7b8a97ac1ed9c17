//! Minimal virtual-DOM rendering library.
//!
//! A declarative tree of virtual nodes is normalized into a canonical,
//! component-free form, materialized into `dom` nodes on first render, and
//! reconciled in place on later renders. Event handlers are delegated:
//! one native listener per (root, event type), dispatched to descendants
//! via simulated bubbling.
//!
//! Known limitation: children are matched purely by positional index.
//! Reordering a list manifests as cascading replaces/updates, not moves.

pub mod create;
pub mod diff;
pub mod events;
pub mod normalize;
pub mod render;
pub mod store;
pub mod vnode;

pub use crate::create::{create_node, create_nodes};
pub use crate::diff::{patch, patch_children};
pub use crate::events::EventRegistry;
pub use crate::normalize::{RenderElement, RenderNode, normalize};
pub use crate::render::Renderer;
pub use crate::store::{Store, Subscription};
pub use crate::vnode::{Component, Handler, PropValue, Props, VNode, component, el, handler};
