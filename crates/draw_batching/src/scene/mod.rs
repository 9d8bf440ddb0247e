//! Scene access layer
//!
//! The batching pass never owns scene nodes. It reads and temporarily
//! rewrites two fields per node (child list and local opacity) through the
//! [`SceneAccess`] capability trait, which any scene-graph backend can
//! implement.
//!
//! ## Architecture
//!
//! ```text
//! Host scene graph
//!      ↓  (SceneAccess)
//! Batching pass (flatten / restore)
//!      ↓
//! Renderer (merges contiguous siblings into draw calls)
//! ```
//!
//! [`NodeTree`] is a self-contained backend used by tests and demos.

mod access;
mod bounds;
mod node_tree;

pub use access::SceneAccess;
pub use bounds::Aabb;
pub use node_tree::{Capabilities, Color, NodeId, NodeTree, SceneError, SceneNode};
