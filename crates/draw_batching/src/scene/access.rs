//! Scene capability trait
//!
//! Pluggable access to a host scene graph. The batching pass only needs a
//! narrow slice of node state, so backends expose exactly that.

use std::fmt::Debug;
use std::hash::Hash;

use super::Aabb;

/// Capability interface the batching pass uses to read and rewrite nodes
///
/// Every method must tolerate stale ids: queries on a destroyed node return
/// the neutral value (`false`, empty, `None`, `1.0`) and writes are ignored.
pub trait SceneAccess {
    /// Backend node handle
    type NodeId: Copy + Eq + Hash + Debug;

    /// Whether the node still exists
    fn is_valid(&self, node: Self::NodeId) -> bool;

    /// Node name, used as the draw-layer key below depth zero
    fn name(&self, node: Self::NodeId) -> Option<&str>;

    /// Live child list
    fn children(&self, node: Self::NodeId) -> &[Self::NodeId];

    /// Swap the live child list, returning the previous one
    ///
    /// Only the child-list field changes; parent links are left alone.
    fn replace_children(
        &mut self,
        node: Self::NodeId,
        children: Vec<Self::NodeId>,
    ) -> Vec<Self::NodeId>;

    /// Local opacity multiplier
    fn local_opacity(&self, node: Self::NodeId) -> f32;

    /// Overwrite the local opacity multiplier
    fn set_local_opacity(&mut self, node: Self::NodeId, opacity: f32);

    /// The node's own active flag
    fn is_active(&self, node: Self::NodeId) -> bool;

    /// Active flag combined with every ancestor's
    fn is_active_in_hierarchy(&self, node: Self::NodeId) -> bool;

    /// World-space bounds, `None` when the node has no size
    fn world_bounds(&self, node: Self::NodeId) -> Option<Aabb>;

    /// Whether the node carries a renderable component
    fn is_renderable(&self, node: Self::NodeId) -> bool;

    /// Alpha of the renderable's color in `0.0..=1.0`, `None` without a color
    fn color_alpha(&self, node: Self::NodeId) -> Option<f32>;

    /// Whether the node carries a mask component
    fn has_mask(&self, node: Self::NodeId) -> bool;
}
