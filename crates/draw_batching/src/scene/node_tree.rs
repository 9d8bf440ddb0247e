//! In-memory scene graph backend
//!
//! Nodes live in a generational slot map, so a destroyed node's id stays
//! detectably stale instead of aliasing a newer node. Parent links and child
//! lists are stored separately: the batching pass rewrites child lists only,
//! exactly like a real engine's render-facing child array.

use std::mem;

use bitflags::bitflags;
use slotmap::{SecondaryMap, SlotMap};

use super::{Aabb, SceneAccess};
use crate::foundation::math::{clamp_unit, Vec2};

slotmap::new_key_type! {
    /// Handle to a node in a [`NodeTree`]
    pub struct NodeId;
}

bitflags! {
    /// Components attached to a node that the batching pass cares about
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Node draws something
        const RENDERABLE = 1 << 0;
        /// Node clips its descendants
        const MASK = 1 << 1;
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    /// Create a color from channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha channel normalized to `0.0..=1.0`
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not refer to a live node
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),

    /// The child already has a parent
    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// Node that was being attached
        child: NodeId,
        /// Its current parent
        parent: NodeId,
    },

    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },
}

/// A single node's state
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Node name
    pub name: String,
    /// The node's own active flag
    pub active: bool,
    /// Local opacity multiplier
    pub local_opacity: f32,
    /// Position relative to the parent's position
    pub position: Vec2,
    /// Full size of the node's box, centered on its position
    pub size: Option<Vec2>,
    /// Renderable color
    pub color: Option<Color>,
    /// Attached components
    pub capabilities: Capabilities,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            local_opacity: 1.0,
            position: Vec2::zeros(),
            size: None,
            color: None,
            capabilities: Capabilities::empty(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Live child list
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Slot-map backed scene graph
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, SceneNode>,
}

impl NodeTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with default state
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name))
    }

    /// Create a node and append it to `parent`'s children
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let child = self.create_node(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Create a renderable node with `color` under `parent`
    pub fn create_sprite(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        color: Color,
    ) -> Result<NodeId, SceneError> {
        let child = self.create_child(parent, name)?;
        let node = &mut self.nodes[child];
        node.capabilities |= Capabilities::RENDERABLE;
        node.color = Some(color);
        Ok(child)
    }

    /// Append `child` to `parent`'s children
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let existing = self
            .nodes
            .get(child)
            .ok_or(SceneError::NodeNotFound(child))?
            .parent;
        if let Some(existing) = existing {
            return Err(SceneError::AlreadyParented { child, parent: existing });
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(SceneError::CycleDetected { parent, child });
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Remove a node and all its descendants
    ///
    /// Descendants are found through parent links, not child lists, so a
    /// subtree whose child lists are flattened is still removed whole.
    /// Returns the number of nodes removed.
    pub fn destroy(&mut self, node: NodeId) -> usize {
        let Some(parent) = self.nodes.get(node).map(|n| n.parent) else {
            return 0;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != node);
        }

        let mut linked: SecondaryMap<NodeId, Vec<NodeId>> = SecondaryMap::new();
        for (id, data) in &self.nodes {
            if let Some(entry) = data.parent.and_then(|p| linked.entry(p)) {
                entry.or_default().push(id);
            }
        }

        let mut removed = 0;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.nodes.remove(current).is_some() {
                removed += 1;
                if let Some(children) = linked.remove(current) {
                    stack.extend(children);
                }
            }
        }
        removed
    }

    /// Borrow a node
    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node)
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound(node))
    }

    /// Set a node's own active flag
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        self.data_mut(node)?.active = active;
        Ok(())
    }

    /// Set a node's position relative to its parent
    pub fn set_position(&mut self, node: NodeId, position: Vec2) -> Result<(), SceneError> {
        self.data_mut(node)?.position = position;
        Ok(())
    }

    /// Give a node a box of `size` centered on its position, or remove it
    pub fn set_size(&mut self, node: NodeId, size: Option<Vec2>) -> Result<(), SceneError> {
        self.data_mut(node)?.size = size;
        Ok(())
    }

    /// Set a node's color; only renderable nodes report it
    pub fn set_color(&mut self, node: NodeId, color: Color) -> Result<(), SceneError> {
        self.data_mut(node)?.color = Some(color);
        Ok(())
    }

    /// Attach components to a node
    pub fn add_capabilities(
        &mut self,
        node: NodeId,
        capabilities: Capabilities,
    ) -> Result<(), SceneError> {
        self.data_mut(node)?.capabilities |= capabilities;
        Ok(())
    }

    /// Parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Position accumulated up the parent chain
    pub fn world_position(&self, node: NodeId) -> Option<Vec2> {
        let mut data = self.nodes.get(node)?;
        let mut position = data.position;
        while let Some(parent) = data.parent.and_then(|p| self.nodes.get(p)) {
            position += parent.position;
            data = parent;
        }
        Some(position)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl SceneAccess for NodeTree {
    type NodeId = NodeId;

    fn is_valid(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.name.as_str())
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    fn replace_children(&mut self, node: NodeId, children: Vec<NodeId>) -> Vec<NodeId> {
        match self.nodes.get_mut(node) {
            Some(data) => mem::replace(&mut data.children, children),
            None => Vec::new(),
        }
    }

    fn local_opacity(&self, node: NodeId) -> f32 {
        self.nodes.get(node).map_or(1.0, |n| n.local_opacity)
    }

    fn set_local_opacity(&mut self, node: NodeId, opacity: f32) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.local_opacity = opacity;
        }
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.active)
    }

    fn is_active_in_hierarchy(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            match self.nodes.get(current) {
                Some(data) if data.active => cursor = data.parent,
                _ => return false,
            }
        }
        true
    }

    fn world_bounds(&self, node: NodeId) -> Option<Aabb> {
        let size = self.nodes.get(node)?.size?;
        let center = self.world_position(node)?;
        Some(Aabb::from_center_size(center, size))
    }

    fn is_renderable(&self, node: NodeId) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.capabilities.contains(Capabilities::RENDERABLE))
    }

    fn color_alpha(&self, node: NodeId) -> Option<f32> {
        let data = self.nodes.get(node)?;
        if !data.capabilities.contains(Capabilities::RENDERABLE) {
            return None;
        }
        data.color.map(|c| clamp_unit(c.alpha()))
    }

    fn has_mask(&self, node: NodeId) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.capabilities.contains(Capabilities::MASK))
    }
}
