//! Draw layers: one bucket of like-keyed renderable nodes

use std::fmt;

use crate::scene::SceneAccess;

/// Key identifying a draw layer
///
/// Depth-zero nodes (the direct children of a batching root) all share
/// [`LayerKey::Root`]; every deeper node is keyed by its name. `Root` is a
/// separate variant, so no node name can ever collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerKey {
    /// Reserved key for depth-zero nodes
    Root,
    /// Key derived from a node name
    Named(String),
}

impl LayerKey {
    /// Key for a node visited at `depth` below the batching root's children
    pub fn for_node(depth: usize, name: Option<&str>) -> Self {
        if depth == 0 {
            LayerKey::Root
        } else {
            LayerKey::Named(name.unwrap_or_default().to_string())
        }
    }

    /// Whether this is the reserved depth-zero key
    pub fn is_root(&self) -> bool {
        matches!(self, LayerKey::Root)
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Root => f.write_str("<root>"),
            LayerKey::Named(name) => write!(f, "{name:?}"),
        }
    }
}

/// Position of a layer inside its [`DrawLayerQueue`](super::DrawLayerQueue) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerIndex(pub(crate) usize);

impl LayerIndex {
    /// Raw arena slot
    pub fn index(self) -> usize {
        self.0
    }
}

/// One batching bucket
///
/// `nodes`, `saved_opacities` and `saved_children` are parallel: entry `i`
/// of each describes the same node.
#[derive(Debug, Clone)]
pub struct DrawLayer<Id> {
    key: LayerKey,
    masked: bool,
    nodes: Vec<Id>,
    saved_opacities: Vec<f32>,
    saved_children: Vec<Vec<Id>>,
    pub(crate) next: Option<LayerIndex>,
    pub(crate) prev: Option<LayerIndex>,
}

impl<Id: Copy> DrawLayer<Id> {
    /// Create an empty, unlinked layer
    pub fn new(key: LayerKey) -> Self {
        Self {
            key,
            masked: false,
            nodes: Vec::new(),
            saved_opacities: Vec::new(),
            saved_children: Vec::new(),
            next: None,
            prev: None,
        }
    }

    /// Layer key
    pub fn key(&self) -> &LayerKey {
        &self.key
    }

    /// Whether the node that created this layer carries a mask
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub(crate) fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Renderable nodes collected into this layer, in traversal order
    pub fn nodes(&self) -> &[Id] {
        &self.nodes
    }

    /// Each node's local opacity from before flatten
    pub fn saved_opacities(&self) -> &[f32] {
        &self.saved_opacities
    }

    /// Each node's child list from before flatten
    pub fn saved_children(&self) -> &[Vec<Id>] {
        &self.saved_children
    }

    /// Number of collected nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was collected
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Next layer in traversal order
    pub fn next(&self) -> Option<LayerIndex> {
        self.next
    }

    /// Previous layer in traversal order
    pub fn prev(&self) -> Option<LayerIndex> {
        self.prev
    }

    pub(crate) fn push_node(&mut self, node: Id, original_opacity: f32) {
        self.nodes.push(node);
        self.saved_opacities.push(original_opacity);
    }

    /// Snapshot every node's child list, detaching it unless the layer is masked
    pub(crate) fn detach_children<S>(&mut self, scene: &mut S)
    where
        S: SceneAccess<NodeId = Id>,
    {
        self.saved_children.clear();
        for &node in &self.nodes {
            let snapshot = if self.masked {
                scene.children(node).to_vec()
            } else {
                scene.replace_children(node, Vec::new())
            };
            self.saved_children.push(snapshot);
        }
    }

    /// Put child lists and opacities back, then empty the layer for reuse
    ///
    /// Returns `(restored, stale)` node counts.
    pub(crate) fn reattach<S>(&mut self, scene: &mut S) -> (usize, usize)
    where
        S: SceneAccess<NodeId = Id>,
    {
        debug_assert_eq!(self.nodes.len(), self.saved_opacities.len());
        debug_assert_eq!(self.nodes.len(), self.saved_children.len());

        let mut restored = 0;
        let mut stale = 0;
        let snapshots = self.saved_children.drain(..);
        let entries = self.nodes.iter().zip(&self.saved_opacities).zip(snapshots);
        for ((&node, &opacity), children) in entries {
            if !scene.is_valid(node) {
                stale += 1;
                continue;
            }
            let mut children = children;
            children.retain(|&child| scene.is_valid(child));
            scene.replace_children(node, children);
            scene.set_local_opacity(node, opacity);
            restored += 1;
        }

        self.nodes.clear();
        self.saved_opacities.clear();
        (restored, stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Color, NodeTree};

    #[test]
    fn test_layer_key_for_node() {
        assert_eq!(LayerKey::for_node(0, Some("item")), LayerKey::Root);
        assert_eq!(LayerKey::for_node(1, Some("icon")), LayerKey::Named("icon".into()));
        assert_eq!(LayerKey::for_node(3, None), LayerKey::Named(String::new()));
        assert!(LayerKey::Root.is_root());
        assert_ne!(LayerKey::Root, LayerKey::Named("<root>".into()));
    }

    #[test]
    fn test_detach_and_reattach() {
        let mut tree = NodeTree::new();
        let root = tree.create_node("root");
        let sprite = tree.create_sprite(root, "icon", Color::WHITE).unwrap();
        let child = tree.create_child(sprite, "badge").unwrap();
        tree.node_mut(sprite).unwrap().local_opacity = 0.6;

        let mut layer = DrawLayer::new(LayerKey::Named("icon".into()));
        layer.push_node(sprite, 0.6);
        tree.set_local_opacity(sprite, 0.3);

        layer.detach_children(&mut tree);
        assert!(tree.children(sprite).is_empty());
        assert_eq!(layer.saved_children(), &[vec![child]]);

        assert_eq!(layer.reattach(&mut tree), (1, 0));
        assert_eq!(tree.children(sprite), &[child]);
        assert_eq!(tree.local_opacity(sprite), 0.6);
        assert!(layer.is_empty());
        assert!(layer.saved_opacities().is_empty());
        assert!(layer.saved_children().is_empty());
    }

    #[test]
    fn test_masked_layer_keeps_children() {
        let mut tree = NodeTree::new();
        let root = tree.create_node("root");
        let clip = tree.create_sprite(root, "clip", Color::WHITE).unwrap();
        let inner = tree.create_child(clip, "inner").unwrap();

        let mut layer = DrawLayer::new(LayerKey::Named("clip".into()));
        layer.set_masked(true);
        layer.push_node(clip, 1.0);

        layer.detach_children(&mut tree);
        assert_eq!(tree.children(clip), &[inner]);
        assert_eq!(layer.saved_children(), &[vec![inner]]);
    }

    #[test]
    fn test_reattach_skips_stale_nodes() {
        let mut tree = NodeTree::new();
        let root = tree.create_node("root");
        let a = tree.create_sprite(root, "a", Color::WHITE).unwrap();
        let b = tree.create_sprite(root, "a", Color::WHITE).unwrap();

        let mut layer = DrawLayer::new(LayerKey::Named("a".into()));
        layer.push_node(a, 1.0);
        layer.push_node(b, 0.5);
        layer.detach_children(&mut tree);
        tree.destroy(a);

        assert_eq!(layer.reattach(&mut tree), (1, 1));
        assert_eq!(tree.local_opacity(b), 0.5);
    }
}
