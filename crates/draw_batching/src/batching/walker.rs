//! Depth-first draw-layer collector
//!
//! Walks one item subtree, sorting its nodes into draw layers by key and
//! rewriting each collected node's local opacity to the composited value it
//! needs once it is lifted out of its original parent chain.

use super::layer::{DrawLayer, LayerIndex, LayerKey};
use super::queue::DrawLayerQueue;
use crate::scene::SceneAccess;

/// Recursive collector feeding a [`DrawLayerQueue`]
///
/// Node names must be unique inside a batched subtree: two nodes with the
/// same name at any depth land in the same layer.
pub struct TreeWalker<'a, S: SceneAccess> {
    scene: &'a mut S,
    queue: &'a mut DrawLayerQueue<S::NodeId>,
    warn_on_masked_layers: bool,
    nodes_visited: usize,
    nodes_batched: usize,
}

impl<'a, S: SceneAccess> TreeWalker<'a, S> {
    /// Create a walker writing into `queue`
    pub fn new(scene: &'a mut S, queue: &'a mut DrawLayerQueue<S::NodeId>) -> Self {
        Self {
            scene,
            queue,
            warn_on_masked_layers: false,
            nodes_visited: 0,
            nodes_batched: 0,
        }
    }

    /// Warn when a non-root layer turns out to be masked
    pub fn with_mask_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_masked_layers = enabled;
        self
    }

    /// Read access to the scene while the walker holds it
    pub fn scene(&self) -> &S {
        &*self.scene
    }

    /// Nodes visited so far, including inactive ones
    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    /// Nodes appended to a layer so far
    pub fn nodes_batched(&self) -> usize {
        self.nodes_batched
    }

    /// Visit `node` and its subtree
    ///
    /// `after` is the layer new layers are spliced behind, `ancestors_active`
    /// whether the node and every ancestor are active, and `depth` is zero
    /// for a direct child of the batching root. Returns the last layer
    /// touched, which becomes the anchor for the next sibling.
    pub fn walk(
        &mut self,
        after: Option<LayerIndex>,
        node: S::NodeId,
        ancestors_active: bool,
        depth: usize,
        inherited_opacity: f32,
    ) -> LayerIndex {
        self.nodes_visited += 1;

        let opacity = inherited_opacity * self.scene.local_opacity(node);
        let key = LayerKey::for_node(depth, self.scene.name(node));
        let renderable = self.scene.is_renderable(node);

        let current = match self.queue.index_of(&key) {
            Some(existing) => existing,
            None => self.open_layer(after, node, key, renderable),
        };

        let mut child_opacity = opacity;
        if renderable {
            let self_alpha = self.scene.color_alpha(node).unwrap_or(1.0);
            if ancestors_active {
                let original = self.scene.local_opacity(node);
                self.queue.layer_mut(current).push_node(node, original);
                self.scene.set_local_opacity(node, opacity);
                self.nodes_batched += 1;
            }
            // Own color alpha only fades descendants
            child_opacity = opacity * self_alpha;
        }

        if self.queue.layer(current).is_masked() {
            return current;
        }

        let mut last = current;
        let mut i = 0;
        while let Some(&child) = self.scene.children(node).get(i) {
            let child_active = ancestors_active && self.scene.is_active(child);
            last = self.walk(Some(last), child, child_active, depth + 1, child_opacity);
            i += 1;
        }
        last
    }

    fn open_layer(
        &mut self,
        after: Option<LayerIndex>,
        node: S::NodeId,
        key: LayerKey,
        renderable: bool,
    ) -> LayerIndex {
        let mut layer = DrawLayer::new(key);
        if renderable && self.scene.has_mask(node) {
            layer.set_masked(true);
            if self.warn_on_masked_layers && !layer.key().is_root() {
                log::warn!(
                    "draw layer {} is masked; its subtree ({node:?}) will not be batched",
                    layer.key()
                );
            }
        }

        log::trace!("opening draw layer {} (masked: {})", layer.key(), layer.is_masked());
        self.queue.set(after, layer)
    }
}
