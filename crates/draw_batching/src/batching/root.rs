//! Batching roots and the flatten/restore transaction
//!
//! Flatten replaces a root's child list with the concatenation of its draw
//! layers and empties each collected node's own child list. Restore walks
//! the queue (not the tree) and undoes every one of those writes.

use std::fmt::Debug;
use std::hash::Hash;
use std::mem;

use super::culling::collect_draw_layers;
use super::queue::DrawLayerQueue;
use super::stats::{FlattenReport, RestoreReport};
use crate::core::config::BatchingConfig;
use crate::scene::SceneAccess;

/// Per-frame state of a [`BatchingRoot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootState {
    /// Scene structure is the host's own
    #[default]
    Idle,
    /// Child lists and opacities are rewritten until restore
    Flattened,
}

/// A scene node whose descendant renderables are re-linearized every frame
#[derive(Debug, Clone)]
pub struct BatchingRoot<Id> {
    node: Id,
    culling: Option<Id>,
    saved_children: Vec<Id>,
    queue: DrawLayerQueue<Id>,
    state: RootState,
}

impl<Id> BatchingRoot<Id>
where
    Id: Copy + Eq + Hash + Debug,
{
    /// Create a root for `node` without culling
    pub fn new(node: Id) -> Self {
        Self {
            node,
            culling: None,
            saved_children: Vec::new(),
            queue: DrawLayerQueue::new(),
            state: RootState::Idle,
        }
    }

    /// Cull direct children against `culling`'s world bounds
    pub fn with_culling(mut self, culling: Id) -> Self {
        self.culling = Some(culling);
        self
    }

    /// Change the culling node
    pub fn set_culling(&mut self, culling: Option<Id>) {
        self.culling = culling;
    }

    /// The batched scene node
    pub fn node(&self) -> Id {
        self.node
    }

    /// The culling node
    pub fn culling(&self) -> Option<Id> {
        self.culling
    }

    /// Current transaction state
    pub fn state(&self) -> RootState {
        self.state
    }

    /// Whether flatten has run without a matching restore
    pub fn is_flattened(&self) -> bool {
        self.state == RootState::Flattened
    }

    /// Draw layers built by the last flatten (empty while idle)
    pub fn queue(&self) -> &DrawLayerQueue<Id> {
        &self.queue
    }

    /// The root's child list from before flatten (empty while idle)
    pub fn saved_children(&self) -> &[Id] {
        &self.saved_children
    }

    /// Rewrite the root's subtree into draw-layer order
    ///
    /// Does nothing for a destroyed root or one that is already flattened.
    pub fn flatten<S>(&mut self, scene: &mut S, config: &BatchingConfig) -> FlattenReport
    where
        S: SceneAccess<NodeId = Id>,
    {
        if self.is_flattened() {
            log::warn!("batching root {:?} flattened twice; ignoring", self.node);
            return FlattenReport::default();
        }
        if !scene.is_valid(self.node) {
            return FlattenReport::default();
        }

        self.queue.clear();
        let mut report =
            collect_draw_layers(scene, self.node, self.culling, config, &mut self.queue);

        self.saved_children = scene.replace_children(self.node, Vec::new());

        let mut flattened = Vec::with_capacity(report.nodes_batched);
        let mut cursor = self.queue.head();
        while let Some(index) = cursor {
            let layer = self.queue.layer_mut(index);
            layer.detach_children(scene);
            flattened.extend_from_slice(layer.nodes());
            if layer.is_masked() {
                report.masked_layers += 1;
            }
            cursor = layer.next();
        }
        report.layers = self.queue.len();
        debug_assert_eq!(flattened.len(), report.nodes_batched);

        scene.replace_children(self.node, flattened);
        self.state = RootState::Flattened;

        log::debug!(
            "flattened {:?}: {} layers, {} nodes, {} culled",
            self.node,
            report.layers,
            report.nodes_batched,
            report.children_culled
        );
        report
    }

    /// Undo the last flatten and clear the queue
    ///
    /// Runs even if the root went inactive during the frame. Destroyed nodes,
    /// the root included, are skipped and dropped from restored child lists;
    /// every surviving node is repaired. An idle root is left alone.
    pub fn restore<S>(&mut self, scene: &mut S) -> RestoreReport
    where
        S: SceneAccess<NodeId = Id>,
    {
        let mut report = RestoreReport::default();
        if !self.is_flattened() {
            self.queue.clear();
            return report;
        }

        let mut saved = mem::take(&mut self.saved_children);
        if scene.is_valid(self.node) {
            saved.retain(|&child| scene.is_valid(child));
            scene.replace_children(self.node, saved);
            report.root_restored = true;
        } else {
            log::warn!("batching root {:?} destroyed before restore", self.node);
        }

        let mut cursor = self.queue.head();
        while let Some(index) = cursor {
            let layer = self.queue.layer_mut(index);
            let (restored, stale) = layer.reattach(scene);
            report.nodes_restored += restored;
            report.stale_nodes += stale;
            cursor = layer.next();
        }

        self.queue.clear();
        self.state = RootState::Idle;

        log::debug!(
            "restored {:?}: {} nodes ({} stale)",
            self.node,
            report.nodes_restored,
            report.stale_nodes
        );
        report
    }
}
