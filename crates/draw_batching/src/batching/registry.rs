//! Frame-scoped registry of batching roots
//!
//! Owners hand their roots over every update tick; the batcher flattens
//! them before draw, restores them after draw, and hands them back. Nothing
//! registered survives past the end of the frame.

use std::fmt::Debug;
use std::hash::Hash;
use std::mem;

use super::root::BatchingRoot;
use super::stats::FrameStats;
use crate::core::config::BatchingConfig;
use crate::events::{DrawPhase, DrawPhaseHandler};
use crate::scene::SceneAccess;

/// Registration errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError<Id: Debug> {
    /// The node already has a root registered this frame
    #[error("batching root {0:?} is already registered this frame")]
    AlreadyRegistered(Id),

    /// The root is mid-transaction and cannot be handed over
    #[error("batching root {0:?} is still flattened")]
    StillFlattened(Id),
}

/// Flattens registered roots before draw and restores them after
#[derive(Debug)]
pub struct FrameBatcher<Id> {
    config: BatchingConfig,
    roots: Vec<BatchingRoot<Id>>,
    released: Vec<BatchingRoot<Id>>,
    frame: u64,
    stats: FrameStats,
    last_stats: FrameStats,
}

impl<Id> FrameBatcher<Id>
where
    Id: Copy + Eq + Hash + Debug,
{
    /// Create a batcher with default configuration
    pub fn new() -> Self {
        Self::with_config(BatchingConfig::default())
    }

    /// Create a batcher with custom configuration
    pub fn with_config(config: BatchingConfig) -> Self {
        Self {
            config,
            roots: Vec::new(),
            released: Vec::new(),
            frame: 0,
            stats: FrameStats::default(),
            last_stats: FrameStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    /// Replace the configuration; takes effect at the next before-draw
    pub fn set_config(&mut self, config: BatchingConfig) {
        self.config = config;
    }

    /// Frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Roots registered for the current frame, in registration order
    pub fn registered(&self) -> &[BatchingRoot<Id>] {
        &self.roots
    }

    /// Number of roots registered for the current frame
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no root is registered for the current frame
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Statistics of the last completed frame
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Start a frame, dropping any registration left over from the last one
    ///
    /// A root still flattened here missed its after-draw; it is restored
    /// before being released.
    pub fn begin_frame<S>(&mut self, scene: &mut S)
    where
        S: SceneAccess<NodeId = Id>,
    {
        for root in &mut self.roots {
            if root.is_flattened() {
                log::warn!(
                    "batching root {:?} was never restored; restoring at frame start",
                    root.node()
                );
                root.restore(scene);
            }
        }
        self.release_all();
        self.stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };
    }

    /// Hand a root over for this frame
    ///
    /// A rejected root goes straight to the released pool.
    pub fn register(&mut self, root: BatchingRoot<Id>) -> Result<(), RegistryError<Id>> {
        let node = root.node();
        let error = if root.is_flattened() {
            Some(RegistryError::StillFlattened(node))
        } else if self.roots.iter().any(|r| r.node() == node) {
            Some(RegistryError::AlreadyRegistered(node))
        } else {
            None
        };

        if let Some(error) = error {
            self.released.push(root);
            return Err(error);
        }

        self.roots.push(root);
        Ok(())
    }

    /// Flatten every registered root that is valid and active
    pub fn on_before_draw<S>(&mut self, scene: &mut S) -> &FrameStats
    where
        S: SceneAccess<NodeId = Id>,
    {
        self.stats.frame = self.frame;
        self.stats.roots_registered = self.roots.len();

        for root in &mut self.roots {
            if !scene.is_valid(root.node()) || !scene.is_active(root.node()) {
                self.stats.roots_skipped += 1;
                continue;
            }
            let report = root.flatten(scene, &self.config);
            self.stats.record_flatten(&report);
        }

        if self.config.log_frame_stats {
            log::debug!("before draw: {}", self.stats);
        }
        &self.stats
    }

    /// Restore every flattened root, then end the frame
    ///
    /// Restored roots move to the released pool; drain it with
    /// [`take_released`](Self::take_released).
    pub fn on_after_draw<S>(&mut self, scene: &mut S) -> &FrameStats
    where
        S: SceneAccess<NodeId = Id>,
    {
        for root in &mut self.roots {
            let report = root.restore(scene);
            self.stats.record_restore(&report);
        }

        if self.config.log_frame_stats {
            log::debug!("after draw: {}", self.stats);
        }

        self.release_all();
        self.last_stats = self.stats;
        self.stats = FrameStats::default();
        self.frame += 1;
        &self.last_stats
    }

    /// Take back every released root
    pub fn take_released(&mut self) -> Vec<BatchingRoot<Id>> {
        mem::take(&mut self.released)
    }

    fn release_all(&mut self) {
        self.released.append(&mut self.roots);
    }
}

impl<Id> Default for FrameBatcher<Id>
where
    Id: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> DrawPhaseHandler<S> for FrameBatcher<S::NodeId>
where
    S: SceneAccess,
{
    fn on_draw_phase(&mut self, phase: DrawPhase, scene: &mut S) {
        match phase {
            DrawPhase::FrameStart => self.begin_frame(scene),
            DrawPhase::BeforeDraw => {
                self.on_before_draw(scene);
            }
            DrawPhase::AfterDraw => {
                self.on_after_draw(scene);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Color, NodeId, NodeTree};

    struct Fixture {
        tree: NodeTree,
        first: NodeId,
        second: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = NodeTree::new();
        let canvas = tree.create_node("canvas");
        let first = tree.create_child(canvas, "list_a").unwrap();
        let second = tree.create_child(canvas, "list_b").unwrap();
        for list in [first, second] {
            for _ in 0..2 {
                let row = tree.create_sprite(list, "row", Color::WHITE).unwrap();
                tree.create_sprite(row, "icon", Color::WHITE).unwrap();
            }
        }
        Fixture { tree, first, second }
    }

    #[test]
    fn test_frame_cycle_restores_and_releases() {
        let mut f = fixture();
        let first_children = f.tree.children(f.first).to_vec();
        let mut batcher = FrameBatcher::new();

        batcher.begin_frame(&mut f.tree);
        batcher.register(BatchingRoot::new(f.first)).unwrap();
        batcher.register(BatchingRoot::new(f.second)).unwrap();
        assert_eq!(batcher.len(), 2);

        let stats = *batcher.on_before_draw(&mut f.tree);
        assert_eq!(stats.roots_flattened, 2);
        assert_eq!(stats.nodes_batched, 8);
        assert_eq!(f.tree.children(f.first).len(), 4);
        assert!(batcher.registered().iter().all(BatchingRoot::is_flattened));

        let stats = *batcher.on_after_draw(&mut f.tree);
        assert_eq!(stats.nodes_restored, 8);
        assert_eq!(f.tree.children(f.first), first_children.as_slice());
        assert!(batcher.is_empty());
        assert_eq!(batcher.frame(), 1);
        assert_eq!(batcher.last_stats(), &stats);

        let released = batcher.take_released();
        assert_eq!(released.len(), 2);
        assert!(released.iter().all(|r| !r.is_flattened() && r.queue().is_empty()));
        assert!(batcher.take_released().is_empty());
    }

    #[test]
    fn test_released_roots_can_be_registered_again() {
        let mut f = fixture();
        let mut batcher = FrameBatcher::new();
        batcher.register(BatchingRoot::new(f.first)).unwrap();

        for _ in 0..3 {
            batcher.on_before_draw(&mut f.tree);
            batcher.on_after_draw(&mut f.tree);
            for root in batcher.take_released() {
                batcher.register(root).unwrap();
            }
        }
        assert_eq!(batcher.frame(), 3);
        assert_eq!(batcher.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut f = fixture();
        let mut batcher = FrameBatcher::new();

        batcher.register(BatchingRoot::new(f.first)).unwrap();
        assert_eq!(
            batcher.register(BatchingRoot::new(f.first)),
            Err(RegistryError::AlreadyRegistered(f.first))
        );
        assert_eq!(batcher.len(), 1);
        assert_eq!(batcher.take_released().len(), 1);

        let mut flattened = BatchingRoot::new(f.second);
        flattened.flatten(&mut f.tree, &BatchingConfig::default());
        assert_eq!(batcher.register(flattened), Err(RegistryError::StillFlattened(f.second)));
    }

    #[test]
    fn test_inactive_root_is_skipped_and_left_alone() {
        let mut f = fixture();
        let before = f.tree.children(f.first).to_vec();
        f.tree.node_mut(f.first).unwrap().active = false;
        let mut batcher = FrameBatcher::new();
        batcher.register(BatchingRoot::new(f.first)).unwrap();

        let stats = *batcher.on_before_draw(&mut f.tree);
        assert_eq!(stats.roots_skipped, 1);
        assert_eq!(stats.roots_flattened, 0);

        batcher.on_after_draw(&mut f.tree);
        assert_eq!(f.tree.children(f.first), before.as_slice());
    }

    #[test]
    fn test_root_deactivated_mid_frame_is_still_restored() {
        let mut f = fixture();
        let before = f.tree.children(f.first).to_vec();
        let mut batcher = FrameBatcher::new();
        batcher.register(BatchingRoot::new(f.first)).unwrap();

        batcher.on_before_draw(&mut f.tree);
        f.tree.node_mut(f.first).unwrap().active = false;
        batcher.on_after_draw(&mut f.tree);

        assert_eq!(f.tree.children(f.first), before.as_slice());
    }

    #[test]
    fn test_destroyed_root_is_skipped() {
        let mut f = fixture();
        let mut batcher = FrameBatcher::new();
        batcher.register(BatchingRoot::new(f.first)).unwrap();
        batcher.register(BatchingRoot::new(f.second)).unwrap();
        f.tree.destroy(f.first);

        let stats = *batcher.on_before_draw(&mut f.tree);
        assert_eq!(stats.roots_skipped, 1);
        assert_eq!(stats.roots_flattened, 1);

        let stats = *batcher.on_after_draw(&mut f.tree);
        assert_eq!(stats.stale_nodes, 0);
        assert_eq!(f.tree.children(f.second).len(), 2);
    }

    #[test]
    fn test_begin_frame_recovers_missed_after_draw() {
        let mut f = fixture();
        let before = f.tree.children(f.first).to_vec();
        let mut batcher = FrameBatcher::new();
        batcher.register(BatchingRoot::new(f.first)).unwrap();
        batcher.on_before_draw(&mut f.tree);

        batcher.begin_frame(&mut f.tree);

        assert_eq!(f.tree.children(f.first), before.as_slice());
        assert!(batcher.is_empty());
        assert!(batcher.take_released().iter().all(|r| !r.is_flattened()));
    }

    #[test]
    fn test_root_dropped_before_draw_is_never_touched() {
        let mut f = fixture();
        let before = f.tree.children(f.first).to_vec();
        let mut batcher: FrameBatcher<NodeId> = FrameBatcher::new();

        batcher.on_before_draw(&mut f.tree);
        batcher.on_after_draw(&mut f.tree);

        assert_eq!(f.tree.children(f.first), before.as_slice());
        assert_eq!(batcher.last_stats().roots_registered, 0);
    }
}
