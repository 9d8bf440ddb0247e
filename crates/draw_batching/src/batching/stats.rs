//! Per-root reports and per-frame statistics

use std::fmt;

/// What one flatten pass did to one root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    /// Direct children fed to the walker
    pub children_walked: usize,
    /// Direct children rejected by the culling pre-pass
    pub children_culled: usize,
    /// Direct children skipped because they are inactive in the hierarchy
    pub children_inactive: usize,
    /// Layers in the queue
    pub layers: usize,
    /// Masked layers in the queue
    pub masked_layers: usize,
    /// Nodes now sitting directly under the root
    pub nodes_batched: usize,
}

/// What one restore pass did to one root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Whether the root's own child list was put back
    pub root_restored: bool,
    /// Batched nodes whose child list and opacity were put back
    pub nodes_restored: usize,
    /// Batched nodes skipped because they were destroyed mid-frame
    pub stale_nodes: usize,
}

/// Aggregate over every registered root for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame counter of the batcher that produced these stats
    pub frame: u64,
    /// Roots registered this frame
    pub roots_registered: usize,
    /// Roots flattened before draw
    pub roots_flattened: usize,
    /// Roots skipped before draw (inactive or destroyed)
    pub roots_skipped: usize,
    /// Direct children culled across all roots
    pub children_culled: usize,
    /// Layers across all roots
    pub layers: usize,
    /// Masked layers across all roots
    pub masked_layers: usize,
    /// Nodes lifted into sibling runs across all roots
    pub nodes_batched: usize,
    /// Nodes restored after draw
    pub nodes_restored: usize,
    /// Nodes found destroyed at restore time
    pub stale_nodes: usize,
}

impl FrameStats {
    /// Fold one root's flatten report in
    pub fn record_flatten(&mut self, report: &FlattenReport) {
        self.roots_flattened += 1;
        self.children_culled += report.children_culled;
        self.layers += report.layers;
        self.masked_layers += report.masked_layers;
        self.nodes_batched += report.nodes_batched;
    }

    /// Fold one root's restore report in
    pub fn record_restore(&mut self, report: &RestoreReport) {
        self.nodes_restored += report.nodes_restored;
        self.stale_nodes += report.stale_nodes;
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {}: {}/{} roots flattened ({} skipped), {} culled, ",
            self.frame,
            self.roots_flattened,
            self.roots_registered,
            self.roots_skipped,
            self.children_culled,
        )?;
        write!(
            f,
            "{} layers ({} masked), {} nodes batched, {} restored, {} stale",
            self.layers,
            self.masked_layers,
            self.nodes_batched,
            self.nodes_restored,
            self.stale_nodes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_accumulate() {
        let mut stats = FrameStats::default();
        let report = FlattenReport {
            children_walked: 3,
            children_culled: 2,
            children_inactive: 0,
            layers: 4,
            masked_layers: 1,
            nodes_batched: 9,
        };
        stats.record_flatten(&report);
        stats.record_flatten(&report);
        stats.record_restore(&RestoreReport {
            root_restored: true,
            nodes_restored: 17,
            stale_nodes: 1,
        });

        assert_eq!(stats.roots_flattened, 2);
        assert_eq!(stats.children_culled, 4);
        assert_eq!(stats.layers, 8);
        assert_eq!(stats.nodes_batched, 18);
        assert_eq!(stats.nodes_restored, 17);
        assert!(stats.to_string().contains("18 nodes batched"));
    }
}
