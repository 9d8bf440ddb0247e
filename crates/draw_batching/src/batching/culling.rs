//! Culling pre-pass
//!
//! Rejects direct children of a batching root whose bounds fall outside the
//! root's culling region, then walks the survivors. Rejected children are
//! never touched, so restore has nothing to undo for them.

use super::queue::DrawLayerQueue;
use super::stats::FlattenReport;
use super::walker::TreeWalker;
use crate::core::config::BatchingConfig;
use crate::scene::{Aabb, SceneAccess};

/// World-space region children must intersect to be batched
///
/// `None` when culling is disabled, no culling node is configured, or the
/// culling node has no bounds to test against.
pub fn culling_region<S: SceneAccess>(
    scene: &S,
    culling: Option<S::NodeId>,
    config: &BatchingConfig,
) -> Option<Aabb> {
    if !config.culling_enabled {
        return None;
    }
    let culling = culling?;
    let region = scene.world_bounds(culling);
    if region.is_none() {
        log::debug!("culling node {culling:?} has no bounds; culling skipped");
    }
    region
}

/// Whether `child` survives the culling test against `region`
///
/// Children without bounds always survive.
pub fn is_visible<S: SceneAccess>(scene: &S, child: S::NodeId, region: &Aabb) -> bool {
    scene
        .world_bounds(child)
        .is_none_or(|bounds| bounds.intersects(region))
}

/// Run the pre-pass over `root`'s direct children, filling `queue`
pub fn collect_draw_layers<S: SceneAccess>(
    scene: &mut S,
    root: S::NodeId,
    culling: Option<S::NodeId>,
    config: &BatchingConfig,
    queue: &mut DrawLayerQueue<S::NodeId>,
) -> FlattenReport {
    let region = culling_region(scene, culling, config);
    let mut report = FlattenReport::default();

    let mut walker = TreeWalker::new(scene, queue).with_mask_warnings(config.warn_on_masked_layers);
    let mut i = 0;
    while let Some(&child) = walker.scene().children(root).get(i) {
        i += 1;

        if !walker.scene().is_active_in_hierarchy(child) {
            report.children_inactive += 1;
            continue;
        }
        if let Some(region) = &region {
            if !is_visible(walker.scene(), child, region) {
                log::trace!("culled {child:?}");
                report.children_culled += 1;
                continue;
            }
        }

        walker.walk(None, child, true, 0, 1.0);
        report.children_walked += 1;
    }

    report.nodes_batched = walker.nodes_batched();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batching::LayerKey;
    use crate::foundation::math::Vec2;
    use crate::scene::{Color, NodeId, NodeTree};

    struct ListScene {
        tree: NodeTree,
        content: NodeId,
        viewport: NodeId,
        items: Vec<NodeId>,
    }

    /// Viewport 100x100 at the origin, items stacked downward every 60 units
    fn list_scene(count: usize) -> ListScene {
        let mut tree = NodeTree::new();
        let viewport = tree.create_node("viewport");
        tree.node_mut(viewport).unwrap().size = Some(Vec2::new(100.0, 100.0));
        let content = tree.create_child(viewport, "content").unwrap();

        let mut items = Vec::new();
        for i in 0..count {
            let item = tree.create_sprite(content, "item", Color::WHITE).unwrap();
            let node = tree.node_mut(item).unwrap();
            node.position = Vec2::new(0.0, -60.0 * i as f32);
            node.size = Some(Vec2::new(100.0, 50.0));
            items.push(item);
        }
        ListScene { tree, content, viewport, items }
    }

    impl ListScene {
        fn collect(
            &mut self,
            culling: Option<NodeId>,
            config: &BatchingConfig,
            queue: &mut DrawLayerQueue<NodeId>,
        ) -> FlattenReport {
            collect_draw_layers(&mut self.tree, self.content, culling, config, queue)
        }
    }

    #[test]
    fn test_children_outside_region_are_culled() {
        let mut scene = list_scene(4);
        let mut queue = DrawLayerQueue::new();
        let config = BatchingConfig::default();

        let report = scene.collect(Some(scene.viewport), &config, &mut queue);

        // items at y = 0 and y = -60 overlap the viewport, -120 and -180 do not
        assert_eq!(report.children_walked, 2);
        assert_eq!(report.children_culled, 2);
        assert_eq!(queue.get(&LayerKey::Root).unwrap().nodes(), &scene.items[..2]);
    }

    #[test]
    fn test_culling_disabled_by_config() {
        let mut scene = list_scene(4);
        let mut queue = DrawLayerQueue::new();
        let config = BatchingConfig::default().with_culling(false);

        let report = scene.collect(Some(scene.viewport), &config, &mut queue);

        assert_eq!(report.children_culled, 0);
        assert_eq!(report.nodes_batched, 4);
    }

    #[test]
    fn test_no_culling_node_walks_everything() {
        let mut scene = list_scene(3);
        let mut queue = DrawLayerQueue::new();

        let report = scene.collect(None, &BatchingConfig::default(), &mut queue);

        assert_eq!(report.children_walked, 3);
        assert!(culling_region(&scene.tree, None, &BatchingConfig::default()).is_none());
    }

    #[test]
    fn test_children_without_bounds_are_kept() {
        let mut scene = list_scene(0);
        let loose = scene.tree.create_sprite(scene.content, "loose", Color::WHITE).unwrap();
        scene.tree.node_mut(loose).unwrap().position = Vec2::new(5000.0, 5000.0);
        let mut queue = DrawLayerQueue::new();

        let report = scene.collect(Some(scene.viewport), &BatchingConfig::default(), &mut queue);

        assert_eq!(report.children_walked, 1);
        assert_eq!(report.children_culled, 0);
    }

    #[test]
    fn test_inactive_children_are_skipped_untouched() {
        let mut scene = list_scene(2);
        scene.tree.node_mut(scene.items[0]).unwrap().active = false;
        scene.tree.node_mut(scene.items[0]).unwrap().local_opacity = 0.25;
        let mut queue = DrawLayerQueue::new();

        let report = scene.collect(None, &BatchingConfig::default(), &mut queue);

        assert_eq!(report.children_inactive, 1);
        assert_eq!(report.children_walked, 1);
        assert_eq!(queue.get(&LayerKey::Root).unwrap().nodes(), &[scene.items[1]]);
        assert_eq!(scene.tree.local_opacity(scene.items[0]), 0.25);
    }
}
