//! Scrolling list demo for draw-layer batching
//!
//! Builds a scroll view of rows (background, icon, title, badge), scrolls it
//! for a number of frames, and compares the draw calls a simple renderer
//! would issue with and without batching. Pass a `.toml` or `.ron` config
//! path as the first argument to override the defaults.

use std::cell::RefCell;
use std::rc::Rc;

use draw_batching::foundation::logging;
use draw_batching::prelude::*;
use rand::prelude::*;

// Scene shape
const ROW_COUNT: usize = 40;
const ROW_HEIGHT: f32 = 60.0;
const VIEWPORT_SIZE: (f32, f32) = (320.0, 480.0);
const FRAMES: usize = 30;
const SCROLL_PER_FRAME: f32 = 25.0;

struct ListView {
    viewport: NodeId,
    content: NodeId,
}

fn build_list(tree: &mut NodeTree, rng: &mut StdRng) -> Result<ListView, SceneError> {
    let viewport = tree.create_node("viewport");
    tree.set_size(viewport, Some(Vec2::new(VIEWPORT_SIZE.0, VIEWPORT_SIZE.1)))?;
    let content = tree.create_child(viewport, "content")?;

    for i in 0..ROW_COUNT {
        let row = tree.create_sprite(content, "row_bg", Color::new(40, 40, 48, 255))?;
        let y = VIEWPORT_SIZE.1 * 0.5 - ROW_HEIGHT * (i as f32 + 0.5);
        tree.set_position(row, Vec2::new(0.0, y))?;
        tree.set_size(row, Some(Vec2::new(VIEWPORT_SIZE.0, ROW_HEIGHT - 4.0)))?;
        tree.set_local_opacity(row, rng.gen_range(0.7..=1.0));

        let icon = tree.create_sprite(row, "icon", Color::WHITE)?;
        tree.create_sprite(icon, "icon_frame", Color::new(255, 255, 255, 200))?;
        tree.create_sprite(row, "title", Color::WHITE)?;

        // Every fourth row carries an unread badge; every tenth hides it
        if i % 4 == 0 {
            let badge = tree.create_sprite(row, "badge", Color::new(220, 40, 40, 255))?;
            tree.set_active(badge, i % 10 != 0)?;
        }
    }

    Ok(ListView { viewport, content })
}

/// Draw calls a renderer that merges consecutive same-named sprites would issue
fn count_draw_calls(tree: &NodeTree, root: NodeId) -> usize {
    let mut calls = 0;
    let mut previous: Option<&str> = None;
    let mut stack: Vec<NodeId> = tree.children(root).iter().rev().copied().collect();

    while let Some(node) = stack.pop() {
        if !tree.is_active(node) {
            continue;
        }
        if tree.is_renderable(node) {
            let name = tree.name(node);
            if name != previous {
                calls += 1;
                previous = name;
            }
        }
        stack.extend(tree.children(node).iter().rev().copied());
    }
    calls
}

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_validated(&path),
        None => Ok(ApplicationConfig {
            batching: BatchingConfig::default().with_frame_stats(true),
            ..ApplicationConfig::default()
        }),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_config(&config.logging);
    log::info!("Starting list batching demo ({ROW_COUNT} rows, {FRAMES} frames)");

    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = NodeTree::new();
    let list = build_list(&mut tree, &mut rng)?;

    let batcher = Rc::new(RefCell::new(FrameBatcher::with_config(config.batching.clone())));
    let mut lifecycle: DrawLifecycle<NodeTree> = DrawLifecycle::new();
    lifecycle.add_handler(Box::new(batcher.clone()));

    // The list owns its root between frames and lends it out every tick
    let mut slot = Some(BatchingRoot::new(list.content).with_culling(list.viewport));
    let mut total_unbatched = 0;
    let mut total_batched = 0;

    for frame in 0..FRAMES {
        lifecycle.frame_start(&mut tree);

        // Update tick: scroll, then hand the root over
        if let Some(content) = tree.node_mut(list.content) {
            content.position.y += SCROLL_PER_FRAME;
        }
        if let Some(root) = slot.take() {
            batcher.borrow_mut().register(root)?;
        }

        let unbatched = count_draw_calls(&tree, list.content);
        lifecycle.before_draw(&mut tree);
        let batched = count_draw_calls(&tree, list.content);
        lifecycle.after_draw(&mut tree);

        slot = batcher.borrow_mut().take_released().pop();
        total_unbatched += unbatched;
        total_batched += batched;

        log::info!("frame {frame:>2}: {unbatched:>3} draw calls unbatched, {batched:>3} batched");
        log::debug!("{}", batcher.borrow().last_stats());
    }

    log::info!(
        "Done: {total_unbatched} draw calls without batching, {total_batched} with ({} nodes)",
        tree.node_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batching_reduces_draw_calls_and_restores_tree() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = NodeTree::new();
        let list = build_list(&mut tree, &mut rng).unwrap();
        let original = tree.children(list.content).to_vec();

        let mut batcher = FrameBatcher::new();
        batcher.begin_frame(&mut tree);
        batcher
            .register(BatchingRoot::new(list.content).with_culling(list.viewport))
            .unwrap();

        let unbatched = count_draw_calls(&tree, list.content);
        batcher.on_before_draw(&mut tree);
        let batched = count_draw_calls(&tree, list.content);
        batcher.on_after_draw(&mut tree);

        assert!(batched < unbatched);
        // row_bg, icon, icon_frame, title, badge
        assert!(batched <= 5);
        assert_eq!(tree.children(list.content), original.as_slice());
    }
}
