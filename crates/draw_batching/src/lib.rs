//! # Draw Batching
//!
//! Per-frame draw-call batching for 2D scene graphs.
//!
//! ## Features
//!
//! - **Flatten/restore transaction**: child lists and opacities are rewritten
//!   right before draw and restored exactly right after
//! - **Draw layers**: renderables are grouped by name into contiguous runs
//! - **Culling pre-pass**: off-screen items are skipped entirely
//! - **Mask boundaries**: clipped subtrees are never reordered
//! - **Pluggable scenes**: any backend implementing [`scene::SceneAccess`]
//!
//! ## Quick Start
//!
//! ```rust
//! use draw_batching::prelude::*;
//!
//! let mut tree = NodeTree::new();
//! let list = tree.create_node("list");
//! let row = tree.create_sprite(list, "row", Color::WHITE)?;
//! let icon = tree.create_sprite(row, "icon", Color::WHITE)?;
//!
//! let mut batcher = FrameBatcher::new();
//! batcher.begin_frame(&mut tree);
//! batcher.register(BatchingRoot::new(list))?;
//!
//! batcher.on_before_draw(&mut tree);
//! assert_eq!(tree.children(list), &[row, icon]);
//! // ... renderer draws here ...
//! batcher.on_after_draw(&mut tree);
//! assert_eq!(tree.children(list), &[row]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod config;
pub mod scene;
pub mod batching;
pub mod events;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        batching::{
            BatchingRoot, DrawLayer, DrawLayerQueue, FrameBatcher, FrameStats, LayerKey,
            RegistryError,
        },
        core::config::{ApplicationConfig, BatchingConfig, Config, ConfigError, LoggingConfig},
        events::{DrawLifecycle, DrawPhase, DrawPhaseHandler},
        foundation::math::Vec2,
        scene::{Aabb, Capabilities, Color, NodeId, NodeTree, SceneAccess, SceneError},
    };
}
