//! Dynamic draw-call batching
//!
//! Before a frame is drawn, every registered [`BatchingRoot`] has its
//! renderable descendants lifted into contiguous sibling runs, one run per
//! [`DrawLayer`], so the renderer can merge each run into fewer draw calls.
//! After the frame, the original hierarchy and opacities are put back.
//!
//! ## Frame flow
//!
//! ```text
//! begin_frame ─→ register(root)* ─→ on_before_draw ─→ [draw] ─→ on_after_draw
//!                                     │                            │
//!                                     ├ culling pre-pass           ├ restore roots
//!                                     ├ DFS into DrawLayerQueue    └ release roots
//!                                     └ rewrite child lists
//! ```
//!
//! Node names inside a batched subtree must be unique per kind of visual:
//! the name is the layer key, and same-named nodes at any depth share a
//! layer. This is a precondition, not something the pass checks.

mod culling;
mod layer;
mod queue;
mod registry;
mod root;
mod stats;
mod walker;

pub use culling::{collect_draw_layers, culling_region, is_visible};
pub use layer::{DrawLayer, LayerIndex, LayerKey};
pub use queue::{DrawLayerQueue, LayerIndices};
pub use registry::{FrameBatcher, RegistryError};
pub use root::{BatchingRoot, RootState};
pub use stats::{FlattenReport, FrameStats, RestoreReport};
pub use walker::TreeWalker;
