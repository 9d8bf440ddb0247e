//! Draw-layer queue
//!
//! Layers live in an arena and are linked in first-insertion order. A key
//! index gives O(1) lookup while the walker is building the queue.

use std::collections::HashMap;

use super::layer::{DrawLayer, LayerIndex, LayerKey};

/// Insertion-ordered, key-addressable list of [`DrawLayer`]s
///
/// Only meaningful between flatten and restore; [`clear`](Self::clear)
/// returns it to the freshly constructed state while keeping the arena's
/// allocation around for the next frame.
#[derive(Debug, Clone)]
pub struct DrawLayerQueue<Id> {
    layers: Vec<DrawLayer<Id>>,
    index: HashMap<LayerKey, LayerIndex>,
    head: Option<LayerIndex>,
    tail: Option<LayerIndex>,
}

impl<Id> Default for DrawLayerQueue<Id> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }
}

impl<Id: Copy> DrawLayerQueue<Id> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a layer by key
    pub fn get(&self, key: &LayerKey) -> Option<&DrawLayer<Id>> {
        self.index.get(key).map(|&i| &self.layers[i.0])
    }

    /// Mutably look up a layer by key
    pub fn get_mut(&mut self, key: &LayerKey) -> Option<&mut DrawLayer<Id>> {
        let index = *self.index.get(key)?;
        Some(&mut self.layers[index.0])
    }

    /// Look up a layer's arena index by key
    pub fn index_of(&self, key: &LayerKey) -> Option<LayerIndex> {
        self.index.get(key).copied()
    }

    /// Borrow a layer by index
    pub fn layer(&self, index: LayerIndex) -> &DrawLayer<Id> {
        &self.layers[index.0]
    }

    /// Mutably borrow a layer by index
    pub fn layer_mut(&mut self, index: LayerIndex) -> &mut DrawLayer<Id> {
        &mut self.layers[index.0]
    }

    /// Insert `layer` right after `after` in traversal order
    ///
    /// Into an empty queue the layer becomes the head and `after` is ignored.
    /// Otherwise `after` must be a member of this queue (a missing anchor is
    /// a caller bug; release builds append at the tail). Inserting a key that
    /// is already present returns the existing layer's index and leaves the
    /// queue unchanged.
    pub fn set(&mut self, after: Option<LayerIndex>, mut layer: DrawLayer<Id>) -> LayerIndex {
        if let Some(&existing) = self.index.get(layer.key()) {
            log::warn!("draw layer {} inserted twice; keeping the first", layer.key());
            return existing;
        }

        let new_index = LayerIndex(self.layers.len());

        debug_assert!(
            self.head.is_none() || after.is_some(),
            "non-empty queue needs an anchor layer"
        );

        match after.or(self.tail) {
            Some(anchor) if self.head.is_some() => {
                debug_assert!(anchor.0 < self.layers.len(), "anchor layer is not in this queue");

                let following = self.layers[anchor.0].next;
                layer.prev = Some(anchor);
                layer.next = following;
                self.layers[anchor.0].next = Some(new_index);
                match following {
                    Some(next) => self.layers[next.0].prev = Some(new_index),
                    None => self.tail = Some(new_index),
                }
            }
            _ => {
                layer.prev = None;
                layer.next = None;
                self.head = Some(new_index);
                self.tail = Some(new_index);
            }
        }

        self.index.insert(layer.key().clone(), new_index);
        self.layers.push(layer);
        new_index
    }

    /// First layer in traversal order
    pub fn head(&self) -> Option<LayerIndex> {
        self.head
    }

    /// Last layer in traversal order
    pub fn tail(&self) -> Option<LayerIndex> {
        self.tail
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the queue holds no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer indices in traversal order
    pub fn indices(&self) -> LayerIndices<'_, Id> {
        LayerIndices {
            queue: self,
            cursor: self.head,
        }
    }

    /// Layers in traversal order
    pub fn iter(&self) -> impl Iterator<Item = &DrawLayer<Id>> {
        self.indices().map(move |i| &self.layers[i.0])
    }

    /// Remove every layer; idempotent
    pub fn clear(&mut self) {
        self.layers.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }
}

/// Iterator over layer indices from head to tail
#[derive(Debug)]
pub struct LayerIndices<'a, Id> {
    queue: &'a DrawLayerQueue<Id>,
    cursor: Option<LayerIndex>,
}

impl<Id: Copy> Iterator for LayerIndices<'_, Id> {
    type Item = LayerIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.queue.layer(current).next();
        Some(current)
    }
}
