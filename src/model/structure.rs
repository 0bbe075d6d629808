//! Structure (node) of a dendrogram.
//!
//! A structure is either a **leaf** (a local-maximum region without
//! children) or a **branch** (created when two or more regions merge at a
//! given level). Structures live in an arena and refer to each other by
//! [StructureIndex], see [Dendrogram](crate::model::Dendrogram).

use crate::model::pixel_set::{PixelSet, ValueRange};
use std::cell::Cell;

/// Index of a structure in the arena of a tree.
pub type StructureIndex = usize;

/// Opaque identifier of a structure, assigned by whoever builds the tree.
pub type StructureId = usize;

// =#========================================================================#=
// STRUCTURE
// =#========================================================================#=
/// A structure of a dendrogram: a connected region of grid cells above
/// some threshold.
///
/// # Invariants
/// - `merge_level` is `Some` iff `children` is non-empty
/// - `parent` is set at most once, when the structure becomes a child
/// - leaves own at least one pixel
#[derive(Debug, Clone)]
pub struct Structure<C> {
    pub(crate) id: StructureId,
    pub(crate) index: StructureIndex,
    pub(crate) pixels: PixelSet<C>,
    pub(crate) merge_level: Option<f64>,
    pub(crate) parent: Option<StructureIndex>,
    pub(crate) children: Vec<StructureIndex>,
    pub(crate) cache: StructureCache,
}

impl<C> Structure<C> {
    pub(crate) fn new_leaf(index: StructureIndex, id: StructureId, pixels: PixelSet<C>) -> Self {
        Structure {
            id,
            index,
            pixels,
            merge_level: None,
            parent: None,
            children: Vec::new(),
            cache: StructureCache::default(),
        }
    }

    pub(crate) fn new_branch(
        index: StructureIndex,
        id: StructureId,
        pixels: PixelSet<C>,
        children: Vec<StructureIndex>,
        merge_level: f64,
    ) -> Self {
        Structure {
            id,
            index,
            pixels,
            merge_level: Some(merge_level),
            parent: None,
            children,
            cache: StructureCache::default(),
        }
    }

    /// Returns the id assigned on creation.
    pub fn id(&self) -> StructureId {
        self.id
    }

    /// Returns the index of this structure in its tree.
    pub fn index(&self) -> StructureIndex {
        self.index
    }

    /// Returns `true` if this structure has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this structure has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the level at which the children merged into this structure,
    /// or `None` for a leaf.
    pub fn merge_level(&self) -> Option<f64> {
        self.merge_level
    }

    /// Returns the index of the parent, or `None` for a root.
    pub fn parent(&self) -> Option<StructureIndex> {
        self.parent
    }

    /// Returns the indices of the children (empty for a leaf).
    pub fn children(&self) -> &[StructureIndex] {
        &self.children
    }

    /// Returns the own pixels.
    pub fn pixels(&self) -> &PixelSet<C> {
        &self.pixels
    }

    /// Returns the coordinates of the own pixels, excluding sub-structures.
    pub fn indices_self(&self) -> &[C] {
        self.pixels.coordinates()
    }

    /// Returns the values of the own pixels, excluding sub-structures.
    pub fn values_self(&self) -> &[f64] {
        self.pixels.values()
    }

    /// Returns the number of own pixels.
    pub fn npix_self(&self) -> usize {
        self.pixels.len()
    }

    /// Returns the value range of the own pixels, or `None` if this
    /// structure owns none (only possible for branches).
    pub fn value_range(&self) -> Option<ValueRange> {
        self.pixels.range()
    }

    /// Value range used for the height: own range, falling back to
    /// `[merge_level, merge_level]` for a branch without own pixels.
    pub(crate) fn effective_range(&self) -> ValueRange {
        match (self.pixels.range(), self.merge_level) {
            (Some(range), _) => range,
            (None, Some(level)) => ValueRange::single(level),
            // the builder rejects leaves without pixels
            (None, None) => unreachable!("leaf {} owns no pixels", self.id),
        }
    }
}

// =#========================================================================#=
// CACHE
// =#========================================================================#=
/// Lazily filled derived values of a structure.
///
/// Only ever filled on a tree whose shape can no longer change (the
/// ancestor also during construction, since parents are never reassigned).
#[derive(Debug, Clone, Default)]
pub(crate) struct StructureCache {
    pub(crate) ancestor: Cell<Option<StructureIndex>>,
    pub(crate) level: Cell<Option<usize>>,
    pub(crate) npix_subtree: Cell<Option<usize>>,
    pub(crate) peak_position: Cell<Option<usize>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_range() {
        let leaf = Structure::new_leaf(0, 0, PixelSet::single(0usize, 4.0));
        assert_eq!(leaf.effective_range(), ValueRange::single(4.0));

        let empty = Structure::new_branch(1, 1, PixelSet::<usize>::new(), vec![0], 2.5);
        assert_eq!(empty.effective_range(), ValueRange::single(2.5));

        let owning = Structure::new_branch(2, 2, PixelSet::single(1usize, 3.0), vec![1], 1.0);
        assert_eq!(owning.effective_range(), ValueRange::single(3.0));
    }
}
