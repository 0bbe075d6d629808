//! Construction phase of a dendrogram.
//!
//! A [DendrogramBuilder] consumes the events produced by a grid-scanning
//! merge algorithm: new leaves, pixels added to open structures, flat
//! merges of two open leaves, and branches created when regions join.
//! Once the scan is complete, [DendrogramBuilder::finish] turns the builder
//! into an immutable [Dendrogram] for querying.
//!
//! All operations validate their input before changing anything, so a
//! failed call leaves the builder untouched.
//!
//! # Example
//! ```
//! use dendro::model::DendrogramBuilder;
//!
//! let mut builder = DendrogramBuilder::new();
//! let a = builder.create_leaf((0, 0), 5.0, 0)?;
//! let b = builder.create_leaf((1, 1), 3.0, 1)?;
//! builder.add_pixel(a, (0, 1), 4.0)?;
//! let branch = builder.create_branch(&[a, b], 2.0, 2)?;
//! assert_eq!(builder.ancestor(a), branch);
//!
//! let dendrogram = builder.finish();
//! assert_eq!(dendrogram.npix(branch, true), 3);
//! # Ok::<(), dendro::DendroError>(())
//! ```

use crate::error::DendroError;
use crate::model::dendrogram::{Dendrogram, resolve_ancestor};
use crate::model::pixel_set::PixelSet;
use crate::model::structure::{Structure, StructureId, StructureIndex};
use std::collections::{HashMap, HashSet};
use tracing::{debug, debug_span, trace};

// =#========================================================================#=
// DENDROGRAM BUILDER
// =#========================================================================#=
/// Mutable arena of structures used while the tree is being assembled.
///
/// Structures are addressed by the [StructureIndex] returned on creation.
/// A structure consumed by [DendrogramBuilder::merge_into] keeps its slot
/// but is no longer live; slots are compacted by
/// [DendrogramBuilder::finish], so indices may shift at that point
/// (use [Dendrogram::index_of] to find a structure by id afterwards).
#[derive(Debug, Clone)]
pub struct DendrogramBuilder<C> {
    /// Structures (arena pattern)
    structures: Vec<Structure<C>>,

    /// Per slot, whether the structure was consumed by a merge
    merged: Vec<bool>,

    /// Ids of live structures
    ids: HashMap<StructureId, StructureIndex>,
}

impl<C> DendrogramBuilder<C> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty builder with room for `capacity` structures.
    pub fn with_capacity(capacity: usize) -> Self {
        DendrogramBuilder {
            structures: Vec::with_capacity(capacity),
            merged: Vec::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
        }
    }

    /// Creates a leaf holding a single pixel.
    ///
    /// # Errors
    /// [DendroError::DuplicateId] if `id` is already used,
    /// [DendroError::InvalidInput] if `value` is NaN.
    pub fn create_leaf(
        &mut self,
        coordinate: C,
        value: f64,
        id: StructureId,
    ) -> Result<StructureIndex, DendroError> {
        self.create_leaf_from([(coordinate, value)], id)
    }

    /// Creates a leaf from a pre-populated sequence of pixels.
    ///
    /// # Errors
    /// [DendroError::InvalidInput] if `pixels` is empty or contains a NaN
    /// value, [DendroError::DuplicateId] if `id` is already used.
    pub fn create_leaf_from<I>(&mut self, pixels: I, id: StructureId) -> Result<StructureIndex, DendroError>
    where
        I: IntoIterator<Item = (C, f64)>,
    {
        self.check_new_id(id)?;
        let pixels: PixelSet<C> = pixels.into_iter().collect();
        if pixels.is_empty() {
            return Err(DendroError::invalid_input("a leaf needs at least one pixel"));
        }
        if pixels.values().iter().any(|v| v.is_nan()) {
            return Err(DendroError::invalid_input("pixel values must not be NaN"));
        }

        let index = self.structures.len();
        debug!(id, index, npix = pixels.len(), "create leaf");
        self.push(Structure::new_leaf(index, id, pixels));
        Ok(index)
    }

    /// Creates a branch without own pixels, whose `children` merged at
    /// `merge_level`.
    ///
    /// # Arguments
    /// * `children` - Current roots that become the children, in order
    /// * `merge_level` - Threshold at which the children joined
    /// * `id` - Id of the new branch
    ///
    /// # Errors
    /// [DendroError::InvalidInput] if `children` is empty, repeats a
    /// structure or contains a structure that already has a parent,
    /// [DendroError::UnknownStructure] for indices of no live structure,
    /// [DendroError::DuplicateId] if `id` is already used.
    pub fn create_branch(
        &mut self,
        children: &[StructureIndex],
        merge_level: f64,
        id: StructureId,
    ) -> Result<StructureIndex, DendroError> {
        self.add_branch(children, PixelSet::new(), merge_level, id)
    }

    /// Creates a branch triggered by the pixel at `coordinate`.
    ///
    /// The pixel becomes the first own pixel of the branch and its `value`
    /// the merge level. Errors as for [DendrogramBuilder::create_branch].
    pub fn create_branch_at_pixel(
        &mut self,
        children: &[StructureIndex],
        coordinate: C,
        value: f64,
        id: StructureId,
    ) -> Result<StructureIndex, DendroError> {
        self.add_branch(children, PixelSet::single(coordinate, value), value, id)
    }

    /// Appends a pixel to the own pixels of a structure.
    ///
    /// # Errors
    /// [DendroError::UnknownStructure] if `index` is not live,
    /// [DendroError::InvalidInput] if `value` is NaN.
    pub fn add_pixel(&mut self, index: StructureIndex, coordinate: C, value: f64) -> Result<(), DendroError> {
        self.check_live(index)?;
        if value.is_nan() {
            return Err(DendroError::invalid_input("pixel values must not be NaN"));
        }
        trace!(index, value, "add pixel");
        self.structures[index].pixels.append(coordinate, value);
        Ok(())
    }

    /// Merges `other` into `target` as a flat union of their own pixels.
    ///
    /// Used when two open regions turn out to be the same one. The pixels
    /// of `other` are moved into `target`, and `other` ceases to exist (its
    /// id is released).
    ///
    /// # Errors
    /// [DendroError::UnknownStructure] if either index is not live,
    /// [DendroError::InvalidInput] if both are the same or `other` is
    /// attached to the tree (has a parent or children).
    pub fn merge_into(&mut self, target: StructureIndex, other: StructureIndex) -> Result<(), DendroError> {
        self.check_live(target)?;
        self.check_live(other)?;
        if target == other {
            return Err(DendroError::invalid_input("cannot merge a structure into itself"));
        }
        let consumed = &self.structures[other];
        if consumed.parent.is_some() || !consumed.children.is_empty() {
            return Err(DendroError::invalid_input(format!(
                "structure {} is part of the tree and cannot be merged away",
                consumed.id
            )));
        }

        let pixels = std::mem::take(&mut self.structures[other].pixels);
        debug!(into = target, from = other, npix = pixels.len(), "merge structures");
        self.structures[target].pixels.absorb(pixels);
        self.ids.remove(&self.structures[other].id);
        self.merged[other] = true;
        Ok(())
    }

    /// Returns the root of the tree currently containing `index`.
    ///
    /// Valid during construction since parents are never reassigned; see
    /// [Dendrogram::ancestor].
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn ancestor(&self, index: StructureIndex) -> StructureIndex {
        resolve_ancestor(&self.structures, index)
    }

    /// Returns the structure at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn structure(&self, index: StructureIndex) -> &Structure<C> {
        &self.structures[index]
    }

    /// Returns whether `index` refers to a structure not consumed by a merge.
    pub fn is_live(&self, index: StructureIndex) -> bool {
        index < self.structures.len() && !self.merged[index]
    }

    /// Returns the live structures without parent.
    pub fn roots(&self) -> Vec<StructureIndex> {
        self.live_structures()
            .filter(|s| s.parent.is_none())
            .map(|s| s.index)
            .collect()
    }

    /// Returns the number of live structures.
    pub fn num_structures(&self) -> usize {
        self.ids.len()
    }

    /// Finishes construction, returning the immutable [Dendrogram].
    ///
    /// Slots of merged-away structures are dropped and the remaining
    /// structures are renumbered in creation order.
    pub fn finish(self) -> Dendrogram<C> {
        let span = debug_span!("finish", slots = self.structures.len());
        let _guard = span.enter();

        let mut remap: Vec<Option<StructureIndex>> = Vec::with_capacity(self.structures.len());
        let mut next = 0;
        for &merged in &self.merged {
            if merged {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }
        let new_index = |old: StructureIndex| remap[old].unwrap_or(old);

        let mut structures = Vec::with_capacity(next);
        for (mut structure, merged) in self.structures.into_iter().zip(self.merged) {
            if merged {
                continue;
            }
            structure.index = new_index(structure.index);
            structure.parent = structure.parent.map(new_index);
            for child in &mut structure.children {
                *child = new_index(*child);
            }
            let ancestor = structure.cache.ancestor.get().map(new_index);
            structure.cache.ancestor.set(ancestor);
            structures.push(structure);
        }

        debug!(structures = structures.len(), "dendrogram finished");
        Dendrogram::from_structures(structures)
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
impl<C> DendrogramBuilder<C> {
    fn push(&mut self, structure: Structure<C>) {
        self.ids.insert(structure.id, structure.index);
        self.structures.push(structure);
        self.merged.push(false);
    }

    fn live_structures(&self) -> impl Iterator<Item = &Structure<C>> {
        self.structures
            .iter()
            .zip(&self.merged)
            .filter(|(_, merged)| !**merged)
            .map(|(s, _)| s)
    }

    fn check_new_id(&self, id: StructureId) -> Result<(), DendroError> {
        if self.ids.contains_key(&id) {
            return Err(DendroError::DuplicateId(id));
        }
        Ok(())
    }

    fn check_live(&self, index: StructureIndex) -> Result<(), DendroError> {
        if !self.is_live(index) {
            return Err(DendroError::UnknownStructure(index));
        }
        Ok(())
    }

    fn add_branch(
        &mut self,
        children: &[StructureIndex],
        pixels: PixelSet<C>,
        merge_level: f64,
        id: StructureId,
    ) -> Result<StructureIndex, DendroError> {
        if children.is_empty() {
            return Err(DendroError::invalid_input("a branch needs at least one child"));
        }
        if merge_level.is_nan() {
            return Err(DendroError::invalid_input("merge level must not be NaN"));
        }
        self.check_new_id(id)?;

        let mut seen = HashSet::with_capacity(children.len());
        for &child in children {
            self.check_live(child)?;
            if !seen.insert(child) {
                return Err(DendroError::invalid_input(format!("child {child} is listed twice")));
            }
            if let Some(parent) = self.structures[child].parent {
                return Err(DendroError::invalid_input(format!(
                    "child {child} already has parent {parent}"
                )));
            }
        }

        let index = self.structures.len();
        for &child in children {
            self.structures[child].parent = Some(index);
        }
        debug!(id, index, num_children = children.len(), merge_level, "create branch");
        self.push(Structure::new_branch(index, id, pixels, children.to_vec(), merge_level));
        Ok(index)
    }
}

impl<C> Default for DendrogramBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_branch_leaves_builder_unchanged() {
        let mut builder = DendrogramBuilder::new();
        let a = builder.create_leaf(0usize, 1.0, 10).unwrap();
        let b = builder.create_leaf(1usize, 2.0, 11).unwrap();
        builder.create_branch(&[a], 0.5, 12).unwrap();

        // b is fine, but a already has a parent
        let result = builder.create_branch(&[b, a], 0.1, 13);
        assert!(matches!(result, Err(DendroError::InvalidInput(_))));
        assert_eq!(builder.structure(b).parent(), None);
        assert_eq!(builder.num_structures(), 3);
    }

    #[test]
    fn test_finish_remaps_indices_after_merge() {
        let mut builder = DendrogramBuilder::new();
        let a = builder.create_leaf(0usize, 1.0, 0).unwrap();
        let gone = builder.create_leaf(1usize, 2.0, 1).unwrap();
        let c = builder.create_leaf(2usize, 3.0, 2).unwrap();
        builder.merge_into(a, gone).unwrap();
        let branch = builder.create_branch(&[a, c], 0.5, 3).unwrap();
        assert_eq!(builder.ancestor(c), branch);

        let dendrogram = builder.finish();
        assert_eq!(dendrogram.num_structures(), 3);
        let branch = dendrogram.index_of(3).unwrap();
        assert_eq!(branch, 2);
        let c = dendrogram.index_of(2).unwrap();
        assert_eq!(c, 1);
        assert_eq!(dendrogram[branch].children(), &[0, 1]);
        assert_eq!(dendrogram[c].parent(), Some(branch));
        assert_eq!(dendrogram.ancestor(c), branch);
        assert_eq!(dendrogram[0].values_self(), &[1.0, 2.0]);
    }
}
