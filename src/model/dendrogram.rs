//! Frozen dendrogram and its derived queries.
//!
//! A [Dendrogram] is produced by
//! [DendrogramBuilder::finish](crate::model::DendrogramBuilder::finish) and
//! can no longer change shape. Queries address structures by
//! [StructureIndex]; aggregated views (`indices`, `values`, `npix`, `peak`)
//! combine a structure's own pixels with those of all its descendants.
//!
//! Ancestor, level, subtree pixel count and local peak are cached lazily
//! on first use. The caches use [Cell](std::cell::Cell), so a [Dendrogram]
//! is not `Sync`. Call [Dendrogram::warm_caches] to fill all of them in a
//! single pass.

use crate::model::footprint::FootprintTarget;
use crate::model::structure::{Structure, StructureId, StructureIndex};
use crate::newick::{self, NewickStyle};
use std::collections::HashMap;
use tracing::{debug, trace};

// =$========================================================================$=
// DENDROGRAM
// =$========================================================================$=
/// A forest of [Structure]s stored using the arena pattern.
///
/// # Structure
/// - All structures are stored in a contiguous vector and referenced by
///   [StructureIndex]; children always have smaller indices than their
///   parent (creation order).
/// - A dendrogram may have several roots (one per disconnected region).
/// - Structure ids are unique and can be mapped back to indices with
///   [Dendrogram::index_of].
#[derive(Debug, Clone)]
pub struct Dendrogram<C> {
    /// Structures of this dendrogram (arena pattern)
    structures: Vec<Structure<C>>,

    /// Indices of all structures without parent, in creation order
    roots: Vec<StructureIndex>,

    /// Id to arena index
    ids: HashMap<StructureId, StructureIndex>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl<C> Dendrogram<C> {
    pub(crate) fn from_structures(structures: Vec<Structure<C>>) -> Self {
        let roots = structures
            .iter()
            .filter(|s| s.parent.is_none())
            .map(|s| s.index)
            .collect();
        let ids = structures.iter().map(|s| (s.id, s.index)).collect();
        Dendrogram {
            structures,
            roots,
            ids,
        }
    }

    /// Returns the structure at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn structure(&self, index: StructureIndex) -> &Structure<C> {
        &self[index]
    }

    /// Returns all structures in arena order.
    pub fn structures(&self) -> &[Structure<C>] {
        &self.structures
    }

    /// Returns the index of the structure with the given id, if any.
    pub fn index_of(&self, id: StructureId) -> Option<StructureIndex> {
        self.ids.get(&id).copied()
    }

    /// Returns the indices of all roots (structures without parent).
    pub fn roots(&self) -> &[StructureIndex] {
        &self.roots
    }

    /// Returns the indices of all leaves.
    pub fn leaves(&self) -> Vec<StructureIndex> {
        self.structures
            .iter()
            .filter(|s| s.is_leaf())
            .map(|s| s.index)
            .collect()
    }

    /// Returns the number of structures.
    pub fn num_structures(&self) -> usize {
        self.structures.len()
    }

    /// Returns `true` if there are no structures.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Validates the arena and all index references.
    ///
    /// Checks:
    /// - All structure indices match their position in the arena
    /// - Leaves have no merge level and own at least one pixel,
    ///   branches have a merge level
    /// - All child indices are valid and point back to the correct parent
    /// - All parent indices are valid and include this structure as a child
    /// - The list of roots matches the structures without parent
    ///
    /// # Returns
    /// `true` if the dendrogram is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        let num = self.structures.len();

        for (index, structure) in self.structures.iter().enumerate() {
            // Check index matches arena position
            if structure.index != index {
                return false;
            }

            // Check leaf/branch consistency
            if structure.is_leaf() {
                if structure.merge_level.is_some() || structure.pixels.is_empty() {
                    return false;
                }
            } else if structure.merge_level.is_none() {
                return false;
            }

            // Check children point back to this structure
            for &child in &structure.children {
                if child >= num || self.structures[child].parent != Some(index) {
                    return false;
                }
            }

            // Check parent includes this structure
            if let Some(parent) = structure.parent {
                if parent >= num || !self.structures[parent].children.contains(&index) {
                    return false;
                }
            }
        }

        let expected_roots: Vec<_> = self
            .structures
            .iter()
            .filter(|s| s.parent.is_none())
            .map(|s| s.index)
            .collect();
        expected_roots == self.roots
    }
}

// ============================================================================
// Derived queries (pub)
// ============================================================================
impl<C> Dendrogram<C> {
    /// Returns the coordinates of all pixels in the subtree of `index`:
    /// own pixels first, then each child's subtree in order.
    ///
    /// Not cached; costs O(size of the subtree) on every call.
    pub fn indices(&self, index: StructureIndex) -> Vec<&C> {
        self.pre_order_iter(index)
            .flat_map(|s| s.indices_self())
            .collect()
    }

    /// Returns the values of all pixels in the subtree of `index`, in the
    /// same order as [Dendrogram::indices].
    pub fn values(&self, index: StructureIndex) -> Vec<f64> {
        self.pre_order_iter(index)
            .flat_map(|s| s.values_self().iter().copied())
            .collect()
    }

    /// Returns the height of a structure: the drop from its own maximum to
    /// the level at which it merges into its parent, or to its own minimum
    /// for a root.
    ///
    /// A branch without own pixels uses its merge level as both maximum
    /// and minimum.
    pub fn height(&self, index: StructureIndex) -> f64 {
        let structure = &self[index];
        let range = structure.effective_range();
        match structure.parent {
            None => range.span(),
            Some(parent) => range.max - self[parent].merge_level.unwrap_or(range.min),
        }
    }

    /// Returns the root of the tree containing `index` (itself for a root).
    ///
    /// Uses path compression: every structure passed on the way up caches
    /// the root, so repeated queries are amortized O(1).
    pub fn ancestor(&self, index: StructureIndex) -> StructureIndex {
        resolve_ancestor(&self.structures, index)
    }

    /// Returns the level of a structure: 0 for roots, increasing by 1 per
    /// step towards the leaves.
    ///
    /// Resolved iteratively; all structures on the walked chain get their
    /// level cached as well.
    pub fn level(&self, index: StructureIndex) -> usize {
        if let Some(level) = self[index].cache.level.get() {
            return level;
        }

        // Structures without cached level, from `index` upwards
        let mut chain = Vec::new();
        let mut current = index;
        let mut level = loop {
            let structure = &self[current];
            if let Some(level) = structure.cache.level.get() {
                break level;
            }
            match structure.parent {
                Some(parent) => {
                    chain.push(current);
                    current = parent;
                }
                None => {
                    structure.cache.level.set(Some(0));
                    break 0;
                }
            }
        };

        trace!(index, filled = chain.len(), "resolve level");
        for &structure in chain.iter().rev() {
            level += 1;
            self[structure].cache.level.set(Some(level));
        }
        level
    }

    /// Returns all structures below `index` in breadth-first order,
    /// excluding `index` itself.
    pub fn descendants(&self, index: StructureIndex) -> Vec<StructureIndex> {
        let mut descendants = Vec::new();
        let mut round = vec![index];
        while !round.is_empty() {
            let next: Vec<StructureIndex> = round
                .iter()
                .flat_map(|&i| self[i].children.iter().copied())
                .collect();
            descendants.extend_from_slice(&next);
            round = next;
        }
        descendants
    }

    /// Returns the number of pixels of a structure; with `subtree`,
    /// including all descendants (cached after the first call).
    pub fn npix(&self, index: StructureIndex, subtree: bool) -> usize {
        let structure = &self[index];
        if !subtree {
            return structure.npix_self();
        }
        if let Some(npix) = structure.cache.npix_subtree.get() {
            return npix;
        }

        let npix = self.pre_order_iter(index).map(|s| s.npix_self()).sum();
        structure.cache.npix_subtree.set(Some(npix));
        npix
    }

    /// Returns `(coordinate, value)` of the pixel with the maximum value.
    ///
    /// Without `subtree` only own pixels are considered; otherwise also
    /// those of all descendants. Ties go to the first maximum found, own
    /// pixels in insertion order first, then descendants breadth-first.
    ///
    /// # Returns
    /// `None` only if no pixel is considered, i.e. for a branch without
    /// own pixels when `subtree` is `false`.
    pub fn peak(&self, index: StructureIndex, subtree: bool) -> Option<(&C, f64)> {
        let mut found = self.local_peak(index);
        if !subtree {
            return found;
        }

        for descendant in self.descendants(index) {
            if let Some(candidate) = self.local_peak(descendant) {
                if found.is_none_or(|(_, best)| candidate.1 > best) {
                    found = Some(candidate);
                }
            }
        }
        found
    }

    /// Writes the level of each structure into `target` at the coordinates
    /// of its own pixels, for `index` and, with `recursive`, its whole
    /// subtree.
    ///
    /// Children are written before their parent, so a coordinate owned by
    /// several structures of one chain ends up with the outermost level.
    pub fn fill_footprint<T>(&self, index: StructureIndex, target: &mut T, recursive: bool)
    where
        T: FootprintTarget<C> + ?Sized,
    {
        if !recursive {
            self.stamp(index, target);
            return;
        }
        for structure in self.post_order_iter(index) {
            self.stamp(structure.index, target);
        }
    }

    /// Writes the footprint of every tree of this dendrogram into `target`.
    pub fn fill_footprint_all<T>(&self, target: &mut T)
    where
        T: FootprintTarget<C> + ?Sized,
    {
        for &root in &self.roots {
            self.fill_footprint(root, target, true);
        }
    }

    /// Resolves every lazily cached value (ancestor, level, subtree pixel
    /// count, local peak) in one pass.
    pub fn warm_caches(&self) {
        for index in 0..self.structures.len() {
            self.ancestor(index);
            self.level(index);
            self.local_peak(index);
        }
        // children precede parents, so subtree counts reuse cached children
        for index in 0..self.structures.len() {
            let structure = &self[index];
            if structure.cache.npix_subtree.get().is_none() {
                let npix = structure.npix_self()
                    + structure
                        .children
                        .iter()
                        .map(|&child| self.npix(child, true))
                        .sum::<usize>();
                structure.cache.npix_subtree.set(Some(npix));
            }
        }
        debug!(structures = self.structures.len(), "caches warmed");
    }

    /// Convenience method to convert the subtree of `index` to a Newick
    /// string; see [newick::to_newick].
    pub fn to_newick(&self, index: StructureIndex, style: &NewickStyle) -> String {
        newick::to_newick(style, self, index)
    }

    /// Returns one Newick string per root, in root order.
    pub fn to_newick_all(&self, style: &NewickStyle) -> Vec<String> {
        self.roots
            .iter()
            .map(|&root| newick::to_newick(style, self, root))
            .collect()
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
impl<C> Dendrogram<C> {
    fn local_peak(&self, index: StructureIndex) -> Option<(&C, f64)> {
        let structure = &self[index];
        let position = match structure.cache.peak_position.get() {
            Some(position) => position,
            None => {
                let position = structure.pixels.peak_position()?;
                structure.cache.peak_position.set(Some(position));
                position
            }
        };
        Some((
            &structure.indices_self()[position],
            structure.values_self()[position],
        ))
    }

    fn stamp<T>(&self, index: StructureIndex, target: &mut T)
    where
        T: FootprintTarget<C> + ?Sized,
    {
        let level = self.level(index);
        for coordinate in self[index].indices_self() {
            target.stamp(coordinate, level);
        }
    }
}

/// Finds the root above `index` with path compression.
///
/// Starts from the cached ancestor (or the parent) and keeps jumping
/// through cached ancestors of the structures passed until reaching one
/// without parent. All structures passed cache that root. Correct as long
/// as parents are never reassigned, which holds during construction too.
pub(crate) fn resolve_ancestor<C>(structures: &[Structure<C>], index: StructureIndex) -> StructureIndex {
    let structure = &structures[index];
    let Some(parent) = structure.parent else {
        return index;
    };

    let mut current = structure.cache.ancestor.get().unwrap_or(parent);
    if structures[current].parent.is_none() {
        structure.cache.ancestor.set(Some(current));
        return current;
    }

    let mut walked = vec![index];
    while let Some(next_parent) = structures[current].parent {
        walked.push(current);
        current = structures[current].cache.ancestor.get().unwrap_or(next_parent);
    }

    trace!(index, root = current, walked = walked.len(), "resolve ancestor");
    for &passed in &walked {
        structures[passed].cache.ancestor.set(Some(current));
    }
    current
}

impl<C> std::ops::Index<StructureIndex> for Dendrogram<C> {
    type Output = Structure<C>;

    fn index(&self, index: StructureIndex) -> &Self::Output {
        &self.structures[index]
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl<C> Dendrogram<C> {
    /// Returns an iterator over the subtree of `index` in pre-order
    /// (parents before children, children in order).
    ///
    /// Uses an explicit stack, so the depth of the tree is not limited by
    /// the call stack.
    pub fn pre_order_iter(&self, index: StructureIndex) -> PreOrderIter<'_, C> {
        PreOrderIter::new(self, index)
    }

    /// Returns an iterator over the subtree of `index` in post-order
    /// (children in order, each before its parent).
    pub fn post_order_iter(&self, index: StructureIndex) -> PostOrderIter<'_, C> {
        PostOrderIter::new(self, index)
    }
}

/// Iterator for post-order traversal of a subtree (children before parents).
pub struct PostOrderIter<'a, C> {
    dendrogram: &'a Dendrogram<C>,
    stack: Vec<(StructureIndex, bool)>, // (index, children_visited)
}

impl<'a, C> PostOrderIter<'a, C> {
    fn new(dendrogram: &'a Dendrogram<C>, start: StructureIndex) -> Self {
        PostOrderIter {
            dendrogram,
            stack: vec![(start, false)],
        }
    }
}

impl<'a, C> Iterator for PostOrderIter<'a, C> {
    type Item = &'a Structure<C>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let structure = &self.dendrogram[index];

            if children_visited || structure.is_leaf() {
                return Some(structure);
            }
            self.stack.push((index, true));
            // Push children in reverse, so the first child is visited first
            self.stack
                .extend(structure.children.iter().rev().map(|&child| (child, false)));
        }
        None
    }
}

/// Iterator for pre-order traversal of a subtree (parents before children).
pub struct PreOrderIter<'a, C> {
    dendrogram: &'a Dendrogram<C>,
    stack: Vec<StructureIndex>,
}

impl<'a, C> PreOrderIter<'a, C> {
    fn new(dendrogram: &'a Dendrogram<C>, start: StructureIndex) -> Self {
        PreOrderIter {
            dendrogram,
            stack: vec![start],
        }
    }
}

impl<'a, C> Iterator for PreOrderIter<'a, C> {
    type Item = &'a Structure<C>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let structure = &self.dendrogram[index];

        // Push children in reverse, so the first child is visited first
        self.stack.extend(structure.children.iter().rev());

        Some(structure)
    }
}
