//! Data model for dendrograms (merge trees).
//!
//! # Tree representation
//! A dendrogram is a forest of [Structure]s stored using the arena pattern
//! and referenced by [StructureIndex]. A structure is a leaf (a local
//! maximum region) or a branch (regions merged at a given level). Each
//! structure owns a [PixelSet] of the pixels added directly to it; views
//! over whole subtrees are computed by the [Dendrogram].
//!
//! # Two phases
//! | Type | Phase | Mutation |
//! |------|-------|----------|
//! | [DendrogramBuilder] | construction | leaves, pixels, merges, branches |
//! | [Dendrogram] | querying | none (lazy caches only) |
//!
//! [DendrogramBuilder::finish] moves from the first phase to the second,
//! so cached derived values can never go stale.
//!
//! # Footprints
//! Footprint maps are written into any [FootprintTarget], e.g. an
//! `ndarray` array with the shape of the data grid.

pub mod builder;
pub mod dendrogram;
pub mod footprint;
pub mod pixel_set;
pub mod structure;

pub use builder::DendrogramBuilder;
pub use dendrogram::{Dendrogram, PostOrderIter, PreOrderIter};
pub use footprint::FootprintTarget;
pub use pixel_set::{PixelSet, ValueRange};
pub use structure::{Structure, StructureId, StructureIndex};
