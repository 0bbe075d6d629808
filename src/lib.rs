//! Dendro is a library for merge trees ("dendrograms") of scalar fields
//! sampled on a grid, such as astronomical intensity cubes.
//!
//! Each structure of a dendrogram is a connected region of grid cells
//! above some threshold. Leaves are local maxima; branches are created at
//! the level where regions merge as the threshold is lowered. The merge
//! algorithm that scans the grid is not part of this crate: it reports its
//! decisions to a [DendrogramBuilder], and this crate provides everything
//! derived from the resulting tree.
//!
//! Core functionality provided:
//! - Construction: [DendrogramBuilder] with leaf creation, pixel appends,
//!   flat merges of open leaves, and branch creation.
//! - Queries on the frozen [Dendrogram]:
//!   - aggregated pixel coordinates/values of subtrees
//!   - height, level, ancestor (with path compression), descendants
//!   - pixel counts and peaks, locally or over subtrees
//!   - footprint maps into `ndarray` arrays or hash maps
//! - Export: Newick strings per tree, see [crate::newick].
//!
//! The model uses the arena pattern: structures refer to parents and
//! children by [StructureIndex](model::StructureIndex), never by reference.
//! See [crate::model] for more details.
//!
//! # Example
//! ```
//! use dendro::{DendrogramBuilder, NewickStyle};
//!
//! let mut builder = DendrogramBuilder::new();
//! let l1 = builder.create_leaf((0, 0), 5.0, 0)?;
//! let l2 = builder.create_leaf((1, 1), 3.0, 1)?;
//! let branch = builder.create_branch(&[l1, l2], 2.0, 2)?;
//! let dendrogram = builder.finish();
//!
//! assert_eq!(dendrogram.height(l1), 3.0);
//! assert_eq!(dendrogram.peak(branch, true), Some((&(0, 0), 5.0)));
//! assert_eq!(dendrogram.to_newick(branch, &NewickStyle::new()), "(0:3.000,1:1.000)2:0.000");
//! # Ok::<(), dendro::DendroError>(())
//! ```

pub mod error;
pub mod model;
pub mod newick;

pub use error::DendroError;
pub use model::{Dendrogram, DendrogramBuilder};
pub use newick::NewickStyle;
