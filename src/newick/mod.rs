//! Newick format writer for dendrograms.
//!
//! Each tree of a [Dendrogram](crate::model::Dendrogram) can be written as
//! a Newick string, e.g. to inspect it with phylogenetic tree viewers.
//!
//! # Format
//! Structure ids act as labels and structure heights as branch lengths:
//! * `tree ::= structure [';']`
//! * `structure ::= leaf | branch`
//! * `branch ::= '(' structure { ',' structure } ')' id ':' height`
//! * `leaf ::= id ':' height`
//!
//! Heights are written with a fixed number of decimals, see
//! [NewickStyle].

mod defs;
pub mod writer;

pub use writer::{NewickStyle, to_newick, write_newick_file};
