//! Error type for dendrogram construction.
//!
//! Only the construction phase can fail. Queries on a finished
//! [Dendrogram](crate::model::Dendrogram) never return errors.

use crate::model::{StructureId, StructureIndex};
use thiserror::Error;

/// Errors that can occur while assembling a dendrogram with a
/// [DendrogramBuilder](crate::model::DendrogramBuilder).
///
/// A failed operation never changes the builder, so the caller may retry
/// with corrected input.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum DendroError {
    /// Input rejected by a construction operation, e.g. an empty pixel
    /// sequence for a leaf or an empty list of children for a branch.
    #[error("Invalid input - {0}")]
    InvalidInput(String),

    /// A structure with this id already exists in the tree.
    #[error("Structure id {0} is already in use")]
    DuplicateId(StructureId),

    /// Index does not refer to a live structure of the builder.
    #[error("No structure at index {0}")]
    UnknownStructure(StructureIndex),
}

impl DendroError {
    /// Convenience constructor for [DendroError::InvalidInput]
    pub(crate) fn invalid_input<S: Into<String>>(msg: S) -> Self {
        DendroError::InvalidInput(msg.into())
    }
}
