//! Constants for Newick writing.

/// Default number of decimals of structure heights
pub(crate) const DEFAULT_PRECISION: usize = 3;

/// Per structure: parentheses/comma, colon, and a few id digits
pub(crate) const STRUCTURE_CHARS: usize = 8;

/// Integer part and decimal point of a height
pub(crate) const HEIGHT_FIXED_CHARS: usize = 4;

/// Extra buffer in Newick string length/capacity estimate
pub(crate) const BUFFER_CHARS: usize = 10;
