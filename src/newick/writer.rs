//! Newick format writing for dendrograms

use crate::model::{Dendrogram, StructureIndex};
use crate::newick::defs::{
    BUFFER_CHARS, DEFAULT_PRECISION, HEIGHT_FIXED_CHARS, STRUCTURE_CHARS,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Style for serializing a dendrogram to Newick format.
///
/// Controls the number of decimals of structure heights and whether each
/// tree is terminated with a semicolon. The default (3 decimals, no
/// semicolon) gives strings like `(0:3.000,1:1.000)2:0.000`.
///
/// # Example
/// ```
/// use dendro::newick::NewickStyle;
///
/// let style = NewickStyle::new().with_precision(1).with_terminator(true);
/// assert_eq!(style.precision(), 1);
/// assert!(style.is_terminated());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewickStyle {
    precision: usize,
    terminated: bool,
}

impl NewickStyle {
    /// Creates the default style.
    pub fn new() -> Self {
        NewickStyle {
            precision: DEFAULT_PRECISION,
            terminated: false,
        }
    }

    /// Sets the number of decimals used for heights.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Sets whether each tree is terminated with `;`.
    pub fn with_terminator(mut self, terminated: bool) -> Self {
        self.terminated = terminated;
        self
    }

    /// Returns the number of decimals used for heights.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Returns whether each tree is terminated with `;`.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Default for NewickStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the trees of a dendrogram to a file in Newick format, one tree
/// per root and line.
///
/// # Arguments
/// * `file` - The file to write to
/// * `dendrogram` - Dendrogram whose trees are written
/// * `style` - The [NewickStyle] used for each tree
///
/// # Errors
/// Returns an I/O error if writing fails.
///
/// # Example
/// ```ignore
/// use dendro::newick::{NewickStyle, write_newick_file};
/// use std::fs::File;
///
/// let file = File::create("structures.nwk")?;
/// write_newick_file(file, &your_dendrogram, &NewickStyle::new().with_terminator(true))?;
/// ```
pub fn write_newick_file<C>(file: File, dendrogram: &Dendrogram<C>, style: &NewickStyle) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for &root in dendrogram.roots() {
        let newick = to_newick(style, dendrogram, root);
        writer.write_all(newick.as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Returns the Newick representation of the subtree of `index`.
///
/// A leaf is written as `<id>:<height>`, a branch as
/// `(<child>,<child>,...)<id>:<height>` with children in order and heights
/// (see [Dendrogram::height]) with the precision of `style`.
///
/// # Example
/// ```
/// use dendro::model::DendrogramBuilder;
/// use dendro::newick::{NewickStyle, to_newick};
///
/// let mut builder = DendrogramBuilder::new();
/// let a = builder.create_leaf((0, 0), 5.0, 0)?;
/// let b = builder.create_leaf((1, 1), 3.0, 1)?;
/// let branch = builder.create_branch(&[a, b], 2.0, 2)?;
/// let dendrogram = builder.finish();
///
/// let newick = to_newick(&NewickStyle::new(), &dendrogram, branch);
/// assert_eq!(newick, "(0:3.000,1:1.000)2:0.000");
/// # Ok::<(), dendro::DendroError>(())
/// ```
pub fn to_newick<C>(style: &NewickStyle, dendrogram: &Dendrogram<C>, index: StructureIndex) -> String {
    // Helper for adding `<id>:<height>`
    fn build_newick_label<C>(newick: &mut String, dendrogram: &Dendrogram<C>, index: StructureIndex, style: &NewickStyle) {
        newick.push_str(&dendrogram[index].id().to_string());
        newick.push(':');
        newick.push_str(&format!("{:.*}", style.precision, dendrogram.height(index)));
    }

    // Builds the Newick string with an explicit stack of
    // (structure, number of children already written) frames
    fn build_newick<C>(newick: &mut String, dendrogram: &Dendrogram<C>, index: StructureIndex, style: &NewickStyle) {
        let mut stack: Vec<(StructureIndex, usize)> = vec![(index, 0)];

        while let Some((current, written)) = stack.pop() {
            let children = dendrogram[current].children();
            if written < children.len() {
                newick.push(if written == 0 { '(' } else { ',' });
                stack.push((current, written + 1));
                stack.push((children[written], 0));
            } else {
                if !children.is_empty() {
                    newick.push(')');
                }
                build_newick_label(newick, dendrogram, current, style);
            }
        }
    }

    let estimated_capacity = estimate_newick_len(style, dendrogram, index);
    let mut newick = String::with_capacity(estimated_capacity);

    build_newick(&mut newick, dendrogram, index, style);
    if style.terminated {
        newick.push(';');
    }

    newick
}

/// Estimates the length of the Newick string of the subtree of `index`,
/// used to pre-allocate the output.
pub(crate) fn estimate_newick_len<C>(style: &NewickStyle, dendrogram: &Dendrogram<C>, index: StructureIndex) -> usize {
    let num_structures = dendrogram.pre_order_iter(index).count();
    let per_structure = STRUCTURE_CHARS + HEIGHT_FIXED_CHARS + style.precision;
    num_structures * per_structure + BUFFER_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DendrogramBuilder;

    #[test]
    fn test_estimate_grows_with_precision() {
        let mut builder = DendrogramBuilder::new();
        let leaf = builder.create_leaf(0usize, 1.0, 0).unwrap();
        let dendrogram = builder.finish();

        let short = estimate_newick_len(&NewickStyle::new(), &dendrogram, leaf);
        let long = estimate_newick_len(&NewickStyle::new().with_precision(10), &dendrogram, leaf);
        assert!(long > short);
        assert!(short >= to_newick(&NewickStyle::new(), &dendrogram, leaf).len());
    }
}
