use dendro::model::{Dendrogram, DendrogramBuilder};
use proptest::prelude::*;
use std::collections::HashMap;

/// Builds a random forest: leaves with the given pixel values (unique
/// coordinates), then branches over groups of current roots as described
/// by `merges` (group size, start position).
fn build(leaves: &[Vec<f64>], merges: &[(usize, usize)]) -> Dendrogram<usize> {
    let mut builder = DendrogramBuilder::new();
    let mut next_coordinate = 0;
    let mut next_id = 0;
    let mut roots = Vec::new();

    for values in leaves {
        let pixels: Vec<(usize, f64)> = values
            .iter()
            .map(|&v| {
                next_coordinate += 1;
                (next_coordinate, v)
            })
            .collect();
        roots.push(builder.create_leaf_from(pixels, next_id).unwrap());
        next_id += 1;
    }

    let mut merge_level = 0.0;
    for &(size, start) in merges {
        let start = start % roots.len();
        let end = (start + size).min(roots.len());
        let children: Vec<_> = roots.drain(start..end).collect();

        merge_level -= 1.0;
        next_coordinate += 1;
        let branch = if size % 2 == 0 {
            builder.create_branch(&children, merge_level, next_id).unwrap()
        } else {
            builder
                .create_branch_at_pixel(&children, next_coordinate, merge_level, next_id)
                .unwrap()
        };
        next_id += 1;
        roots.push(branch);
    }

    builder.finish()
}

fn forest() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<(usize, usize)>)> {
    (
        prop::collection::vec(prop::collection::vec(0.0..100.0f64, 1..5), 1..12),
        prop::collection::vec((1usize..4, 0usize..64), 0..10),
    )
}

proptest! {
    #[test]
    fn prop_leaf_iff_no_merge_level((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        prop_assert!(dendrogram.is_valid());
        for structure in dendrogram.structures() {
            prop_assert_eq!(structure.is_leaf(), structure.merge_level().is_none());
        }
    }

    #[test]
    fn prop_subtree_views_add_up((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        for structure in dendrogram.structures() {
            let index = structure.index();
            let indices = dendrogram.indices(index);
            let from_children: usize = structure
                .children()
                .iter()
                .map(|&child| dendrogram.indices(child).len())
                .sum();
            prop_assert_eq!(indices.len(), dendrogram.values(index).len());
            prop_assert_eq!(indices.len(), structure.npix_self() + from_children);
            prop_assert_eq!(indices.len(), dendrogram.npix(index, true));
        }
    }

    #[test]
    fn prop_ancestor_is_fixed_point((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        for structure in dendrogram.structures() {
            let ancestor = dendrogram.ancestor(structure.index());
            prop_assert_eq!(dendrogram.ancestor(ancestor), ancestor);
            prop_assert!(dendrogram[ancestor].parent().is_none());
        }
    }

    #[test]
    fn prop_levels_and_heights((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        // query leaves first, so back-filled levels get checked too
        for index in dendrogram.leaves() {
            dendrogram.level(index);
        }
        for structure in dendrogram.structures() {
            let index = structure.index();
            match structure.parent() {
                None => {
                    prop_assert_eq!(dendrogram.level(index), 0);
                    if let Some(range) = structure.value_range() {
                        prop_assert_eq!(dendrogram.height(index), range.max - range.min);
                    }
                }
                Some(parent) => {
                    prop_assert_eq!(dendrogram.level(index), dendrogram.level(parent) + 1);
                    if let (Some(range), Some(level)) =
                        (structure.value_range(), dendrogram[parent].merge_level())
                    {
                        prop_assert_eq!(dendrogram.height(index), range.max - level);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_all_pixels_accounted((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        let fed: usize = leaves.iter().map(|l| l.len()).sum::<usize>()
            + dendrogram.structures().iter().filter(|s| !s.is_leaf()).map(|s| s.npix_self()).sum::<usize>();
        let counted: usize = dendrogram.roots().iter().map(|&r| dendrogram.npix(r, true)).sum();
        prop_assert_eq!(counted, fed);

        let mut footprint: HashMap<usize, usize> = HashMap::new();
        dendrogram.fill_footprint_all(&mut footprint);
        prop_assert_eq!(footprint.len(), fed);
        for structure in dendrogram.structures() {
            for coordinate in structure.indices_self() {
                prop_assert_eq!(footprint[coordinate], dendrogram.level(structure.index()));
            }
        }
    }

    #[test]
    fn prop_subtree_peak_is_maximum((leaves, merges) in forest()) {
        let dendrogram = build(&leaves, &merges);
        for &root in dendrogram.roots() {
            let (_, peak) = dendrogram.peak(root, true).unwrap();
            let max = dendrogram.values(root).into_iter().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(peak, max);
        }
    }
}
