//! Targets for footprint maps.
//!
//! A footprint labels every grid cell belonging to a structure with the
//! [level](crate::model::Dendrogram::level) of the structure owning it.
//! Any type implementing [FootprintTarget] can receive these labels; the
//! crate provides implementations for [HashMap] and for `ndarray` arrays of
//! `i32` (e.g. an `Array3<i32>` with the shape of the data cube).

use ndarray::{ArrayBase, DataMut, Dimension, NdIndex};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Receiver of footprint labels, addressed by pixel coordinate.
pub trait FootprintTarget<C> {
    /// Records `level` for the cell at `coordinate`, overwriting any
    /// previous label.
    fn stamp(&mut self, coordinate: &C, level: usize);
}

impl<C, S> FootprintTarget<C> for HashMap<C, usize, S>
where
    C: Clone + Eq + Hash,
    S: BuildHasher,
{
    fn stamp(&mut self, coordinate: &C, level: usize) {
        self.insert(coordinate.clone(), level);
    }
}

/// Arrays store levels as `i32`, saturating at `i32::MAX`.
///
/// # Panics
/// Panics if a coordinate lies outside the array, like indexing does.
impl<S, D, C> FootprintTarget<C> for ArrayBase<S, D>
where
    S: DataMut<Elem = i32>,
    D: Dimension,
    C: NdIndex<D> + Clone,
{
    fn stamp(&mut self, coordinate: &C, level: usize) {
        self[coordinate.clone()] = i32::try_from(level).unwrap_or(i32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_hash_map_overwrites() {
        let mut map: HashMap<(i64, i64), usize> = HashMap::new();
        map.stamp(&(3, -1), 2);
        map.stamp(&(3, -1), 4);
        assert_eq!(map.get(&(3, -1)), Some(&4));
    }

    #[test]
    fn test_arrays() {
        let mut image = Array2::<i32>::from_elem((2, 3), -1);
        image.stamp(&(1usize, 2usize), 3);
        assert_eq!(image[(1, 2)], 3);
        assert_eq!(image[(0, 0)], -1);

        let mut cube = Array3::<i32>::zeros((2, 2, 2));
        cube.stamp(&[1usize, 0, 1], 7);
        assert_eq!(cube[[1, 0, 1]], 7);
    }
}
