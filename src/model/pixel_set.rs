//! Own pixels of a single structure.
//!
//! A [PixelSet] only holds the pixels added directly to one structure, not
//! those inherited from its children.

// =#========================================================================#=
// VALUE RANGE
// =#========================================================================#=
/// Closed interval `[min, max]` of pixel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl ValueRange {
    /// Creates the degenerate range `[value, value]`.
    pub fn single(value: f64) -> Self {
        ValueRange {
            min: value,
            max: value,
        }
    }

    /// Widens this range to include `value`.
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Widens this range to include all of `other`.
    pub fn union(&mut self, other: &ValueRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Returns `max - min`.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

// =#========================================================================#=
// PIXEL SET
// =#========================================================================#=
/// Ordered (coordinate, value) pairs owned directly by one structure.
///
/// Coordinates and values are kept in two parallel vectors so that both
/// projections are available as slices. Pixels can only be added, never
/// removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSet<C> {
    coordinates: Vec<C>,
    values: Vec<f64>,
    range: Option<ValueRange>,
}

impl<C> PixelSet<C> {
    /// Creates an empty pixel set.
    pub fn new() -> Self {
        PixelSet {
            coordinates: Vec::new(),
            values: Vec::new(),
            range: None,
        }
    }

    /// Creates a pixel set holding a single pixel.
    pub fn single(coordinate: C, value: f64) -> Self {
        PixelSet {
            coordinates: vec![coordinate],
            values: vec![value],
            range: Some(ValueRange::single(value)),
        }
    }

    /// Appends a pixel and widens the value range accordingly.
    pub fn append(&mut self, coordinate: C, value: f64) {
        self.coordinates.push(coordinate);
        self.values.push(value);
        match &mut self.range {
            Some(range) => range.include(value),
            None => self.range = Some(ValueRange::single(value)),
        }
    }

    /// Moves all pixels of `other` to the end of this set.
    pub fn absorb(&mut self, other: PixelSet<C>) {
        let PixelSet {
            coordinates,
            values,
            range,
        } = other;
        self.coordinates.extend(coordinates);
        self.values.extend(values);
        if let Some(theirs) = range {
            match &mut self.range {
                Some(own) => own.union(&theirs),
                None => self.range = Some(theirs),
            }
        }
    }

    /// Returns the coordinates in insertion order.
    pub fn coordinates(&self) -> &[C] {
        &self.coordinates
    }

    /// Returns the values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the value range, or `None` if the set is empty.
    pub fn range(&self) -> Option<ValueRange> {
        self.range
    }

    /// Returns the number of pixels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the position of the first pixel holding the maximum value.
    pub fn peak_position(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (position, value) in self.values.iter().enumerate() {
            // strictly greater, so the first maximum wins
            if best.is_none_or(|b| *value > self.values[b]) {
                best = Some(position);
            }
        }
        best
    }
}

impl<C> Default for PixelSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FromIterator<(C, f64)> for PixelSet<C> {
    fn from_iter<I: IntoIterator<Item = (C, f64)>>(iter: I) -> Self {
        let mut set = PixelSet::new();
        for (coordinate, value) in iter {
            set.append(coordinate, value);
        }
        set
    }
}
