//! An ordered set of strokes: one drawing.

use std::ops::Index;

use vstroke_math::{Aabb, Point3, Transform};

use crate::record::StrokeRecord;

/// All strokes of a drawing, in creation (and undo) order.
///
/// The aggregate [`bounds`](Self::bounds) and [`average`](Self::average)
/// are filled in by the decoder only. A collection that was captured live
/// and never read back from a file reports them at their zero value.
#[derive(Debug, Clone, Default)]
pub struct StrokeCollection {
    records: Vec<StrokeRecord>,
    bounds: Aabb,
    average: Point3,
}

impl StrokeCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection with precomputed aggregates.
    pub(crate) fn with_aggregates(records: Vec<StrokeRecord>, bounds: Aabb, average: Point3) -> Self {
        Self {
            records,
            bounds,
            average,
        }
    }

    /// Append a finished stroke. Aggregates are left untouched.
    pub fn append(&mut self, record: StrokeRecord) {
        self.records.push(record);
    }

    /// Remove and return the most recent stroke.
    pub fn remove_last(&mut self) -> Option<StrokeRecord> {
        self.records.pop()
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of strokes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no strokes.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stroke at `index`.
    pub fn get(&self, index: usize) -> Option<&StrokeRecord> {
        self.records.get(index)
    }

    /// Most recent stroke.
    pub fn last(&self) -> Option<&StrokeRecord> {
        self.records.last()
    }

    /// All strokes as a slice.
    pub fn records(&self) -> &[StrokeRecord] {
        &self.records
    }

    /// Iterate over strokes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StrokeRecord> {
        self.records.iter()
    }

    /// Total number of samples across all strokes.
    pub fn sample_count(&self) -> usize {
        self.records.iter().map(StrokeRecord::len).sum()
    }

    /// Bounding box of every sample position read by the decoder.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Mean sample position over the whole file, as read by the decoder.
    pub fn average(&self) -> Point3 {
        self.average
    }

    /// Set the host placement of the stroke at `index`.
    ///
    /// Returns `false` if there is no such stroke.
    pub fn set_placement(&mut self, index: usize, placement: Transform) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.placement = placement;
                true
            }
            None => false,
        }
    }
}

impl Index<usize> for StrokeCollection {
    type Output = StrokeRecord;

    fn index(&self, index: usize) -> &StrokeRecord {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a StrokeCollection {
    type Item = &'a StrokeRecord;
    type IntoIter = std::slice::Iter<'a, StrokeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<StrokeRecord> for StrokeCollection {
    fn from_iter<I: IntoIterator<Item = StrokeRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}
