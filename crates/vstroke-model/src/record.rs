//! A single stroke: the samples taken between pressing and releasing the brush.

use std::sync::OnceLock;

use vstroke_math::{Point3, Transform, Vec3};

use crate::sample::StrokeSample;

/// Ordered samples forming one stroke.
///
/// Samples are appended while the stroke is being captured. Once the
/// record has been handed to a [`crate::StrokeCollection`] only shared
/// access is available, so the samples no longer change.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecord {
    samples: Vec<StrokeSample>,
    centroid: OnceLock<Point3>,
    /// Placement of the stroke's renderable, owned by the host application.
    pub placement: Transform,
}

impl StrokeRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from already captured samples.
    pub fn from_samples(samples: Vec<StrokeSample>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: StrokeSample) {
        self.samples.push(sample);
        self.centroid.take();
    }

    /// All samples in capture order.
    pub fn samples(&self) -> &[StrokeSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the record has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the first sample.
    pub fn start_time(&self) -> Option<f64> {
        self.samples.first().map(|s| s.time)
    }

    /// Timestamp of the last sample.
    pub fn end_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.time)
    }

    /// Elapsed time between the first and last sample.
    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Mean of all sample positions, computed on first use.
    ///
    /// An empty record has its centroid at the origin.
    pub fn centroid(&self) -> Point3 {
        *self.centroid.get_or_init(|| {
            if self.samples.is_empty() {
                return Point3::origin();
            }
            let sum = self
                .samples
                .iter()
                .fold(Vec3::zeros(), |acc, s| acc + s.position.coords);
            Point3::from(sum / self.samples.len() as f64)
        })
    }

    /// Centroid mapped through the renderable's placement.
    pub fn world_centroid(&self) -> Point3 {
        self.placement.apply_point(&self.centroid())
    }

    /// Total length of the centerline.
    pub fn path_length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| (w[1].position - w[0].position).norm())
            .sum()
    }
}
