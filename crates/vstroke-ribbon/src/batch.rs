//! Ribbon reconstruction from finished strokes, at any level of detail.

use rayon::prelude::*;
use vstroke_math::{Point3, Vec3};
use vstroke_model::StrokeRecord;

use crate::mesh::RibbonMesh;
use crate::DEFAULT_MIN_SEGMENT_SIZE;

/// One level of detail of a stroke.
#[derive(Debug, Clone)]
pub struct LodMesh {
    /// Level number, 0 is the most detailed.
    pub level: u32,
    /// Sample stride used for this level (`2^level`).
    pub stride: usize,
    /// The ribbon at this level.
    pub mesh: RibbonMesh,
    /// Set on the coarsest level: it stays visible at any distance.
    pub never_cull: bool,
}

/// Sample stride for LOD `level`.
pub fn stride_for_level(level: u32) -> usize {
    1usize << level.min(usize::BITS - 1)
}

/// Builds ribbons from finished [`StrokeRecord`]s.
///
/// Holds only configuration, so one builder can be shared across threads
/// and used for many strokes and levels at once.
#[derive(Debug, Clone, Copy)]
pub struct BatchRibbonBuilder {
    /// At stride 1, samples closer than this are dropped.
    pub min_segment_size: f64,
    /// Subtracted from every centerline point before building.
    pub offset: Vec3,
}

impl Default for BatchRibbonBuilder {
    fn default() -> Self {
        Self {
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            offset: Vec3::zeros(),
        }
    }
}

impl BatchRibbonBuilder {
    /// Builder with the given segment threshold and no offset.
    pub fn new(min_segment_size: f64) -> Self {
        Self {
            min_segment_size,
            ..Self::default()
        }
    }

    /// Same builder, shifting every centerline point by `-offset`.
    pub fn with_offset(self, offset: Vec3) -> Self {
        Self { offset, ..self }
    }

    /// Indices of the samples that become cross-sections at `stride`.
    ///
    /// Walks `0, stride, 2*stride, ...` and always ends on the last sample.
    /// At stride 1, a sample is skipped while it is within the segment
    /// threshold of the last kept sample. A dwelling final sample replaces
    /// the last kept one instead of adding a near-zero segment.
    pub fn select_indices(&self, record: &StrokeRecord, stride: usize) -> Vec<usize> {
        let samples = record.samples();
        if samples.is_empty() {
            return Vec::new();
        }
        let stride = stride.max(1);
        let last = samples.len() - 1;
        let position = |i: usize| samples[i].position;

        let mut kept = vec![0];
        let mut next = stride;
        loop {
            let candidate = next.min(last);
            let previous_kept = kept[kept.len() - 1];
            if candidate == previous_kept {
                break;
            }

            if stride == 1 {
                let near_kept = (position(candidate) - position(previous_kept)).norm() < self.min_segment_size;
                if candidate == last {
                    if near_kept && kept.len() > 1 {
                        kept.pop();
                    }
                } else if near_kept {
                    next += 1;
                    continue;
                }
            }

            kept.push(candidate);
            if candidate == last {
                break;
            }
            next += stride;
        }
        kept
    }

    /// Build the ribbon for `record` at the given sample stride.
    pub fn build(&self, record: &StrokeRecord, stride: usize) -> RibbonMesh {
        let samples = record.samples();
        let mut mesh = RibbonMesh::new();
        let mut previous: Option<Point3> = None;
        for idx in self.select_indices(record, stride) {
            let sample = &samples[idx];
            let pos = sample.position - self.offset;
            mesh.append_section(&pos, &sample.up(), sample.half_width(), previous.as_ref());
            previous = Some(pos);
        }
        mesh
    }

    /// Build LOD `level` of `record` (stride `2^level`).
    pub fn build_level(&self, record: &StrokeRecord, level: u32, levels: u32) -> LodMesh {
        let stride = stride_for_level(level);
        LodMesh {
            level,
            stride,
            mesh: self.build(record, stride),
            never_cull: level + 1 >= levels,
        }
    }

    /// Build every level `0..levels` of `record`, in parallel.
    ///
    /// At least one level is always built.
    pub fn build_lods(&self, record: &StrokeRecord, levels: u32) -> Vec<LodMesh> {
        let levels = levels.max(1);
        (0..levels)
            .into_par_iter()
            .map(|level| self.build_level(record, level, levels))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vstroke_math::{Quat, Rgba};
    use vstroke_model::StrokeSample;

    fn record_from(points: &[Point3]) -> StrokeRecord {
        StrokeRecord::from_samples(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| StrokeSample::new(i as f64 * 0.01, *p, Quat::identity(), 0.2, Rgba::WHITE))
                .collect(),
        )
    }

    fn unit_line(n: usize) -> StrokeRecord {
        let points: Vec<Point3> = (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        record_from(&points)
    }

    #[test]
    fn test_stride_one_keeps_every_distinct_sample() {
        let builder = BatchRibbonBuilder::new(0.5);
        let record = unit_line(6);
        assert_eq!(builder.select_indices(&record, 1), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(builder.build(&record, 1).cross_section_count(), 6);
    }

    #[test]
    fn test_stride_one_large_threshold_keeps_ends() {
        for threshold in [5.5, 10.0] {
            let builder = BatchRibbonBuilder::new(threshold);
            let record = unit_line(6);
            assert_eq!(builder.select_indices(&record, 1), vec![0, 5], "threshold {}", threshold);
            assert_eq!(builder.build(&record, 1).cross_section_count(), 2);
        }
    }

    #[test]
    fn test_threshold_measured_from_kept_sample() {
        // each step is below the threshold, every second step is not
        let builder = BatchRibbonBuilder::new(1.5);
        assert_eq!(builder.select_indices(&unit_line(6), 1), vec![0, 2, 5]);
    }

    #[test]
    fn test_slow_arc_keeps_its_shape() {
        // quarter circle, radius 0.5, samples ~3.9mm apart
        let n = 200;
        let points: Vec<Point3> = (0..n)
            .map(|i| {
                let a = i as f64 / (n - 1) as f64 * std::f64::consts::FRAC_PI_2;
                Point3::new(0.5 * a.cos(), 1.0, 0.5 * a.sin())
            })
            .collect();
        let record = record_from(&points);
        let builder = BatchRibbonBuilder::new(0.005);

        let kept = builder.select_indices(&record, 1);
        // every second sample clears the threshold; the dwelling end replaces 198
        assert_eq!(kept.len(), 100);
        assert_eq!(&kept[..3], &[0, 2, 4]);
        assert_eq!(&kept[kept.len() - 2..], &[196, 199]);
        let expected = record.path_length() / builder.min_segment_size;
        assert!((kept.len() as f64) > expected * 0.5, "{} of ~{}", kept.len(), expected);

        let mesh = builder.build(&record, 1);
        assert_eq!(mesh.cross_section_count(), 100);
        // the middle of the ribbon follows the arc, not the chord
        let mid = mesh.vertices()[50 * 4];
        let radius = (mid.x * mid.x + mid.z * mid.z).sqrt();
        assert_relative_eq!(radius, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_stride_four_includes_last() {
        let builder = BatchRibbonBuilder::default();
        let record = unit_line(10);
        assert_eq!(builder.select_indices(&record, 4), vec![0, 4, 8, 9]);
        assert_eq!(builder.build(&record, 4).cross_section_count(), 4);
    }

    #[test]
    fn test_stride_aligned_last_not_duplicated() {
        let builder = BatchRibbonBuilder::default();
        assert_eq!(builder.select_indices(&unit_line(9), 4), vec![0, 4, 8]);
        assert_eq!(builder.select_indices(&unit_line(8), 4), vec![0, 4, 7]);
    }

    #[test]
    fn test_coarse_stride_ignores_threshold() {
        let points: Vec<Point3> = (0..9).map(|i| Point3::new(i as f64 * 0.001, 0.0, 0.0)).collect();
        let builder = BatchRibbonBuilder::new(1.0);
        assert_eq!(builder.select_indices(&record_from(&points), 2), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_dwell_samples_dropped() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
            Point3::new(0.002, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.001),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let builder = BatchRibbonBuilder::new(0.005);
        assert_eq!(builder.select_indices(&record_from(&points), 1), vec![0, 3, 5]);
    }

    #[test]
    fn test_dwelling_end_replaces_last_kept() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.001, 0.0, 0.0),
        ];
        let builder = BatchRibbonBuilder::new(0.005);
        assert_eq!(builder.select_indices(&record_from(&points), 1), vec![0, 1, 3]);
    }

    #[test]
    fn test_single_sample() {
        let record = unit_line(1);
        let builder = BatchRibbonBuilder::default();
        for stride in [1, 2, 8] {
            assert_eq!(builder.select_indices(&record, stride), vec![0]);
            let mesh = builder.build(&record, stride);
            assert_eq!(mesh.vertices().len(), 4);
            assert!(mesh.front_indices().is_empty());
        }
    }

    #[test]
    fn test_empty_record() {
        let builder = BatchRibbonBuilder::default();
        assert!(builder.build(&StrokeRecord::new(), 1).is_empty());
    }

    #[test]
    fn test_mesh_uses_sample_orientation_and_width() {
        // rotate +Y onto +Z so the ribbon lies flat
        let q = Quat::from_axis_angle(&Vec3::x_axis(), std::f64::consts::FRAC_PI_2);
        let record = StrokeRecord::from_samples(vec![
            StrokeSample::new(0.0, Point3::new(0.0, 0.0, 0.0), q, 0.4, Rgba::WHITE),
            StrokeSample::new(0.1, Point3::new(1.0, 0.0, 0.0), q, 0.4, Rgba::WHITE),
        ]);
        let mesh = BatchRibbonBuilder::default().build(&record, 1);
        assert_relative_eq!(mesh.vertices()[4], Point3::new(1.0, 0.0, 0.2), epsilon = 1e-12);
        assert_relative_eq!(mesh.vertices()[6], Point3::new(1.0, 0.0, -0.2), epsilon = 1e-12);
        // z × x = y
        assert_relative_eq!(mesh.normals()[0], Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_matches_incremental_builder() {
        use crate::IncrementalRibbonBuilder;
        let record = record_from(&[
            Point3::new(0.2, 0.0, 0.0),
            Point3::new(1.0, 0.5, 0.0),
            Point3::new(1.5, 0.5, 1.0),
            Point3::new(3.0, 0.0, 1.0),
        ]);
        let mut live = IncrementalRibbonBuilder::new(0.005);
        for s in record.samples() {
            live.add_point(s.position, s.up(), s.half_width());
        }
        let batch = BatchRibbonBuilder::new(0.005).build(&record, 1);
        assert_eq!(&batch, live.mesh());
    }

    #[test]
    fn test_offset_shifts_vertices() {
        let record = unit_line(3);
        let offset = Vec3::new(1.0, 0.0, 2.0);
        let plain = BatchRibbonBuilder::default().build(&record, 1);
        let shifted = BatchRibbonBuilder::default().with_offset(offset).build(&record, 1);
        for (a, b) in plain.vertices().iter().zip(shifted.vertices()) {
            assert_relative_eq!(a - offset, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_build_lods() {
        let record = unit_line(10);
        let lods = BatchRibbonBuilder::default().build_lods(&record, 3);
        assert_eq!(lods.len(), 3);
        let strides: Vec<usize> = lods.iter().map(|l| l.stride).collect();
        assert_eq!(strides, vec![1, 2, 4]);
        let sections: Vec<usize> = lods.iter().map(|l| l.mesh.cross_section_count()).collect();
        assert_eq!(sections, vec![10, 6, 4]);
        let culling: Vec<bool> = lods.iter().map(|l| l.never_cull).collect();
        assert_eq!(culling, vec![false, false, true]);
    }

    #[test]
    fn test_zero_levels_builds_one() {
        let lods = BatchRibbonBuilder::default().build_lods(&unit_line(3), 0);
        assert_eq!(lods.len(), 1);
        assert!(lods[0].never_cull);
        assert_eq!(lods[0].stride, 1);
    }

    #[test]
    fn test_stride_for_level() {
        assert_eq!(stride_for_level(0), 1);
        assert_eq!(stride_for_level(1), 2);
        assert_eq!(stride_for_level(5), 32);
    }
}
