//! Ribbon construction while a stroke is being drawn.

use vstroke_math::{Point3, Vec3};

use crate::mesh::{section_normal, RibbonMesh};
use crate::DEFAULT_MIN_SEGMENT_SIZE;

/// What [`IncrementalRibbonBuilder::push_pose`] did with a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentUpdate {
    /// A new cross-section was committed.
    Added,
    /// The last cross-section was moved to the pose.
    Moved,
}

/// Grows a ribbon one pose at a time.
///
/// Every call leaves the mesh in a renderable state. The builder is meant
/// for a single capture loop and is not shared between threads.
#[derive(Debug, Clone)]
pub struct IncrementalRibbonBuilder {
    centerline: Vec<Point3>,
    half_widths: Vec<f64>,
    last_committed: Option<Point3>,
    mesh: RibbonMesh,
    min_segment_size: f64,
}

impl IncrementalRibbonBuilder {
    /// Create a builder that commits a new cross-section only once the tip
    /// has moved more than `min_segment_size` from the last one.
    pub fn new(min_segment_size: f64) -> Self {
        Self {
            centerline: Vec::new(),
            half_widths: Vec::new(),
            last_committed: None,
            mesh: RibbonMesh::new(),
            min_segment_size,
        }
    }

    /// Minimum distance between committed centerline points.
    pub fn min_segment_size(&self) -> f64 {
        self.min_segment_size
    }

    /// Committed centerline points.
    pub fn centerline(&self) -> &[Point3] {
        &self.centerline
    }

    /// Current position of the last cross-section, including updates.
    pub fn last_point(&self) -> Option<Point3> {
        self.centerline.last().copied()
    }

    /// Position passed to the most recent [`add_point`](Self::add_point).
    ///
    /// Unlike [`last_point`](Self::last_point) this does not follow
    /// [`update_last_point`](Self::update_last_point).
    pub fn last_committed(&self) -> Option<Point3> {
        self.last_committed
    }

    /// Number of cross-sections.
    pub fn len(&self) -> usize {
        self.centerline.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.centerline.is_empty()
    }

    /// The mesh built so far.
    pub fn mesh(&self) -> &RibbonMesh {
        &self.mesh
    }

    /// Consume the builder, keeping the mesh.
    pub fn into_mesh(self) -> RibbonMesh {
        self.mesh
    }

    /// Whether a tip at `pos` is far enough from the last committed point
    /// to commit a new one.
    pub fn should_add(&self, pos: &Point3) -> bool {
        match &self.last_committed {
            Some(last) => (pos - last).norm() > self.min_segment_size,
            None => true,
        }
    }

    /// Commit a new cross-section at `pos`.
    pub fn add_point(&mut self, pos: Point3, up: Vec3, half_width: f64) {
        self.mesh.append_section(&pos, &up, half_width, self.centerline.last());
        self.centerline.push(pos);
        self.half_widths.push(half_width);
        self.last_committed = Some(pos);
    }

    /// Move the last cross-section to `pos` without adding topology.
    ///
    /// While the ribbon has exactly two cross-sections the first one is
    /// re-aimed as well, since its direction is only known from the second.
    pub fn update_last_point(&mut self, pos: Point3, up: Vec3) {
        let len = self.centerline.len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        let previous = last.checked_sub(1).map(|i| self.centerline[i]);
        let normal = section_normal(&pos, &up, previous.as_ref());

        self.centerline[last] = pos;
        self.mesh.set_section(last, &pos, &up, self.half_widths[last], &normal);

        if len == 2 {
            let first = self.centerline[0];
            self.mesh.set_section(0, &first, &up, self.half_widths[0], &normal);
        }
    }

    /// Feed the current tip pose, adding or moving a cross-section as
    /// [`should_add`](Self::should_add) decides.
    pub fn push_pose(&mut self, pos: Point3, up: Vec3, half_width: f64) -> SegmentUpdate {
        if self.should_add(&pos) {
            self.add_point(pos, up, half_width);
            SegmentUpdate::Added
        } else {
            self.update_last_point(pos, up);
            SegmentUpdate::Moved
        }
    }
}

impl Default for IncrementalRibbonBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SEGMENT_SIZE)
    }
}
