//! A single pose observation taken while drawing.

use vstroke_math::{up_vector, Point3, Quat, Rgba, Vec3};

/// One timestamped brush pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    /// Seconds since capture started, monotonic within a stroke.
    pub time: f64,
    /// Brush tip position.
    pub position: Point3,
    /// Brush orientation.
    pub orientation: Quat,
    /// Full ribbon width at this sample.
    pub width: f64,
    /// Normalized brush color.
    pub color: Rgba,
}

impl StrokeSample {
    /// Create a sample.
    pub fn new(time: f64, position: Point3, orientation: Quat, width: f64, color: Rgba) -> Self {
        Self {
            time,
            position,
            orientation,
            width,
            color,
        }
    }

    /// Direction the ribbon is extruded along at this sample.
    pub fn up(&self) -> Vec3 {
        up_vector(&self.orientation)
    }

    /// Half of the ribbon width.
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }
}
