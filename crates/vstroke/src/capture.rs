//! Live stroke capture.
//!
//! [`CaptureSession`] turns a stream of controller poses into strokes. Each
//! frame the host calls [`CaptureSession::tick`] with the brush tip pose
//! and the paint button state. The session grows the in-progress ribbon,
//! records samples, and files finished strokes into a [`StrokeCollection`].

use std::path::PathBuf;

use vstroke_math::{up_vector, Point3, Quat, Rgba};
use vstroke_model::{StrokeCollection, StrokeRecord, StrokeSample};
use vstroke_ribbon::{IncrementalRibbonBuilder, RibbonMesh, SegmentUpdate};

use crate::error::Result;
use crate::loader::save_drawing;
use crate::palette::{wrap_unit, ColorPalette};
use crate::settings::{BrushSettings, Settings};
use crate::task::BackgroundTask;

/// Position and orientation of the brush tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Tip position.
    pub position: Point3,
    /// Tip orientation; its local up axis spans the ribbon.
    pub orientation: Quat,
}

impl Pose {
    /// Create a pose.
    pub fn new(position: Point3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// Brush size and colour, adjusted by analog inputs.
#[derive(Debug, Clone)]
pub struct Brush {
    settings: BrushSettings,
    palette: ColorPalette,
    size_factor: f64,
    colour_index: f64,
}

impl Brush {
    /// Smallest brush at the start of the palette.
    pub fn new(settings: BrushSettings, palette: ColorPalette) -> Self {
        Self {
            settings,
            palette,
            size_factor: 0.0,
            colour_index: 0.0,
        }
    }

    /// Apply one frame of size and colour input.
    ///
    /// Only the input with the larger magnitude takes effect; on a tie the
    /// colour input wins. Size moves by `size_input * dt` and is clamped to
    /// `[0, 1]`. Colour moves by `colour_input * dt * colour_change_speed`
    /// and wraps around the palette.
    pub fn adjust(&mut self, size_input: f64, colour_input: f64, dt: f64) {
        if size_input.abs() > colour_input.abs() {
            self.size_factor = (self.size_factor + size_input * dt).clamp(0.0, 1.0);
        } else if colour_input != 0.0 {
            self.colour_index =
                wrap_unit(self.colour_index + colour_input * dt * self.settings.colour_change_speed);
        }
    }

    /// Size in `[0, 1]`.
    pub fn size_factor(&self) -> f64 {
        self.size_factor
    }

    /// Set the size, clamped to `[0, 1]`.
    pub fn set_size_factor(&mut self, factor: f64) {
        self.size_factor = factor.clamp(0.0, 1.0);
    }

    /// Palette position in `[0, 1)`.
    pub fn colour_index(&self) -> f64 {
        self.colour_index
    }

    /// Set the palette position, wrapped into `[0, 1)`.
    pub fn set_colour_index(&mut self, index: f64) {
        self.colour_index = wrap_unit(index);
    }

    /// Current stroke width.
    pub fn width(&self) -> f64 {
        let s = &self.settings;
        s.width_min + (s.width_max - s.width_min) * self.size_factor
    }

    /// Current colour.
    pub fn color(&self) -> Rgba {
        self.palette.sample(self.colour_index)
    }

    /// Settings in use.
    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }
}

/// What a [`CaptureSession::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Not painting.
    Idle,
    /// A new stroke was opened and its first cross-section placed.
    Started {
        /// Name of the new stroke.
        name: String,
    },
    /// The open stroke grew by one cross-section.
    Added,
    /// The open stroke's last cross-section followed the tip.
    Moved,
    /// The open stroke was closed and filed.
    Finished {
        /// Name of the closed stroke.
        name: String,
        /// Time the paint button was released.
        end_time: f64,
    },
}

/// A finished stroke's live-built mesh.
#[derive(Debug, Clone)]
pub struct CapturedStroke {
    /// Display name, `Stroke_001` for the first.
    pub name: String,
    /// Ribbon built while drawing.
    pub mesh: RibbonMesh,
}

#[derive(Debug)]
struct ActiveStroke {
    name: String,
    record: StrokeRecord,
    ribbon: IncrementalRibbonBuilder,
}

/// Captures strokes from a live pose stream.
#[derive(Debug)]
pub struct CaptureSession {
    brush: Brush,
    strokes: StrokeCollection,
    captured: Vec<CapturedStroke>,
    active: Option<ActiveStroke>,
    next_index: usize,
}

impl CaptureSession {
    /// Session with a brush built from `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_brush(Brush::new(
            settings.brush.clone(),
            ColorPalette::from(&settings.palette),
        ))
    }

    /// Session using `brush`.
    pub fn with_brush(brush: Brush) -> Self {
        Self {
            brush,
            strokes: StrokeCollection::new(),
            captured: Vec::new(),
            active: None,
            next_index: 1,
        }
    }

    /// The brush.
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// The brush, for adjusting size and colour.
    pub fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }

    /// Whether a stroke is open.
    pub fn is_painting(&self) -> bool {
        self.active.is_some()
    }

    /// Finished strokes.
    pub fn strokes(&self) -> &StrokeCollection {
        &self.strokes
    }

    /// Meshes of the finished strokes, parallel to [`strokes`](Self::strokes).
    pub fn captured(&self) -> &[CapturedStroke] {
        &self.captured
    }

    /// Ribbon of the open stroke.
    pub fn live_mesh(&self) -> Option<&RibbonMesh> {
        self.active.as_ref().map(|a| a.ribbon.mesh())
    }

    /// Samples of the open stroke.
    pub fn live_record(&self) -> Option<&StrokeRecord> {
        self.active.as_ref().map(|a| &a.record)
    }

    /// Name the next stroke will get.
    pub fn next_stroke_name(&self) -> String {
        format!("Stroke_{:03}", self.next_index)
    }

    /// Process one frame.
    ///
    /// Pressing paint opens a stroke, releasing it files the stroke. While
    /// a stroke is open the tip either commits a new cross-section or drags
    /// the last one, and every frame records a sample.
    pub fn tick(&mut self, pose: &Pose, time: f64, painting: bool) -> CaptureEvent {
        let mut event = CaptureEvent::Idle;

        if painting && self.active.is_none() {
            let name = self.next_stroke_name();
            self.next_index += 1;
            log::debug!("begin {}", name);
            self.active = Some(ActiveStroke {
                name: name.clone(),
                record: StrokeRecord::new(),
                ribbon: IncrementalRibbonBuilder::new(self.brush.settings.min_segment_size),
            });
            event = CaptureEvent::Started { name };
        } else if !painting {
            if let Some(done) = self.active.take() {
                log::debug!("end {} with {} samples", done.name, done.record.len());
                self.strokes.append(done.record);
                self.captured.push(CapturedStroke {
                    name: done.name.clone(),
                    mesh: done.ribbon.into_mesh(),
                });
                return CaptureEvent::Finished {
                    name: done.name,
                    end_time: time,
                };
            }
        }

        let width = self.brush.width();
        let color = self.brush.color();
        if let Some(active) = self.active.as_mut() {
            let update = active
                .ribbon
                .push_pose(pose.position, up_vector(&pose.orientation), width * 0.5);
            if event == CaptureEvent::Idle {
                event = match update {
                    SegmentUpdate::Added => CaptureEvent::Added,
                    SegmentUpdate::Moved => CaptureEvent::Moved,
                };
            }
            active
                .record
                .push(StrokeSample::new(time, pose.position, pose.orientation, width, color));
        }
        event
    }

    /// Remove the most recent finished stroke.
    ///
    /// Does nothing while painting. The name counter steps back so the next
    /// stroke reuses the name.
    pub fn undo(&mut self) -> Option<StrokeRecord> {
        if self.active.is_some() {
            return None;
        }
        let record = self.strokes.remove_last()?;
        self.captured.pop();
        self.next_index = self.next_index.saturating_sub(1).max(1);
        log::info!("last stroke undone");
        Some(record)
    }

    /// Remove every finished stroke and restart naming at `Stroke_001`.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.captured.clear();
        self.next_index = 1;
        log::info!("all strokes cleared");
    }

    /// Write the finished strokes to `path` (`.csv` appended) in the background.
    pub fn save(&self, path: impl Into<PathBuf>) -> Result<BackgroundTask<()>> {
        save_drawing(self.strokes.clone(), path)
    }
}
