#![warn(missing_docs)]

//! vstroke: freehand 3D strokes, from live capture to level-of-detail meshes.
//!
//! This crate ties the pieces together:
//!
//! * [`CaptureSession`] records strokes from a pose stream and builds their
//!   ribbons live.
//! * [`DrawingLoader`] decodes a saved drawing in the background and meshes
//!   one stroke per frame, at any number of LOD levels.
//! * [`export`] writes meshes as binary STL.
//!
//! Geometry, the data model and the file codec live in the re-exported
//! [`math`], [`model`] and [`ribbon`] crates.
//!
//! # Example
//!
//! ```no_run
//! use vstroke::{DrawingLoader, LoadState, QuantizedPalette, Settings};
//!
//! let settings = Settings::default();
//! let palette = QuantizedPalette::from_settings(&settings.palette);
//! let mut loader = DrawingLoader::new("drawings/sketch", settings.drawing);
//! loader.start_loading()?;
//! while !matches!(loader.tick(&palette), LoadState::Complete | LoadState::Error) {
//!     // render a frame
//! }
//! for stroke in loader.strokes() {
//!     println!("{}: material {}, {} LODs", stroke.name, stroke.material, stroke.lods.len());
//! }
//! # Ok::<(), vstroke::Error>(())
//! ```

pub mod capture;
pub mod error;
pub mod export;
pub mod loader;
pub mod palette;
pub mod settings;
pub mod task;

pub use capture::{Brush, CaptureEvent, CaptureSession, CapturedStroke, Pose};
pub use error::{Error, Result};
pub use loader::{build_all, build_stroke, save_drawing, BuiltStroke, DrawingLoader, LoadState};
pub use palette::{ColorPalette, MaterialResolver, QuantizedPalette};
pub use settings::{BrushSettings, DrawingSettings, PaletteSettings, Settings};
pub use task::BackgroundTask;

pub use vstroke_math as math;
pub use vstroke_model as model;
pub use vstroke_ribbon as ribbon;

pub use vstroke_model::{codec, StrokeCollection, StrokeRecord, StrokeSample};
pub use vstroke_ribbon::{BatchRibbonBuilder, IncrementalRibbonBuilder, LodMesh, RibbonMesh};
