#![warn(missing_docs)]

//! Stroke data model for vstroke.
//!
//! A drawing is a [`StrokeCollection`] of [`StrokeRecord`]s, each an ordered
//! run of [`StrokeSample`] poses. The [`codec`] module reads and writes the
//! comma-separated stroke file format.
//!
//! # Example
//!
//! ```no_run
//! use vstroke_model::codec;
//!
//! let strokes = codec::decode_path("drawings/sketch.csv")?;
//! println!("{} strokes, average at {}", strokes.len(), strokes.average());
//! codec::encode_path(&strokes, "drawings/sketch_copy.csv")?;
//! # Ok::<(), vstroke_model::CodecError>(())
//! ```

pub mod codec;
pub mod collection;
pub mod error;
pub mod record;
pub mod sample;

pub use collection::StrokeCollection;
pub use error::{CodecError, Result};
pub use record::StrokeRecord;
pub use sample::StrokeSample;

pub use vstroke_math;
