#![warn(missing_docs)]

//! Ribbon meshes for vstroke.
//!
//! A stroke is rendered as a double-sided quad strip that follows its
//! centerline, extruded along each sample's local up axis. Two builders
//! produce the same geometry:
//!
//! * [`IncrementalRibbonBuilder`] grows the mesh tick by tick while a stroke
//!   is being drawn.
//! * [`BatchRibbonBuilder`] rebuilds it from a finished stroke, optionally
//!   skipping samples to produce coarser levels of detail.
//!
//! # Example
//!
//! ```ignore
//! use vstroke_ribbon::BatchRibbonBuilder;
//!
//! let builder = BatchRibbonBuilder::new(0.005);
//! for lod in builder.build_lods(&record, 3) {
//!     println!("level {}: {} triangles", lod.level, lod.mesh.num_triangles());
//! }
//! ```

pub mod batch;
pub mod incremental;
pub mod mesh;

pub use batch::{stride_for_level, BatchRibbonBuilder, LodMesh};
pub use incremental::{IncrementalRibbonBuilder, SegmentUpdate};
pub use mesh::{RibbonMesh, TriangleMesh};

/// Default minimum distance between consecutive cross-sections.
pub const DEFAULT_MIN_SEGMENT_SIZE: f64 = 0.005;
