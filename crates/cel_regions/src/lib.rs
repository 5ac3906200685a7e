//! # Cel Region Library
//!
//! Segments flat-colored character illustrations into regions, matches the
//! regions of a front view against a side view, estimates a 3D position for
//! every region and edits regions while keeping both views consistent.
//!
//! ## Core Features
//!
//! - **Segmentation**: 4-connected flood fill per color, with black line art
//!   absorbed into the nearest region
//! - **Boundaries**: Moore tracing into one closed, clockwise pixel loop
//! - **Matching**: Pluggable similarity metrics and mutual-best matching
//! - **Depth**: Fixed-point iteration that averages the closest points on the
//!   rays through linked regions
//! - **Editing**: Freehand, combine, divide and translate, driven by a small
//!   editor state machine
//! - **GeoJSON Export**: One polygon feature per region
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cel_regions::{Pipeline, View};
//!
//! let pipeline = Pipeline::builder().build();
//!
//! let front = image::open("front.png")?.to_rgb8();
//! let side = image::open("side.png")?.to_rgb8();
//! let session = pipeline.process_images(&front, &side)?;
//!
//! session.save_frame_geojson(View::Front, "front.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Editing
//!
//! ```rust,no_run
//! use cel_regions::{EditMode, Pipeline, RegionEditor, Vec2, View};
//!
//! let front = image::open("front.png")?.to_rgb8();
//! let side = image::open("side.png")?.to_rgb8();
//! let mut session = Pipeline::builder().build().process_images(&front, &side)?;
//!
//! let mut editor = RegionEditor::new(session.config().brush_radius);
//! editor.select(&session, View::Front, 0)?;
//! editor.begin(&session, EditMode::Divide)?;
//! editor.paint(Vec2::new(10.0, 0.0))?;
//! editor.paint(Vec2::new(10.0, 40.0))?;
//! let outcome = editor.commit(&mut session)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod algorithms;
pub mod config;
pub mod edit;
pub mod error;
pub mod frame;
pub mod interpolation;
pub mod io;
pub mod link;
pub mod pipeline;
pub mod region;
pub mod session;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use cel_raster::{Grid, IVec2, Rgb, Rgba, Vec2, Vec3};
pub use config::{SessionConfig, SimilarityKind};
pub use edit::{EditMode, EditOutcome, EditorState, RegionEditor, ScribbleBrush};
pub use error::{RegionError, Result};
pub use frame::Frame;
pub use interpolation::InterpolatedOutline;
pub use io::frame_to_geojson;
pub use link::{LinkRecord, LinkTable};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use region::Region;
pub use session::Session;
pub use traits::*;
pub use types::{BoundingBox, Line, LinkId, RegionId, View, ViewRotation};
