//! # trackcheck
//!
//! Quality assessment and identity correction for multi-object tracking output.
//!
//! A tracking pipeline produces a flat table of per-frame detections. This crate
//! reconstructs per-track sequences from that table, computes continuity and
//! stability metrics, flags tracks that need operator attention, and applies
//! identifier merges across the whole detection history.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trackcheck_rs::{DetectionTable, RemapRequest, assessment};
//!
//! let table = DetectionTable::load("tracking_results.csv")?;
//! let reconstruction = assessment::reconstruct(&table.to_frames(), &Default::default());
//! let metrics = assessment::aggregate(&reconstruction)?;
//! println!("{metrics}");
//!
//! let outcome = trackcheck_rs::remap::apply_batch(&table, &[RemapRequest::new(9, 7)]);
//! outcome.table.save("tracking_results.csv")?;
//! ```

pub mod assessment;
pub mod error;
pub mod integration;
pub mod remap;
pub mod table;

pub use assessment::{
    AggregateMetrics, ClassifierThresholds, Reconstruction, ReconstructConfig, Track,
    TrackSummary,
};
pub use error::{Error, Result};
pub use integration::{Session, SessionConfig};
pub use remap::{BatchOutcome, RemapRequest};
pub use table::{BoundingBox, Detection, DetectionTable, Frame};
