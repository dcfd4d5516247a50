//! Sitting Posture Analysis
//!
//! Geometric posture classification from a single detected face:
//! - Face location (frontal cascade with profile fallback)
//! - Head position, sit distance, sit height, lateral lean signals
//! - Optional side-view hunchback heuristic

pub mod analysis;
#[cfg(feature = "opencv")]
pub mod cascade;
pub mod classifier;
pub mod config;
pub mod locator;
pub mod mock;
pub mod region;
pub mod side_view;
pub mod signals;

pub use analysis::{PostureAnalysis, PostureAnalyzer};
pub use classifier::{PostureClassifier, PostureResult, PostureThresholds};
pub use config::DetectorConfig;
pub use locator::{CascadeClassifier, Detection, DetectionParams, DetectorKind, FaceLocator};
pub use region::{select_largest, FaceRegion};
pub use signals::{
    HeadPosition, LateralPosture, PostureSignals, SideViewPosture, Signal, SitDistance, SitHeight,
};

use thiserror::Error;

/// Posture error types
#[derive(Error, Debug)]
pub enum PostureError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),
}
