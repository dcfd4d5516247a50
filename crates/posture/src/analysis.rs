//! Per-frame posture analysis

use camera_capture::Frame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{PostureClassifier, PostureResult, PostureThresholds};
use crate::config::DetectorConfig;
use crate::locator::{CascadeClassifier, DetectorKind, FaceLocator};
use crate::region::{select_largest, FaceRegion};
use crate::side_view::detect_hunchback;
use crate::signals::SideViewPosture;

/// Complete analysis of one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureAnalysis {
    /// Classification result
    pub result: PostureResult,

    /// Selected face (largest candidate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceRegion>,

    /// Detector that found `face`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DetectorKind>,

    /// Number of candidates the detector returned
    pub candidates: usize,

    /// Profile face used by the side-view check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_face: Option<FaceRegion>,

    /// Frame dimensions
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Face location, classification and the optional side-view check
pub struct PostureAnalyzer {
    locator: FaceLocator,
    classifier: PostureClassifier,
    hunchback_threshold: Option<f64>,
}

impl PostureAnalyzer {
    /// Create an analyzer from detector configuration and the two cascades
    pub fn new(
        config: &DetectorConfig,
        frontal: Box<dyn CascadeClassifier>,
        profile: Box<dyn CascadeClassifier>,
    ) -> Self {
        Self {
            locator: FaceLocator::new(frontal, profile, config.detection_params()),
            classifier: PostureClassifier::new(PostureThresholds::from(config)),
            hunchback_threshold: config
                .side_view_enabled()
                .then_some(config.hunchback_angle_threshold),
        }
    }

    /// Analyze a single frame
    pub fn analyze(&mut self, frame: &Frame) -> PostureAnalysis {
        let gray = FaceLocator::prepare(frame);
        let detection = self.locator.detect_prepared(&gray);
        let face = detection.largest();

        let mut result = self.classifier.classify(face, frame.width, frame.height);
        let mut profile_face = None;

        if let Some(threshold) = self.hunchback_threshold {
            // Reuse the fallback result, found or not
            profile_face = if detection.profile_ran {
                face
            } else {
                select_largest(&self.locator.detect_profile(&gray))
            };

            if let Some(profile) = profile_face {
                let side_view = if detect_hunchback(frame, profile, threshold) {
                    SideViewPosture::Hunchback
                } else {
                    SideViewPosture::Upright
                };
                debug!("Side view: {:?}", side_view);
                result = result.with_side_view(side_view);
            }
        }

        PostureAnalysis {
            result,
            face,
            source: detection.source,
            candidates: detection.faces.len(),
            profile_face,
            frame_width: frame.width,
            frame_height: frame.height,
        }
    }
}
