//! Geometric posture classification from a face bounding box

use serde::{Deserialize, Serialize};

use crate::config::DetectorConfig;
use crate::region::FaceRegion;
use crate::signals::{
    HeadPosition, LateralPosture, PostureSignals, SideViewPosture, Signal, SitDistance, SitHeight,
};

/// Classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureThresholds {
    /// Face area ratio below which the user is too far
    pub min_face_ratio: f64,
    /// Face area ratio above which the user is too near
    pub max_face_ratio: f64,
    /// Face top / frame height below which the user sits too high
    pub min_height_ratio: f64,
    /// Face top / frame height above which the user sits too low
    pub max_height_ratio: f64,
    /// Aspect ratio band outside of which the head counts as tilted
    pub tilt_min_aspect: f64,
    pub tilt_max_aspect: f64,
    /// Lean factors comparing horizontal to vertical center offset
    pub forward_lean_factor: f64,
    pub back_lean_factor: f64,
    /// Expected face height as a fraction of frame height
    pub expected_face_height: f64,
    /// Fraction of the expected face height below which a hunch is suspected
    pub hunch_tolerance: f64,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self {
            min_face_ratio: 0.05,
            max_face_ratio: 0.15,
            min_height_ratio: 0.3,
            max_height_ratio: 0.7,
            tilt_min_aspect: 0.7,
            tilt_max_aspect: 1.3,
            forward_lean_factor: 1.5,
            back_lean_factor: 0.5,
            expected_face_height: 0.15,
            hunch_tolerance: 0.8,
        }
    }
}

impl From<&DetectorConfig> for PostureThresholds {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            min_face_ratio: config.min_sit_distance,
            max_face_ratio: config.max_sit_distance,
            min_height_ratio: config.min_sit_height,
            max_height_ratio: config.max_sit_height,
            ..Default::default()
        }
    }
}

/// Per-frame classification outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureResult {
    /// Whether a face was found
    pub has_person: bool,

    /// Signals; absent when no person was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<PostureSignals>,

    /// True iff all signals are normal (also true with no person)
    pub is_correct: bool,

    /// Composite of the non-normal signal descriptions
    pub message: String,

    /// Side-view silhouette verdict, when that check ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_view: Option<SideViewPosture>,
}

impl PostureResult {
    /// Result for a frame without a detected face
    pub fn no_person() -> Self {
        Self {
            has_person: false,
            signals: None,
            is_correct: true,
            message: String::new(),
            side_view: None,
        }
    }

    /// Result for a classified face
    pub fn from_signals(signals: PostureSignals) -> Self {
        Self {
            has_person: true,
            is_correct: signals.is_correct(),
            message: signals.deviations().join("; "),
            signals: Some(signals),
            side_view: None,
        }
    }

    /// Attach the side-view verdict
    pub fn with_side_view(self, side_view: SideViewPosture) -> Self {
        let message = if side_view.is_normal() {
            self.message
        } else if self.message.is_empty() {
            side_view.description().to_string()
        } else {
            format!("{}; {}", self.message, side_view.description())
        };
        Self {
            message,
            side_view: Some(side_view),
            ..self
        }
    }

    /// Whether this frame warrants an alert.
    ///
    /// Never true without a person, whatever `is_correct` says.
    pub fn needs_alert(&self) -> bool {
        self.has_person
            && (!self.is_correct || self.side_view == Some(SideViewPosture::Hunchback))
    }

    /// Short status line for logs and overlays
    pub fn summary(&self) -> String {
        if !self.has_person {
            "no person detected".to_string()
        } else if self.message.is_empty() {
            "posture correct".to_string()
        } else {
            self.message.clone()
        }
    }
}

/// Stateless posture classifier
#[derive(Debug, Clone, Default)]
pub struct PostureClassifier {
    thresholds: PostureThresholds,
}

impl PostureClassifier {
    pub fn new(thresholds: PostureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PostureThresholds {
        &self.thresholds
    }

    /// Classify the selected face (if any) within a `frame_width` x `frame_height` frame
    pub fn classify(
        &self,
        face: Option<FaceRegion>,
        frame_width: u32,
        frame_height: u32,
    ) -> PostureResult {
        let face = match face {
            Some(face) if !face.is_empty() && frame_width > 0 && frame_height > 0 => face,
            _ => return PostureResult::no_person(),
        };

        let frame_area = f64::from(frame_width) * f64::from(frame_height);

        PostureResult::from_signals(PostureSignals {
            head: self.head_position(&face, frame_height),
            distance: self.sit_distance(face.area() as f64 / frame_area),
            height: self.sit_height(face.y as f64 / f64::from(frame_height)),
            lateral: self.lateral_posture(&face, frame_width, frame_height),
        })
    }

    /// Thirds of the frame height, overridden by tilt
    pub fn head_position(&self, face: &FaceRegion, frame_height: u32) -> HeadPosition {
        let aspect = face.aspect_ratio();
        if aspect < self.thresholds.tilt_min_aspect || aspect > self.thresholds.tilt_max_aspect {
            return HeadPosition::Tilted;
        }

        let (_, center_y) = face.center();
        let frame_height = f64::from(frame_height);
        if center_y < frame_height / 3.0 {
            HeadPosition::TooHigh
        } else if center_y > frame_height * 2.0 / 3.0 {
            HeadPosition::TooLow
        } else {
            HeadPosition::Normal
        }
    }

    /// Bounds are inclusive on the normal side
    pub fn sit_distance(&self, face_ratio: f64) -> SitDistance {
        if face_ratio < self.thresholds.min_face_ratio {
            SitDistance::TooFar
        } else if face_ratio > self.thresholds.max_face_ratio {
            SitDistance::TooNear
        } else {
            SitDistance::Normal
        }
    }

    pub fn sit_height(&self, height_ratio: f64) -> SitHeight {
        if height_ratio < self.thresholds.min_height_ratio {
            SitHeight::TooHigh
        } else if height_ratio > self.thresholds.max_height_ratio {
            SitHeight::TooLow
        } else {
            SitHeight::Normal
        }
    }

    /// Offset of the face center from the frame center, overridden by the
    /// short-face hunch proxy.
    pub fn lateral_posture(
        &self,
        face: &FaceRegion,
        frame_width: u32,
        frame_height: u32,
    ) -> LateralPosture {
        let expected_height = self.thresholds.expected_face_height * f64::from(frame_height);
        if (face.height as f64) < self.thresholds.hunch_tolerance * expected_height {
            return LateralPosture::PossibleHunch;
        }

        let (center_x, center_y) = face.center();
        let dx = (center_x - f64::from(frame_width) / 2.0).abs();
        let dy = (center_y - f64::from(frame_height) / 2.0).abs();

        if dx > dy * self.thresholds.forward_lean_factor {
            LateralPosture::LeaningForward
        } else if dx < dy * self.thresholds.back_lean_factor {
            LateralPosture::LeaningBack
        } else {
            LateralPosture::Normal
        }
    }
}
