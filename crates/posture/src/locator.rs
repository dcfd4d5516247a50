//! Face location with frontal-to-profile fallback

use camera_capture::Frame;
use image::GrayImage;
use imageproc::contrast::equalize_histogram;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::region::{select_largest, FaceRegion};
use crate::PostureError;

/// Multi-scale cascade parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// Minimum face edge in pixels
    pub min_size: u32,
    /// Maximum face edge in pixels (0 = unbounded)
    pub max_size: u32,
}

/// Pluggable cascade face detector.
///
/// Implementations return candidate boxes for a luminance image with no
/// ranking or completeness guarantee.
pub trait CascadeClassifier {
    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, PostureError>;
}

/// Which cascade produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorKind {
    Frontal,
    Profile,
}

/// Candidates found in one frame
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Candidates in detector order
    pub faces: Vec<FaceRegion>,
    /// Detector that produced `faces` (None when nothing was found)
    pub source: Option<DetectorKind>,
    /// The profile cascade ran on this frame; `faces` holds its output
    /// whenever it did
    pub profile_ran: bool,
}

impl Detection {
    /// The largest candidate
    pub fn largest(&self) -> Option<FaceRegion> {
        select_largest(&self.faces)
    }
}

/// Locates the subject's face using a frontal and a profile cascade
pub struct FaceLocator {
    frontal: Box<dyn CascadeClassifier>,
    profile: Box<dyn CascadeClassifier>,
    params: DetectionParams,
}

impl FaceLocator {
    pub fn new(
        frontal: Box<dyn CascadeClassifier>,
        profile: Box<dyn CascadeClassifier>,
        params: DetectionParams,
    ) -> Self {
        Self {
            frontal,
            profile,
            params,
        }
    }

    /// Luminance conversion plus histogram equalization
    pub fn prepare(frame: &Frame) -> GrayImage {
        equalize_histogram(&frame.to_luma())
    }

    /// Detect faces in a frame. Never fails; backend errors count as no faces.
    pub fn detect(&mut self, frame: &Frame) -> Detection {
        let gray = Self::prepare(frame);
        self.detect_prepared(&gray)
    }

    /// Detect faces in an already prepared luminance image
    pub fn detect_prepared(&mut self, gray: &GrayImage) -> Detection {
        let faces = run_cascade(self.frontal.as_mut(), DetectorKind::Frontal, gray, &self.params);
        if !faces.is_empty() {
            return Detection {
                faces,
                source: Some(DetectorKind::Frontal),
                profile_ran: false,
            };
        }

        let faces = run_cascade(self.profile.as_mut(), DetectorKind::Profile, gray, &self.params);
        let source = (!faces.is_empty()).then_some(DetectorKind::Profile);
        Detection {
            faces,
            source,
            profile_ran: true,
        }
    }

    /// Run only the profile cascade
    pub fn detect_profile(&mut self, gray: &GrayImage) -> Vec<FaceRegion> {
        run_cascade(self.profile.as_mut(), DetectorKind::Profile, gray, &self.params)
    }
}

fn run_cascade(
    classifier: &mut dyn CascadeClassifier,
    kind: DetectorKind,
    gray: &GrayImage,
    params: &DetectionParams,
) -> Vec<FaceRegion> {
    match classifier.detect(gray, params) {
        Ok(faces) => {
            let faces: Vec<FaceRegion> = faces.into_iter().filter(|f| !f.is_empty()).collect();
            debug!("{:?} cascade found {} candidate(s)", kind, faces.len());
            faces
        }
        Err(e) => {
            warn!("{:?} cascade failed, treating as no faces: {}", kind, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticCascade;

    fn params() -> DetectionParams {
        DetectionParams {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 30,
            max_size: 0,
        }
    }

    #[test]
    fn test_frontal_hit_skips_profile() {
        let frontal = StaticCascade::new(vec![FaceRegion::new(10, 10, 40, 40)]);
        let profile = StaticCascade::new(vec![FaceRegion::new(0, 0, 90, 90)]);
        let profile_calls = profile.calls();
        let mut locator = FaceLocator::new(Box::new(frontal), Box::new(profile), params());

        let detection = locator.detect(&Frame::blank(64, 64));
        assert_eq!(detection.source, Some(DetectorKind::Frontal));
        assert_eq!(detection.largest(), Some(FaceRegion::new(10, 10, 40, 40)));
        assert_eq!(profile_calls.get(), 0);
        assert!(!detection.profile_ran);
    }

    #[test]
    fn test_falls_back_to_profile() {
        let frontal = StaticCascade::empty();
        let profile = StaticCascade::new(vec![
            FaceRegion::new(0, 0, 20, 20),
            FaceRegion::new(5, 5, 30, 30),
        ]);
        let mut locator = FaceLocator::new(Box::new(frontal), Box::new(profile), params());

        let detection = locator.detect(&Frame::blank(64, 64));
        assert_eq!(detection.source, Some(DetectorKind::Profile));
        assert_eq!(detection.faces.len(), 2);
        assert_eq!(detection.largest(), Some(FaceRegion::new(5, 5, 30, 30)));
    }

    #[test]
    fn test_nothing_found() {
        let mut locator = FaceLocator::new(
            Box::new(StaticCascade::empty()),
            Box::new(StaticCascade::empty()),
            params(),
        );
        let detection = locator.detect(&Frame::blank(64, 64));
        assert!(detection.faces.is_empty());
        assert_eq!(detection.source, None);
        assert_eq!(detection.largest(), None);
        assert!(detection.profile_ran);
    }

    #[test]
    fn test_backend_error_is_not_fatal() {
        let profile = StaticCascade::new(vec![FaceRegion::new(1, 1, 20, 20)]);
        let mut locator =
            FaceLocator::new(Box::new(StaticCascade::failing()), Box::new(profile), params());
        let detection = locator.detect(&Frame::blank(64, 64));
        assert_eq!(detection.source, Some(DetectorKind::Profile));
    }

    #[test]
    fn test_degenerate_candidates_dropped() {
        let frontal = StaticCascade::new(vec![FaceRegion::new(1, 1, 0, 20)]);
        let mut locator =
            FaceLocator::new(Box::new(frontal), Box::new(StaticCascade::empty()), params());
        let detection = locator.detect(&Frame::blank(64, 64));
        assert!(detection.faces.is_empty());
    }

    #[test]
    fn test_cascade_sees_equalized_luma() {
        let frontal = StaticCascade::empty();
        let seen = frontal.last_size();
        let mut locator =
            FaceLocator::new(Box::new(frontal), Box::new(StaticCascade::empty()), params());
        locator.detect(&Frame::blank(32, 24));
        assert_eq!(seen.get(), Some((32, 24)));
    }
}
