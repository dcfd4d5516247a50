//! Detector configuration

use serde::{Deserialize, Serialize};

use crate::locator::DetectionParams;
use crate::PostureError;

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Cascade pyramid scale step
    pub scale_factor: f64,

    /// Neighbouring hits required to keep a candidate
    pub min_neighbors: i32,

    /// Smallest face edge in pixels
    pub min_face_size: u32,

    /// Largest face edge in pixels (0 = unbounded)
    pub max_face_size: u32,

    /// Run the separate profile-face side-view check
    pub enable_side_view: bool,

    /// Run the silhouette hunchback heuristic on the side view
    pub enable_hunchback_detection: bool,

    /// Contour centroid angle (degrees) above which a hunchback is reported
    pub hunchback_angle_threshold: f64,

    /// Face area / frame area below which the user sits too far away
    pub min_sit_distance: f64,

    /// Face area / frame area above which the user sits too close
    pub max_sit_distance: f64,

    /// Face top / frame height below which the user sits too high
    pub min_sit_height: f64,

    /// Face top / frame height above which the user sits too low
    pub max_sit_height: f64,

    /// Model paths
    pub frontal_model_path: String,
    pub profile_model_path: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 30,
            max_face_size: 0,
            enable_side_view: false,
            enable_hunchback_detection: false,
            hunchback_angle_threshold: 45.0,
            min_sit_distance: 0.05,
            max_sit_distance: 0.15,
            min_sit_height: 0.3,
            max_sit_height: 0.7,
            frontal_model_path: "models/haarcascade_frontalface_default.xml".to_string(),
            profile_model_path: "models/haarcascade_profileface.xml".to_string(),
        }
    }
}

impl DetectorConfig {
    /// Cascade parameters shared by the frontal and profile detectors
    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors,
            min_size: self.min_face_size,
            max_size: self.max_face_size,
        }
    }

    /// Whether the hunchback side-view check runs
    pub fn side_view_enabled(&self) -> bool {
        self.enable_side_view && self.enable_hunchback_detection
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), PostureError> {
        if self.scale_factor <= 1.0 {
            return Err(PostureError::InvalidConfig(format!(
                "scale_factor must be > 1.0, got {}",
                self.scale_factor
            )));
        }
        if self.min_neighbors < 0 {
            return Err(PostureError::InvalidConfig(format!(
                "min_neighbors must be >= 0, got {}",
                self.min_neighbors
            )));
        }
        if self.max_face_size != 0 && self.max_face_size < self.min_face_size {
            return Err(PostureError::InvalidConfig(format!(
                "max_face_size {} is smaller than min_face_size {}",
                self.max_face_size, self.min_face_size
            )));
        }
        if !(0.0..=1.0).contains(&self.min_sit_distance)
            || !(0.0..=1.0).contains(&self.max_sit_distance)
            || self.min_sit_distance > self.max_sit_distance
        {
            return Err(PostureError::InvalidConfig(format!(
                "sit distance bounds must satisfy 0 <= min <= max <= 1, got {}..{}",
                self.min_sit_distance, self.max_sit_distance
            )));
        }
        if !(0.0..=1.0).contains(&self.min_sit_height)
            || !(0.0..=1.0).contains(&self.max_sit_height)
            || self.min_sit_height > self.max_sit_height
        {
            return Err(PostureError::InvalidConfig(format!(
                "sit height bounds must satisfy 0 <= min <= max <= 1, got {}..{}",
                self.min_sit_height, self.max_sit_height
            )));
        }
        Ok(())
    }
}
