//! OpenCV Haar cascade backend

use image::GrayImage;
use opencv::{
    core::{Mat, Rect, Size, Vector},
    objdetect,
    prelude::*,
};
use tracing::info;

use crate::locator::{CascadeClassifier, DetectionParams};
use crate::region::FaceRegion;
use crate::PostureError;

/// Haar cascade loaded from an OpenCV XML model
pub struct OpenCvCascade {
    classifier: objdetect::CascadeClassifier,
}

impl OpenCvCascade {
    /// Load a cascade model. An unreadable or empty model is an error.
    pub fn load(path: &str) -> Result<Self, PostureError> {
        let classifier = objdetect::CascadeClassifier::new(path)
            .map_err(|e| PostureError::ModelLoad(format!("{}: {}", path, e)))?;

        if classifier
            .empty()
            .map_err(|e| PostureError::ModelLoad(format!("{}: {}", path, e)))?
        {
            return Err(PostureError::ModelLoad(format!(
                "{}: model is missing or unreadable",
                path
            )));
        }

        info!("Loaded cascade model from {}", path);
        Ok(Self { classifier })
    }
}

impl CascadeClassifier for OpenCvCascade {
    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, PostureError> {
        let mat = Mat::new_rows_cols_with_data(
            image.height() as i32,
            image.width() as i32,
            image.as_raw().as_slice(),
        )
        .map_err(|e| PostureError::ImageProcessing(e.to_string()))?;

        let min = params.min_size as i32;
        let max = params.max_size as i32;
        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &*mat,
                &mut faces,
                params.scale_factor,
                params.min_neighbors,
                0,
                Size::new(min, min),
                Size::new(max, max),
            )
            .map_err(|e| PostureError::Detection(e.to_string()))?;

        Ok(faces
            .iter()
            .filter_map(|r| FaceRegion::from_signed(r.x, r.y, r.width, r.height))
            .collect())
    }
}
