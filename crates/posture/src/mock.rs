//! Fixed-output cascade for testing without model files

use std::cell::Cell;
use std::rc::Rc;

use image::GrayImage;

use crate::locator::{CascadeClassifier, DetectionParams};
use crate::region::FaceRegion;
use crate::PostureError;

/// Cascade that returns the same candidates for every image
#[derive(Debug, Clone, Default)]
pub struct StaticCascade {
    faces: Vec<FaceRegion>,
    fail: bool,
    calls: Rc<Cell<u32>>,
    last_size: Rc<Cell<Option<(u32, u32)>>>,
}

impl StaticCascade {
    pub fn new(faces: Vec<FaceRegion>) -> Self {
        Self {
            faces,
            ..Default::default()
        }
    }

    /// Never finds anything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Always reports a detection error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Shared counter of `detect` calls
    pub fn calls(&self) -> Rc<Cell<u32>> {
        self.calls.clone()
    }

    /// Shared record of the last image size seen
    pub fn last_size(&self) -> Rc<Cell<Option<(u32, u32)>>> {
        self.last_size.clone()
    }
}

impl CascadeClassifier for StaticCascade {
    fn detect(
        &mut self,
        image: &GrayImage,
        _params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, PostureError> {
        self.calls.set(self.calls.get() + 1);
        self.last_size.set(Some(image.dimensions()));
        if self.fail {
            return Err(PostureError::Detection("static cascade failure".into()));
        }
        Ok(self.faces.clone())
    }
}
