//! OpenCV `VideoCapture` backend

use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, warn};

use crate::{CameraBackend, CameraConfig, CameraError, CaptureDevice, Frame};

fn device_err(e: opencv::Error) -> CameraError {
    CameraError::Device(e.to_string())
}

/// Opens local cameras through OpenCV
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvBackend;

impl CameraBackend for OpenCvBackend {
    type Device = OpenCvDevice;

    fn open(&self, config: &CameraConfig) -> Result<OpenCvDevice, CameraError> {
        let mut capture = VideoCapture::new(config.device_index, videoio::CAP_ANY)
            .map_err(|e| CameraError::Open(e.to_string()))?;

        if !capture.is_opened().map_err(|e| CameraError::Open(e.to_string()))? {
            return Err(CameraError::Open(format!(
                "device {} could not be opened",
                config.device_index
            )));
        }

        let mut properties = vec![
            (videoio::CAP_PROP_FRAME_WIDTH, config.width as f64),
            (videoio::CAP_PROP_FRAME_HEIGHT, config.height as f64),
            (videoio::CAP_PROP_FPS, config.fps as f64),
            (videoio::CAP_PROP_AUTOFOCUS, if config.autofocus { 1.0 } else { 0.0 }),
            // V4L2 convention: 3 = aperture priority (auto), 1 = manual
            (videoio::CAP_PROP_AUTO_EXPOSURE, if config.autoexposure { 3.0 } else { 1.0 }),
        ];
        if let Some(brightness) = config.brightness {
            properties.push((videoio::CAP_PROP_BRIGHTNESS, brightness));
        }
        if let Some(contrast) = config.contrast {
            properties.push((videoio::CAP_PROP_CONTRAST, contrast));
        }

        for (property, value) in properties {
            match capture.set(property, value) {
                Ok(true) => debug!("Camera property {} = {}", property, value),
                Ok(false) => warn!("Camera ignored property {} = {}", property, value),
                Err(e) => warn!("Failed to set camera property {}: {}", property, e),
            }
        }

        Ok(OpenCvDevice {
            capture,
            raw: Mat::default(),
        })
    }
}

/// Device handle wrapping an OpenCV `VideoCapture`
pub struct OpenCvDevice {
    capture: VideoCapture,
    raw: Mat,
}

impl CaptureDevice for OpenCvDevice {
    fn grab(&mut self) -> Result<Option<Frame>, CameraError> {
        if !self.capture.read(&mut self.raw).map_err(device_err)? || self.raw.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&self.raw, &mut rgb, imgproc::COLOR_BGR2RGB).map_err(device_err)?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb.data_bytes().map_err(device_err)?.to_vec();

        Ok(Some(Frame::new(data, width, height)))
    }
}

impl Drop for OpenCvDevice {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Failed to release camera: {}", e);
        }
    }
}
