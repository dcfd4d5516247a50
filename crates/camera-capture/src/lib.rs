//! Camera Capture Library for Posture Monitoring
//!
//! Provides a frame source on top of a pluggable capture backend:
//! - Device configuration and validation read on open
//! - Bounded read retry for transient capture failures
//! - Close / re-open for the acquisition loop's reconnect policy
//!
//! The OpenCV `VideoCapture` backend is available behind the `opencv` feature.

pub mod device;
pub mod frame;
pub mod mock;
#[cfg(feature = "opencv")]
pub mod opencv_backend;
pub mod source;

pub use device::{CameraBackend, CaptureDevice};
pub use frame::Frame;
pub use source::{Camera, READ_ATTEMPTS, READ_RETRY_DELAY};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Failed to read frame after {attempts} attempts")]
    ReadFailed { attempts: u32 },

    #[error("Camera not opened")]
    NotOpen,

    #[error("Device error: {0}")]
    Device(String),
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture device index (0 = first camera)
    pub device_index: i32,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Enable autofocus
    pub autofocus: bool,
    /// Enable automatic exposure
    pub autoexposure: bool,
    /// Brightness override (device default when unset)
    pub brightness: Option<f64>,
    /// Contrast override (device default when unset)
    pub contrast: Option<f64>,
    /// Settle time between opening the device and the validation read (ms)
    pub warmup_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30,
            autofocus: true,
            autoexposure: true,
            brightness: None,
            contrast: None,
            warmup_ms: 2000,
        }
    }
}

impl CameraConfig {
    /// Delay between loop iterations that approximates the target frame rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}
