//! Capture backend traits

use crate::{CameraConfig, CameraError, Frame};

/// An opened capture device. Dropping it releases the device.
pub trait CaptureDevice {
    /// Grab the next frame.
    ///
    /// `Ok(None)` means the device is open but delivered nothing this time.
    fn grab(&mut self) -> Result<Option<Frame>, CameraError>;
}

/// Opens capture devices with a given configuration
pub trait CameraBackend {
    type Device: CaptureDevice;

    /// Open and configure a device. Fails if the device cannot be opened.
    fn open(&self, config: &CameraConfig) -> Result<Self::Device, CameraError>;
}
