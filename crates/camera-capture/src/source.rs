//! Frame source with read retry and re-open support

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{CameraBackend, CameraConfig, CameraError, CaptureDevice, Frame};

/// Grab attempts per `read_frame` call
pub const READ_ATTEMPTS: u32 = 3;

/// Delay between grab attempts
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Camera frame source.
///
/// Owns the device handle exclusively. The handle is dropped on `close`
/// and replaced on `reopen`.
pub struct Camera<B: CameraBackend> {
    backend: B,
    config: CameraConfig,
    device: Option<B::Device>,
    sequence: u32,
    epoch: Instant,
}

impl<B: CameraBackend> Camera<B> {
    /// Open the camera and verify it is actually streaming
    pub async fn open(backend: B, config: CameraConfig) -> Result<Self, CameraError> {
        let mut camera = Self {
            backend,
            config,
            device: None,
            sequence: 0,
            epoch: Instant::now(),
        };
        camera.reopen().await?;
        Ok(camera)
    }

    /// Close the current device (if any) and open a fresh one.
    ///
    /// A device that opens but returns an empty validation frame is
    /// rejected, e.g. when another process holds the camera.
    pub async fn reopen(&mut self) -> Result<(), CameraError> {
        self.close();

        info!(
            "Opening camera {} ({}x{} @ {}fps)",
            self.config.device_index, self.config.width, self.config.height, self.config.fps
        );
        let mut device = self.backend.open(&self.config)?;

        if self.config.warmup_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.warmup_ms)).await;
        }

        match device.grab() {
            Ok(Some(frame)) if !frame.is_empty() => {
                info!("Camera ready, frame size {}x{}", frame.width, frame.height);
            }
            Ok(_) => {
                return Err(CameraError::Open(
                    "validation read returned an empty frame".to_string(),
                ));
            }
            Err(e) => {
                return Err(CameraError::Open(format!("validation read failed: {}", e)));
            }
        }

        self.device = Some(device);
        Ok(())
    }

    /// Read the next frame, retrying transient failures.
    pub async fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::NotOpen)?;

        for attempt in 1..=READ_ATTEMPTS {
            match device.grab() {
                Ok(Some(mut frame)) if !frame.is_empty() => {
                    self.sequence = self.sequence.wrapping_add(1);
                    frame.sequence = self.sequence;
                    frame.timestamp_ns = self.epoch.elapsed().as_nanos() as u64;
                    return Ok(frame);
                }
                Ok(_) => debug!("Empty frame (attempt {}/{})", attempt, READ_ATTEMPTS),
                Err(e) => debug!("Grab failed (attempt {}/{}): {}", attempt, READ_ATTEMPTS, e),
            }

            if attempt < READ_ATTEMPTS {
                tokio::time::sleep(READ_RETRY_DELAY).await;
            }
        }

        warn!("No frame after {} attempts", READ_ATTEMPTS);
        Err(CameraError::ReadFailed {
            attempts: READ_ATTEMPTS,
        })
    }

    /// Release the device handle
    pub fn close(&mut self) {
        if self.device.take().is_some() {
            info!("Camera {} closed", self.config.device_index);
        }
    }

    /// Check if a device handle is held
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Get the camera configuration
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockRead};

    fn config() -> CameraConfig {
        CameraConfig {
            width: 64,
            height: 48,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_validates_stream() {
        let backend = MockBackend::new(64, 48);
        let camera = Camera::open(backend.clone(), config()).await.unwrap();
        assert!(camera.is_open());
        assert_eq!(backend.open_count(), 1);
        assert_eq!(backend.grab_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_rejects_empty_validation_frame() {
        let backend = MockBackend::new(64, 48);
        backend.push(MockRead::Empty);
        let result = Camera::open(backend, config()).await;
        assert!(matches!(result, Err(CameraError::Open(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_propagates_device_unavailable() {
        let backend = MockBackend::new(64, 48);
        backend.fail_next_opens(1);
        let result = Camera::open(backend, config()).await;
        assert!(matches!(result, Err(CameraError::Open(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_retries_then_succeeds() {
        let backend = MockBackend::new(64, 48);
        let mut camera = Camera::open(backend.clone(), config()).await.unwrap();

        backend.push(MockRead::Missing);
        backend.push(MockRead::Error);
        let frame = camera.read_frame().await.unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.sequence, 1);
        assert_eq!(backend.grab_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_gives_up_after_three_attempts() {
        let backend = MockBackend::new(64, 48);
        let mut camera = Camera::open(backend.clone(), config()).await.unwrap();

        backend.push(MockRead::Missing);
        backend.push(MockRead::Empty);
        backend.push(MockRead::Missing);
        backend.push(MockRead::Frame(Frame::blank(64, 48)));

        let start = tokio::time::Instant::now();
        let result = camera.read_frame().await;
        assert!(matches!(result, Err(CameraError::ReadFailed { attempts: 3 })));
        assert_eq!(start.elapsed(), READ_RETRY_DELAY * 2);
        assert_eq!(backend.remaining(), 1);

        // Next read picks up the queued frame
        assert!(camera.read_frame().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_camera_reports_not_open() {
        let backend = MockBackend::new(64, 48);
        let mut camera = Camera::open(backend.clone(), config()).await.unwrap();
        camera.close();
        assert!(!camera.is_open());
        assert!(matches!(camera.read_frame().await, Err(CameraError::NotOpen)));

        camera.reopen().await.unwrap();
        assert_eq!(backend.open_count(), 2);
        assert!(camera.read_frame().await.is_ok());
    }
}
