//! Scripted capture backend for testing (no hardware required)

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::{CameraBackend, CameraConfig, CameraError, CaptureDevice, Frame};

/// One scripted result of `CaptureDevice::grab`
#[derive(Debug, Clone)]
pub enum MockRead {
    /// Deliver this frame
    Frame(Frame),
    /// Device delivered nothing
    Missing,
    /// Device delivered a structurally empty frame
    Empty,
    /// Device reported an error
    Error,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<MockRead>,
    width: u32,
    height: u32,
    opens: u32,
    grabs: u32,
    failing_opens: u32,
}

/// Mock backend. Clones share the same script and counters.
///
/// Once the script is exhausted every grab returns a blank frame.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a mock backend producing blank frames of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                width,
                height,
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a scripted read
    pub fn push(&self, read: MockRead) {
        self.state().script.push_back(read);
    }

    /// Queue `count` failed grabs
    pub fn push_failures(&self, count: usize) {
        let mut state = self.state();
        for _ in 0..count {
            state.script.push_back(MockRead::Missing);
        }
    }

    /// Make the next `count` open calls fail
    pub fn fail_next_opens(&self, count: u32) {
        self.state().failing_opens = count;
    }

    /// Number of successful opens
    pub fn open_count(&self) -> u32 {
        self.state().opens
    }

    /// Number of grab calls across all devices
    pub fn grab_count(&self) -> u32 {
        self.state().grabs
    }

    /// Scripted reads not yet consumed
    pub fn remaining(&self) -> usize {
        self.state().script.len()
    }
}

impl CameraBackend for MockBackend {
    type Device = MockDevice;

    fn open(&self, config: &CameraConfig) -> Result<MockDevice, CameraError> {
        let mut state = self.state();
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(CameraError::Open(format!(
                "mock device {} unavailable",
                config.device_index
            )));
        }
        state.opens += 1;
        debug!("Mock camera opened (open #{})", state.opens);
        Ok(MockDevice {
            state: self.state.clone(),
        })
    }
}

/// Device handle produced by [`MockBackend`]
#[derive(Debug)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl CaptureDevice for MockDevice {
    fn grab(&mut self) -> Result<Option<Frame>, CameraError> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.grabs += 1;
        match state.script.pop_front() {
            Some(MockRead::Frame(frame)) => Ok(Some(frame)),
            Some(MockRead::Missing) => Ok(None),
            Some(MockRead::Empty) => Ok(Some(Frame::new(Vec::new(), 0, 0))),
            Some(MockRead::Error) => Err(CameraError::Device("mock read error".into())),
            None => Ok(Some(Frame::blank(state.width, state.height))),
        }
    }
}
