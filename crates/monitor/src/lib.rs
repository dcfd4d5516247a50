//! Posture Monitor
//!
//! Wires the frame source, posture analyzer and alert gate into a single
//! cooperative acquisition loop.

pub mod acquisition;
pub mod config;
pub mod display;
pub mod logging;
pub mod shutdown;

pub use crate::acquisition::{AcquisitionLoop, CameraFaultState, Iteration, LoopStats};
pub use crate::config::{AcquisitionConfig, AppConfig, ConfigError, DisplayConfig, LoggingConfig};
pub use crate::display::{render, DisplaySink, NullDisplay, Overlay};
pub use crate::logging::init_logging;
