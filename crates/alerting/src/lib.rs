//! Alerting System
//!
//! Forwards posture alerts to a notification sink, at most once per
//! configured interval.

mod gate;
mod notifier;

pub use gate::AlertGate;
pub use notifier::{ChannelNotifier, LogNotifier, Notifier};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Forward alerts at all
    pub enable: bool,
    /// Minimum seconds between two forwarded alerts
    #[serde(rename = "interval")]
    pub interval_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            interval_secs: 5,
        }
    }
}

impl NotificationConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}
