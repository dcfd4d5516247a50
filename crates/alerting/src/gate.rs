//! Alert Gate Implementation

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::notifier::Notifier;
use crate::NotificationConfig;

/// Single-stream throttle in front of a notifier
pub struct AlertGate {
    /// Forwarding enabled
    enabled: bool,
    /// Minimum gap between forwarded alerts
    interval: Duration,
    /// Sink
    notifier: Box<dyn Notifier>,
    /// Last successful delivery
    last_sent: Option<Instant>,
    sent: u64,
    suppressed: u64,
}

impl AlertGate {
    /// Create a new alert gate
    pub fn new(config: &NotificationConfig, notifier: Box<dyn Notifier>) -> Self {
        info!(
            "Creating alert gate (enabled: {}, interval: {}s)",
            config.enable, config.interval_secs
        );
        Self {
            enabled: config.enable,
            interval: config.interval(),
            notifier,
            last_sent: None,
            sent: 0,
            suppressed: 0,
        }
    }

    /// Forward `message` unless the gate is disabled or still cooling down.
    ///
    /// Returns whether the message reached the notifier. Delivery errors are
    /// logged and leave the cooldown window untouched.
    pub fn notify(&mut self, message: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_sent {
            if now.duration_since(last) < self.interval {
                self.suppressed += 1;
                debug!("Alert suppressed: in cooldown period");
                return false;
            }
        }

        match self.notifier.send(message) {
            Ok(()) => {
                self.last_sent = Some(now);
                self.sent += 1;
                info!("Alert sent: {} (count: {})", message, self.sent);
                true
            }
            Err(e) => {
                error!("Failed to send alert: {}", e);
                false
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of alerts forwarded so far
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Number of alerts dropped by the cooldown
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}
