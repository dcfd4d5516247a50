//! Notification sinks

use tokio::sync::mpsc;
use tracing::warn;

use crate::AlertError;

/// Destination for forwarded alert messages
pub trait Notifier {
    fn send(&mut self, message: &str) -> Result<(), AlertError>;
}

/// Writes alerts to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&mut self, message: &str) -> Result<(), AlertError> {
        warn!(target: "posture_alert", "Posture alert: {}", message);
        Ok(())
    }
}

/// Hands alerts to another task over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Create a notifier together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn send(&mut self, message: &str) -> Result<(), AlertError> {
        self.tx
            .send(message.to_string())
            .map_err(|_| AlertError::Delivery("notification receiver closed".into()))
    }
}
