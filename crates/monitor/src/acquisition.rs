//! Acquisition Loop Implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alerting::AlertGate;
use camera_capture::{Camera, CameraBackend, Frame};
use posture::{PostureAnalysis, PostureAnalyzer};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::AcquisitionConfig;
use crate::display::{render, DisplaySink};

/// Outcome of one loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Iteration {
    /// A frame was analyzed
    Processed { alerted: bool },
    /// The read failed and the failure was counted
    ReadFailed { consecutive: u32 },
    /// The failure threshold was hit and the device came back
    Reconnected,
    /// The failure threshold was hit and the device is still down
    ReconnectFailed { consecutive: u32 },
}

/// Read-failure bookkeeping
#[derive(Debug, Clone, Default)]
pub struct CameraFaultState {
    /// Failed reads since the last good frame or reconnect
    pub consecutive_failures: u32,
    /// Reopen attempts so far
    pub reconnect_attempts: u64,
    /// Reopen attempts that succeeded
    pub reconnects: u64,
}

/// Running totals
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    pub frames_processed: u64,
    pub read_failures: u64,
    pub alerts_sent: u64,
    pub persons_seen: u64,
}

/// Cooperative read / analyze / alert loop
pub struct AcquisitionLoop<B: CameraBackend> {
    camera: Camera<B>,
    analyzer: PostureAnalyzer,
    gate: AlertGate,
    display: Box<dyn DisplaySink>,
    settings: AcquisitionConfig,
    frame_interval: Duration,
    faults: CameraFaultState,
    stats: LoopStats,
    window_start: Instant,
    window_frames: u64,
}

impl<B: CameraBackend> AcquisitionLoop<B> {
    /// Create a loop around an already-opened camera
    pub fn new(
        camera: Camera<B>,
        analyzer: PostureAnalyzer,
        gate: AlertGate,
        display: Box<dyn DisplaySink>,
        settings: AcquisitionConfig,
    ) -> Self {
        let frame_interval = camera.config().frame_interval();
        Self {
            camera,
            analyzer,
            gate,
            display,
            settings,
            frame_interval,
            faults: CameraFaultState::default(),
            stats: LoopStats::default(),
            window_start: Instant::now(),
            window_frames: 0,
        }
    }

    /// Run until `shutdown` is raised. The flag is checked once per iteration.
    pub async fn run(&mut self, shutdown: &AtomicBool) {
        info!(
            "Acquisition loop started (frame interval {}ms)",
            self.frame_interval.as_millis()
        );
        self.window_start = Instant::now();

        while !shutdown.load(Ordering::SeqCst) {
            self.step().await;
        }

        info!(
            "Acquisition loop stopped after {} frames ({} alerts, {} reconnects)",
            self.stats.frames_processed, self.stats.alerts_sent, self.faults.reconnects
        );
    }

    /// One iteration, including the trailing sleep
    pub async fn step(&mut self) -> Iteration {
        match self.camera.read_frame().await {
            Ok(frame) => {
                self.faults.consecutive_failures = 0;
                let alerted = self.process(&frame);
                tokio::time::sleep(self.frame_interval).await;
                Iteration::Processed { alerted }
            }
            Err(e) => {
                self.faults.consecutive_failures += 1;
                self.stats.read_failures += 1;
                warn!(
                    "Frame read failed ({} in a row): {}",
                    self.faults.consecutive_failures, e
                );

                let outcome = if self.faults.consecutive_failures
                    >= self.settings.max_consecutive_failures
                {
                    self.reconnect().await
                } else {
                    Iteration::ReadFailed {
                        consecutive: self.faults.consecutive_failures,
                    }
                };

                tokio::time::sleep(self.settings.failure_backoff()).await;
                outcome
            }
        }
    }

    /// Close, cool down, reopen
    async fn reconnect(&mut self) -> Iteration {
        self.faults.reconnect_attempts += 1;
        warn!(
            "Reconnecting camera after {} consecutive failures",
            self.faults.consecutive_failures
        );

        self.camera.close();
        tokio::time::sleep(self.settings.reconnect_cooldown()).await;

        match self.camera.reopen().await {
            Ok(()) => {
                self.faults.consecutive_failures = 0;
                self.faults.reconnects += 1;
                info!("Camera reconnected");
                Iteration::Reconnected
            }
            Err(e) => {
                error!("Camera reconnect failed: {}", e);
                Iteration::ReconnectFailed {
                    consecutive: self.faults.consecutive_failures,
                }
            }
        }
    }

    fn process(&mut self, frame: &Frame) -> bool {
        let analysis = self.analyzer.analyze(frame);
        self.stats.frames_processed += 1;
        self.window_frames += 1;
        if analysis.result.has_person {
            self.stats.persons_seen += 1;
        }

        let mut alerted = false;
        if analysis.result.needs_alert() && self.gate.is_enabled() {
            alerted = self.gate.notify(&analysis.result.message);
            if alerted {
                self.stats.alerts_sent += 1;
            }
        }

        if self.display.wants_frames() {
            if let Some(overlay) = render(frame, &analysis) {
                self.display.show(&overlay);
            }
        }

        if self.stats.frames_processed % self.settings.diagnostics_every.max(1) == 0 {
            self.log_diagnostics(&analysis);
        } else {
            debug!("Frame {}: {}", frame.sequence, analysis.result.summary());
        }

        alerted
    }

    fn log_diagnostics(&mut self, analysis: &PostureAnalysis) {
        let elapsed = self.window_start.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.window_frames as f64 / elapsed
        } else {
            0.0
        };

        match analysis.face {
            Some(face) => info!(
                "Frame {}: face {}x{} at ({}, {}) from {:?}, {} candidates, {} | {:.1} fps",
                self.stats.frames_processed,
                face.width,
                face.height,
                face.x,
                face.y,
                analysis.source,
                analysis.candidates,
                analysis.result.summary(),
                fps
            ),
            None => info!(
                "Frame {}: {} | {:.1} fps",
                self.stats.frames_processed,
                analysis.result.summary(),
                fps
            ),
        }

        self.window_start = Instant::now();
        self.window_frames = 0;
    }

    pub fn faults(&self) -> &CameraFaultState {
        &self.faults
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn gate(&self) -> &AlertGate {
        &self.gate
    }

    pub fn camera(&self) -> &Camera<B> {
        &self.camera
    }
}
