//! Posture Monitor - Main Entry Point

use anyhow::{Context, Result};
use tracing::{error, info};

use alerting::{AlertGate, LogNotifier};
use camera_capture::opencv_backend::OpenCvBackend;
use camera_capture::{Camera, CameraError};
use monitor::display::{DisplaySink, HighguiDisplay, NullDisplay};
use monitor::{init_logging, shutdown, AcquisitionLoop, AppConfig};
use posture::cascade::OpenCvCascade;
use posture::PostureAnalyzer;

fn main() -> Result<()> {
    let path = AppConfig::resolve_path(std::env::args().nth(1));
    let config = AppConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    init_logging(&config.logging)?;

    info!("=== Posture Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", path.display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(run(config)).map_err(|e| {
        error!("{:#}", e);
        e
    })
}

async fn run(config: AppConfig) -> Result<()> {
    let frontal = OpenCvCascade::load(&config.detector.frontal_model_path)
        .context("loading frontal face model")?;
    let profile = OpenCvCascade::load(&config.detector.profile_model_path)
        .context("loading profile face model")?;
    let analyzer = PostureAnalyzer::new(&config.detector, Box::new(frontal), Box::new(profile));

    let camera = Camera::open(OpenCvBackend, config.camera.clone())
        .await
        .map_err(|e| camera_startup_error(config.camera.device_index, e))?;

    let gate = AlertGate::new(&config.notification, Box::new(LogNotifier));

    let display: Box<dyn DisplaySink> = if config.display.enable {
        Box::new(
            HighguiDisplay::new(&config.display.window_title)
                .context("opening display window")?,
        )
    } else {
        Box::new(NullDisplay)
    };

    let shutdown = shutdown::install();
    let mut acquisition =
        AcquisitionLoop::new(camera, analyzer, gate, display, config.acquisition.clone());

    info!("Monitoring posture, press Ctrl-C to stop");
    acquisition.run(&shutdown).await;

    info!("Shutdown complete");
    Ok(())
}

fn camera_startup_error(device_index: i32, e: CameraError) -> anyhow::Error {
    anyhow::anyhow!(
        "cannot open camera {}: {}\n\
         Possible causes:\n  \
         - missing permission to access the camera device\n  \
         - the camera is in use by another application\n  \
         - the camera is disconnected",
        device_index,
        e
    )
}
