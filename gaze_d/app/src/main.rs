use anyhow::Result;
use common::{load_config, Conditioner, Config, FrameGate};
use gaze_d::control::host::ControlHost;
use gaze_d::control::{routes, ControlState};
use gaze_d::dispatcher::Dispatcher;
use gaze_d::pipeline::{self, Consumer, FrameMessage};
use gaze_d::{sources, strategies};
use log::{debug, error, info, trace};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let config_path = Path::new("config.json");
    let config = load_config(config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        Config::default()
    });
    info!("Loaded Config: {:?}", config);

    let mut source = sources::create_source(&config.source);
    source.initialize()?;

    let mut conditioner = Conditioner::from_config(&config);
    if let Err(e) = conditioner.load_calibration() {
        error!("Failed to load calibration: {:#}. Using defaults.", e);
    }
    info!(
        "Calibration file: {:?}",
        conditioner.calibration_manager.storage_path()
    );

    let control = ControlState::new(conditioner.calibration().clone());

    let mut dispatcher = Dispatcher::new(strategies::create_strategy(&config.output));
    if let Err(e) = dispatcher.initialize() {
        error!("Failed to initialize output: {}", e);
        return Err(e);
    }
    info!("Output initialized with {:?} mode.", config.output.mode);

    if config.control.enabled {
        let router = routes::get_router(control.clone());
        let port = config.control.port;
        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
            rt.block_on(async {
                if let Err(e) = ControlHost::start(port, router).await {
                    error!("Calibration control host failed: {}", e);
                }
            });
        });
    } else {
        info!("Calibration control disabled.");
    }

    let (tx, rx) = sync_channel::<FrameMessage>(1);
    let gate = FrameGate::new();

    let consumer = Consumer::new(conditioner, dispatcher, control.clone());
    let running_consumer = running.clone();
    let consumer_handle = thread::spawn(move || consumer.run(rx, &running_consumer));

    pipeline::run_producer(
        source.as_mut(),
        tx,
        &gate,
        &control,
        &running,
        config.max_fps,
    );

    info!("Shutting down...");
    if consumer_handle.join().is_err() {
        error!("Consumer thread panicked");
    }
    info!(
        "Dropped {} frames while the pipeline was busy",
        control.frames_dropped()
    );
    Ok(())
}
