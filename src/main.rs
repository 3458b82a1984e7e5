//! # Garden Monitor Entry Point
//!
//! Samples the plant sensors once per period, drives the local display, buzzer and
//! lights, and serves the latest reading over HTTP.
//!
//! ## Threads
//! - **acquisition:** read → actuate → publish → display, every `sample_period_ms` (1 s).
//! - **http_server:** blocking accept loop on `listen_addr` (0.0.0.0:80), one client at a time.
//!
//! The two threads only meet in `SharedState`.
//!
//! ## Startup
//! - Optional TOML config path as the first argument; defaults otherwise.
//! - Sensor presence check and listener bind are fatal on failure.
//!
//! ## Shutdown
//! - Ctrl+C triggers the shutdown signal (acquisition finishes its cycle and clears
//!   the outputs) and stops the server (active client cut off, listener closed),
//!   then both threads are joined.

use garden_monitor::{
    component_a::{
        actuation::{LogActuators, LogDisplay},
        sensor::SimulatedSensors,
    },
    config::MonitorConfig,
    error::StartupError,
    monitor,
};

use log::{error, info, warn};
use std::{env, path::PathBuf, process::ExitCode};

fn main() -> ExitCode {
    env_logger::init();
    info!("=== GARDEN MONITOR START ===");
    println!("Stop execution with `Ctrl+C`.");

    match run() {
        Ok(()) => {
            info!("=== GARDEN MONITOR STOPPED ===");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[Main] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let config_path = env::args_os().nth(1).map(PathBuf::from);
    let config = MonitorConfig::load_or_default(config_path.as_deref())?;
    info!("[Main] {:?}", config);

    let sensors = SimulatedSensors::new(config.sensor_failure_rate).present(config.sensor_present);
    let monitor = monitor::start(&config, sensors, LogDisplay::new(), LogActuators::new())?;

    // Ctrl+C: acquisition finishes its cycle and clears, the server drops any client and its listener
    let stop = monitor.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || stop.stop()) {
        warn!("[Main] failed to install interrupt handler: {}", e);
    }

    monitor.join();
    Ok(())
}
