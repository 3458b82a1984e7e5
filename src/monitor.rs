//! monitor.rs
//! Brings the two long-running threads up and down.
//!
//! - Startup order: sensor presence check, listener bind, then the `http_server`
//!   and `acquisition` threads. Any failure is a `StartupError` and leaves nothing running.
//! - `StopHandle` is what the interrupt handler holds: it triggers the acquisition
//!   shutdown and stops the server, cutting off a client that is being served.
//! - `Monitor::join` waits for acquisition to finish its clear action, then for the server.

use log::{error, info, warn};
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::component_a::{
    acquisition::AcquisitionLoop,
    actuation::{Actuators, Display},
    sensor::SensorSource,
};
use crate::component_b::http_server::{HttpServer, ServerHandle};
use crate::config::{DHT12_I2C_ADDR, MonitorConfig};
use crate::error::StartupError;
use crate::utils::{
    shared_state::{SharedState, SharedStateHandle},
    shutdown::{self, ShutdownTrigger},
};

pub struct Monitor {
    local_addr: SocketAddr,
    state: SharedStateHandle,
    stop: StopHandle,
    acquisition: JoinHandle<()>,
    server: JoinHandle<()>,
}

/// Cloneable; safe to call from a signal handler, any number of times.
#[derive(Clone)]
pub struct StopHandle {
    trigger: ShutdownTrigger,
    server: ServerHandle,
}

impl StopHandle {
    pub fn stop(&self) {
        if self.trigger.is_triggered() {
            warn!("[Main] stop requested again");
        } else {
            info!("[Main] Program stopped. Exiting...");
        }
        self.trigger.trigger();
        self.server.stop();
    }
}

/// Runs the fatal startup checks and spawns both threads.
pub fn start<S, D, A>(
    config: &MonitorConfig,
    mut sensors: S,
    display: D,
    actuators: A,
) -> Result<Monitor, StartupError>
where
    S: SensorSource + 'static,
    D: Display + 'static,
    A: Actuators + 'static,
{
    info!("[Main] Looking for I2C sensor at {:#04x}...", DHT12_I2C_ADDR);
    sensors.probe()?;

    let state = Arc::new(SharedState::new());
    let server = HttpServer::bind(config.listen_addr, config.backlog, state.clone())?;
    let local_addr = server.local_addr();
    let server_handle = server.handle();
    let (trigger, signal) = shutdown::channel();

    let server_thread = thread::Builder::new()
        .name("http_server".into())
        .spawn(move || server.run())
        .map_err(StartupError::Spawn)?;

    let acquisition = AcquisitionLoop::new(
        sensors,
        display,
        actuators,
        state.clone(),
        config.sample_period(),
        config.advertised_ip.clone(),
    );

    let acquisition_thread = match thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || {
            acquisition.run(signal);
        }) {
        Ok(handle) => handle,
        Err(e) => {
            server_handle.stop();
            let _ = server_thread.join();
            return Err(StartupError::Spawn(e));
        }
    };

    Ok(Monitor {
        local_addr,
        state,
        stop: StopHandle {
            trigger,
            server: server_handle,
        },
        acquisition: acquisition_thread,
        server: server_thread,
    })
}

impl Monitor {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &SharedStateHandle {
        &self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Blocks until acquisition has stopped, then makes sure the server follows.
    pub fn join(self) {
        if self.acquisition.join().is_err() {
            error!("[Main] acquisition thread panicked");
            self.stop.trigger.trigger();
        }
        self.stop.server.stop();

        match self.server.join() {
            Ok(()) => info!("[Main] server thread joined"),
            Err(_) => error!("[Main] server thread panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_a::{
        actuation::{LogActuators, LogDisplay},
        sensor::{RawReadings, SimulatedSensors},
    };
    use crate::error::SensorError;
    use std::{
        net::TcpListener,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Counts reads so a test can tell whether acquisition ever ran.
    struct Counting {
        inner: SimulatedSensors,
        reads: Arc<AtomicUsize>,
    }

    impl SensorSource for Counting {
        fn probe(&mut self) -> Result<(), SensorError> {
            self.inner.probe()
        }

        fn read_sensors(&mut self) -> Result<RawReadings, SensorError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_sensors()
        }
    }

    fn counting(present: bool) -> (Counting, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = Counting {
            inner: SimulatedSensors::new(0.0).present(present),
            reads: reads.clone(),
        };
        (source, reads)
    }

    fn config_on(addr: SocketAddr) -> MonitorConfig {
        MonitorConfig {
            listen_addr: addr,
            sample_period_ms: 5,
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn missing_sensor_is_fatal_before_bind() {
        // the port is taken, so reaching bind would give a Bind error instead
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let (source, reads) = counting(false);

        let result = start(
            &config_on(taken.local_addr().unwrap()),
            source,
            LogDisplay::new(),
            LogActuators::new(),
        );

        assert!(matches!(
            result,
            Err(StartupError::Sensor(SensorError::NotDetected { addr: DHT12_I2C_ADDR }))
        ));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bind_failure_is_fatal_and_starts_nothing() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let (source, reads) = counting(true);

        let result = start(
            &config_on(taken.local_addr().unwrap()),
            source,
            LogDisplay::new(),
            LogActuators::new(),
        );

        assert!(matches!(result, Err(StartupError::Bind { .. })));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_stop_is_harmless() {
        let (source, reads) = counting(true);
        let monitor = start(
            &config_on("127.0.0.1:0".parse().unwrap()),
            source,
            LogDisplay::new(),
            LogActuators::new(),
        )
        .unwrap();

        while monitor.state().version() < 2 {
            thread::yield_now();
        }
        let stop = monitor.stop_handle();
        stop.stop();
        stop.stop();
        monitor.join();

        assert!(reads.load(Ordering::SeqCst) >= 2);
    }
}
