//! acquisition.rs
//! Periodic sensor acquisition: read → derive → actuate → publish → display.
//! - Fixed period; the wait doubles as the cancellation point (checked between cycles only)
//! - Read failures degrade to the last successfully read raw values (no retry, no backoff)
//! - Actuators are driven every cycle regardless of the network side
//! - On cancellation: blank the display and silence the buzzer before returning

use log::{debug, info, warn};
use std::time::Duration;

use crate::component_a::{
    actuation::{ActuationDecision, Actuators, Display},
    sensor::{RawReadings, Reading, SensorSource},
};
use crate::utils::{shared_state::SharedStateHandle, shutdown::ShutdownSignal};

pub struct AcquisitionLoop<S, D, A> {
    source: S,
    display: D,
    actuators: A,
    state: SharedStateHandle,
    period: Duration,
    ip: Option<String>,
    last_good: Option<RawReadings>,
    cycles: u64,
    failures: u64,
}

impl<S, D, A> AcquisitionLoop<S, D, A>
where
    S: SensorSource,
    D: Display,
    A: Actuators,
{
    pub fn new(
        source: S,
        display: D,
        actuators: A,
        state: SharedStateHandle,
        period: Duration,
        ip: Option<String>,
    ) -> Self {
        Self {
            source,
            display,
            actuators,
            state,
            period,
            ip,
            last_good: None,
            cycles: 0,
            failures: 0,
        }
    }

    /// Runs until `shutdown` fires, then performs the clear action.
    /// A cycle in progress always completes before the signal is observed.
    pub fn run(mut self, shutdown: ShutdownSignal) -> (D, A) {
        info!("[Acquisition] started (period {} ms)", self.period.as_millis());

        loop {
            self.run_cycle();
            if shutdown.wait_timeout(self.period) {
                break;
            }
        }

        self.clear();
        info!(
            "[Acquisition] stopped after {} cycles ({} failed reads)",
            self.cycles, self.failures
        );
        (self.display, self.actuators)
    }

    /// One acquisition cycle. Returns the reading that was published.
    pub fn run_cycle(&mut self) -> Reading {
        self.cycles += 1;

        let raw = match self.source.read_sensors() {
            Ok(raw) => {
                self.last_good = Some(raw);
                Some(raw)
            }
            Err(e) => {
                self.failures += 1;
                warn!("[Acquisition] cycle {}: error reading the sensor: {}", self.cycles, e);
                self.last_good
            }
        };

        let reading = match raw {
            Some(raw) => {
                let decision = ActuationDecision::from_raw(raw.light_adc, raw.soil_adc);
                self.actuate(decision);
                Reading::from_raw(&raw)
            }
            // nothing has ever been read: keep serving the zero sentinel
            None => self.state.snapshot().reading,
        };

        let version = self.state.publish(reading);
        debug!("[Acquisition] cycle {} published v{}: {:?}", self.cycles, version, reading);

        self.display.clear();
        self.display.render(&reading, self.ip.as_deref());

        reading
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn actuate(&mut self, decision: ActuationDecision) {
        self.actuators.set_buzzer(decision.buzzer_on);
        let band = decision.light_band;
        self.actuators.set_lights(band, band.color());
    }

    fn clear(&mut self) {
        self.display.clear();
        self.actuators.set_buzzer(false);
    }
}
