
//! sensor.rs
//! Raw sensor acquisition boundary and the derived `Reading`.
//! - `SensorSource` is the seam to the driver layer (DHT12 over I2C, light and soil ADCs)
//! - `Reading::from_raw` converts raw registers/ADC counts into display units
//! - `SimulatedSensors` stands in for the hardware when running on a host

use log::info;
use rand::random_range;
use serde::Serialize;

use crate::config::{DHT12_I2C_ADDR, LIGHT_FULL_SCALE, SOIL_FULL_SCALE};
use crate::error::SensorError;

/// DHT12 register pair: integral part and tenths.
/// For temperature, bit 7 of the fractional byte is the sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair {
    pub integral: u8,
    pub fractional: u8,
}

impl RegisterPair {
    pub fn new(integral: u8, fractional: u8) -> Self {
        Self { integral, fractional }
    }

    pub fn unsigned_value(&self) -> f64 {
        self.integral as f64 + (self.fractional & 0x7f) as f64 / 10.0
    }

    pub fn signed_value(&self) -> f64 {
        let magnitude = self.unsigned_value();
        if self.fractional & 0x80 != 0 { -magnitude } else { magnitude }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawReadings {
    pub humidity: RegisterPair,
    pub temperature: RegisterPair,
    pub light_adc: u16,
    pub soil_adc: u16,
}

impl RawReadings {
    /// Decodes the first four DHT12 registers (humidity int/frac, temperature int/frac).
    pub fn from_dht12(regs: [u8; 4], light_adc: u16, soil_adc: u16) -> Self {
        Self {
            humidity: RegisterPair::new(regs[0], regs[1]),
            temperature: RegisterPair::new(regs[2], regs[3]),
            light_adc,
            soil_adc,
        }
    }
}

/// One acquisition cycle's values in display units. Never mutated after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Reading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub light_pct: f64,
    pub soil_pct: f64,
}

impl Reading {
    pub fn from_raw(raw: &RawReadings) -> Self {
        Self {
            temperature_c: raw.temperature.signed_value(),
            humidity_pct: raw.humidity.unsigned_value(),
            light_pct: light_percentage(raw.light_adc),
            soil_pct: soil_percentage(raw.soil_adc),
        }
    }
}

pub fn light_percentage(raw: u16) -> f64 {
    raw as f64 / LIGHT_FULL_SCALE * 100.0
}

pub fn soil_percentage(raw: u16) -> f64 {
    raw as f64 / SOIL_FULL_SCALE * 100.0
}

/// Driver-layer seam. Implementations own their bus/ADC handles.
pub trait SensorSource: Send {
    /// Boot-time presence check; a failure here is fatal for the process.
    fn probe(&mut self) -> Result<(), SensorError>;

    fn read_sensors(&mut self) -> Result<RawReadings, SensorError>;
}

/// Host stand-in for the DHT12 + photoresistor + soil probe.
/// Produces noisy values around a plausible indoor baseline.
pub struct SimulatedSensors {
    failure_rate: f64,
    present: bool,
    reads: u64,
}

impl SimulatedSensors {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            present: true,
            reads: 0,
        }
    }

    /// An absent sensor fails the presence check at boot.
    pub fn present(mut self, present: bool) -> Self {
        self.present = present;
        self
    }
}

impl SensorSource for SimulatedSensors {
    fn probe(&mut self) -> Result<(), SensorError> {
        if !self.present {
            return Err(SensorError::NotDetected { addr: DHT12_I2C_ADDR });
        }
        info!("[Sensor] simulated DHT12 at {:#04x} is detected", DHT12_I2C_ADDR);
        Ok(())
    }

    fn read_sensors(&mut self) -> Result<RawReadings, SensorError> {
        self.reads += 1;
        if self.failure_rate > 0.0 && random_range(0.0..1.0) < self.failure_rate {
            return Err(SensorError::Bus(format!(
                "simulated NACK from {:#04x} on read {}",
                DHT12_I2C_ADDR, self.reads
            )));
        }

        let humidity = random_range(550u16..650);
        let temperature = random_range(220u16..260);
        Ok(RawReadings {
            humidity: RegisterPair::new((humidity / 10) as u8, (humidity % 10) as u8),
            temperature: RegisterPair::new((temperature / 10) as u8, (temperature % 10) as u8),
            light_adc: random_range(0..4096),
            soil_adc: random_range(900..1800),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_dht12_registers() {
        let raw = RawReadings::from_dht12([60, 5, 25, 3], 0, 0);
        let r = Reading::from_raw(&raw);
        assert!((r.humidity_pct - 60.5).abs() < 1e-9);
        assert!((r.temperature_c - 25.3).abs() < 1e-9);
    }

    #[test]
    fn negative_temperature_uses_sign_bit() {
        let pair = RegisterPair::new(4, 0x80 | 2);
        assert!((pair.signed_value() + 4.2).abs() < 1e-9);
    }

    #[test]
    fn percentages_use_full_scale() {
        assert!((light_percentage(4100) - 100.0).abs() < 1e-9);
        assert!((light_percentage(2050) - 50.0).abs() < 1e-9);
        assert!((soil_percentage(1800) - 100.0).abs() < 1e-9);
        assert!((soil_percentage(900) - 50.0).abs() < 1e-9);
        assert_eq!(light_percentage(0), 0.0);
    }

    #[test]
    fn simulated_sensors_stay_in_range() {
        let mut s = SimulatedSensors::new(0.0);
        s.probe().unwrap();
        for _ in 0..100 {
            let raw = s.read_sensors().unwrap();
            assert!(raw.light_adc < 4096);
            assert!((900..1800).contains(&raw.soil_adc));
            let r = Reading::from_raw(&raw);
            assert!((55.0..65.0).contains(&r.humidity_pct));
            assert!((22.0..26.0).contains(&r.temperature_c));
        }
    }

    #[test]
    fn absent_sensor_fails_probe() {
        let mut s = SimulatedSensors::new(0.0).present(false);
        assert!(matches!(
            s.probe(),
            Err(SensorError::NotDetected { addr: DHT12_I2C_ADDR })
        ));
    }

    #[test]
    fn simulated_sensors_always_fail_at_full_rate() {
        let mut s = SimulatedSensors::new(1.0);
        assert!(matches!(s.read_sensors(), Err(SensorError::Bus(_))));
    }
}
