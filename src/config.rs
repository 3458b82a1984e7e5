//! Device constants and the runtime configuration loaded at startup.
//!
//! The constants reproduce the calibration of the device hardware
//! (ESP32 ADC with 11 dB attenuation, DHT12 on I2C, 12-pixel ring).

use std::{
    fs,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    path::Path,
    time::Duration,
};

use serde::Deserialize;

use crate::error::ConfigError;

pub const SAMPLE_PERIOD_MS: u64 = 1_000;
pub const HTTP_PORT: u16 = 80;
pub const LISTEN_BACKLOG: i32 = 5;
pub const RECV_BUFFER_SIZE: usize = 1024;

pub const DHT12_I2C_ADDR: u8 = 0x5c;

// Full-scale raw values used for percentage conversion
pub const LIGHT_FULL_SCALE: f64 = 4100.0;
pub const SOIL_FULL_SCALE: f64 = 1800.0;

// Raw soil ADC below this value means dry soil (buzzer on)
pub const SOIL_DRY_THRESHOLD: u16 = 1300;

pub const BUZZER_FREQ_HZ: u32 = 800;
pub const BUZZER_DUTY_ON: u16 = 32_768; // 50% of 0..=65535
pub const LED_COUNT: usize = 12;
pub const DISPLAY_CONTRAST: u8 = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub listen_addr: SocketAddr,
    pub backlog: i32,
    pub sample_period_ms: u64,
    /// Address shown on the display; supplied by network bring-up.
    pub advertised_ip: Option<String>,
    /// Probability of an injected read failure in the simulated driver.
    pub sensor_failure_rate: f64,
    /// False makes the simulated driver fail its boot-time presence check.
    pub sensor_present: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, HTTP_PORT)),
            backlog: LISTEN_BACKLOG,
            sample_period_ms: SAMPLE_PERIOD_MS,
            advertised_ip: None,
            sensor_failure_rate: 0.0,
            sensor_present: true,
        }
    }
}

impl MonitorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }
}
