//! Error taxonomy for the monitor.
//!
//! - `SensorError`: recovered inside the acquisition loop (last-known-good).
//! - `ConnectionError`: recovered per client inside the accept loop.
//! - `StartupError`: fatal; the process never enters its loops.

use std::{io, net::SocketAddr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor not detected at I2C address {addr:#04x}")]
    NotDetected { addr: u8 },

    #[error("I2C bus error: {0}")]
    Bus(String),

    #[error("ADC read error: {0}")]
    Adc(String),
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("failed to send response: {0}")]
    Write(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("sensor check failed: {0}")]
    Sensor(#[from] SensorError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] io::Error),
}
