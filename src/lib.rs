//! Indoor-gardening monitor: sensor acquisition and a minimal HTTP view of the
//! latest reading, running as two threads that only meet in `SharedState`.

pub mod component_a;
pub mod component_b;
pub mod config;
pub mod error;
pub mod monitor;
pub mod utils;
