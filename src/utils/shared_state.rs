//! shared_state.rs
//! Single point of data exchange between the acquisition thread and the server thread.
//!
//! - Acquisition is the sole writer (`publish`), the server is the sole reader (`snapshot`).
//! - The whole `Snapshot` (reading + version) lives behind one `Arc` that is swapped
//!   atomically, so a reader sees either the old or the new snapshot in full.
//! - Readers never take a lock the writer could wait on.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::component_a::sensor::Reading;

/// Immutable, internally consistent view of the latest reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub reading: Reading,
    pub version: u64,
}

pub struct SharedState {
    current: ArcSwap<Snapshot>,
}

impl SharedState {
    /// Starts at the zero sentinel: all fields 0.0, version 0.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Replaces the held snapshot and bumps the version. Returns the new version.
    pub fn publish(&self, reading: Reading) -> u64 {
        let prev = self.current.rcu(|cur| Snapshot {
            reading,
            version: cur.version + 1,
        });
        prev.version + 1
    }

    pub fn snapshot(&self) -> Snapshot {
        **self.current.load()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedStateHandle = Arc<SharedState>;
