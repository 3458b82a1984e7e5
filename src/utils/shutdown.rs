//! Cooperative shutdown signal observed by both long-running loops.
//!
//! Triggering drops the channel sender, so every `recv_timeout` waiting on the
//! receiver side returns `Disconnected` immediately. The atomic flag lets loops
//! that never sleep on the channel (the accept loop) poll cheaply.

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// Owner side. Cloneable so it can be moved into a signal handler.
#[derive(Clone)]
pub struct ShutdownTrigger {
    tx: Arc<Mutex<Option<Sender<()>>>>,
    flag: Arc<AtomicBool>,
}

/// Observer side handed to each loop.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
    flag: Arc<AtomicBool>,
}

pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = bounded(0);
    let flag = Arc::new(AtomicBool::new(false));
    (
        ShutdownTrigger {
            tx: Arc::new(Mutex::new(Some(tx))),
            flag: flag.clone(),
        },
        ShutdownSignal { rx, flag },
    )
}

impl ShutdownTrigger {
    /// Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
        self.tx.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Sleeps up to `timeout`. Returns true if shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        match self.rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_triggered(),
            // nothing is ever sent on the channel
            Ok(()) => self.is_triggered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Instant};

    #[test]
    fn wait_times_out_when_not_triggered() {
        let (_trigger, signal) = channel();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn trigger_wakes_waiter_early() {
        let (trigger, signal) = channel();
        let waiter = thread::spawn(move || {
            let start = Instant::now();
            let stopped = signal.wait_timeout(Duration::from_secs(10));
            (stopped, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        trigger.trigger();

        let (stopped, elapsed) = waiter.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn trigger_is_idempotent_and_visible_to_clones() {
        let (trigger, signal) = channel();
        let other = signal.clone();
        trigger.trigger();
        trigger.clone().trigger();
        assert!(trigger.is_triggered());
        assert!(signal.is_triggered());
        assert!(other.wait_timeout(Duration::from_secs(1)));
    }
}
