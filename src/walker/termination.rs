//! Quiescence detection for the worker pool
//!
//! Every directory task is a liability: it is registered before it becomes
//! visible in the queue and completed once all of its children have been
//! classified. The walk is over exactly when the outstanding count drops to
//! zero. The worker that performs that decrement flips the shutdown flag and
//! closes the wake channel, which releases every worker blocked in
//! [`WorkQueueReceiver::pop`](crate::walker::queue::WorkQueueReceiver::pop).
//!
//! ```text
//!   RUNNING ──(in_flight: 1 → 0)──▶ DONE
//! ```

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Shared in-flight counter and shutdown broadcast
#[derive(Debug)]
pub struct Termination {
    /// Tasks registered but not yet completed
    in_flight: AtomicI64,

    /// Set once, never cleared
    shutdown: AtomicBool,

    /// Set when shutdown came from a failing worker instead of exhaustion
    aborted: AtomicBool,

    /// Only sender of the wake channel; dropped to wake all receivers
    wake_tx: Mutex<Option<Sender<()>>>,

    /// Receiving side, disconnected once shutdown fires
    wake_rx: Receiver<()>,
}

impl Termination {
    /// Create a detector with no outstanding tasks
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(0);

        Self {
            in_flight: AtomicI64::new(0),
            shutdown: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            wake_tx: Mutex::new(Some(wake_tx)),
            wake_rx,
        }
    }

    /// Register a new task
    ///
    /// Must be called before the task is pushed, so no consumer can observe
    /// an empty walk while the task is in transit.
    pub fn register(&self) {
        let previous = self.in_flight.fetch_add(1, Ordering::AcqRel);
        debug_assert!(
            previous > 0 || !self.is_shutdown(),
            "task registered after the walk finished"
        );
    }

    /// Complete a task after all of its children were classified
    ///
    /// Returns `true` for the single call that brought the count to zero.
    ///
    /// # Panics
    ///
    /// Panics if more tasks are completed than were registered.
    pub fn complete(&self) -> bool {
        let previous = self.in_flight.fetch_sub(1, Ordering::AcqRel);
        assert!(
            previous > 0,
            "in-flight task count went negative ({})",
            previous - 1
        );

        if previous == 1 {
            self.broadcast();
            true
        } else {
            false
        }
    }

    /// Shut down without waiting for the walk to drain
    ///
    /// Used when a worker dies mid-task: its liability is never discharged,
    /// so the count would otherwise never reach zero.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.broadcast();
    }

    fn broadcast(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Disconnecting the channel wakes every blocked receiver
        self.wake_tx.lock().take();
    }

    /// Check if shutdown has been signalled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Check if shutdown came from [`abort`](Self::abort)
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Current number of outstanding tasks
    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Channel that becomes ready (disconnected) on shutdown
    pub fn wake_signal(&self) -> &Receiver<()> {
        &self.wake_rx
    }
}

impl Default for Termination {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_zero_crossing_fires_once() {
        let termination = Termination::new();
        termination.register();
        termination.register();

        assert!(!termination.complete());
        assert!(!termination.is_shutdown());
        assert_eq!(termination.in_flight(), 1);

        assert!(termination.complete());
        assert!(termination.is_shutdown());
        assert!(!termination.is_aborted());
    }

    #[test]
    fn test_wake_signal_disconnects() {
        let termination = Termination::new();
        assert_eq!(
            termination.wake_signal().try_recv(),
            Err(crossbeam_channel::TryRecvError::Empty)
        );

        termination.register();
        termination.complete();

        assert_eq!(
            termination.wake_signal().recv(),
            Err(crossbeam_channel::RecvError)
        );
    }

    #[test]
    #[should_panic(expected = "went negative")]
    fn test_underflow_panics() {
        let termination = Termination::new();
        termination.complete();
    }

    #[test]
    fn test_abort() {
        let termination = Termination::new();
        termination.register();
        termination.abort();

        assert!(termination.is_shutdown());
        assert!(termination.is_aborted());
        assert_eq!(termination.in_flight(), 1);
    }

    #[test]
    fn test_concurrent_discharge() {
        let termination = Arc::new(Termination::new());
        let crossings = Arc::new(AtomicUsize::new(0));
        for _ in 0..8000 {
            termination.register();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let termination = Arc::clone(&termination);
                let crossings = Arc::clone(&crossings);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        if termination.complete() {
                            crossings.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(crossings.load(Ordering::SeqCst), 1);
        assert_eq!(termination.in_flight(), 0);
        assert!(termination.is_shutdown());
    }
}
