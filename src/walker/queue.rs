//! Bounded work queue for directory tasks
//!
//! The queue buffers directories waiting to be listed. It is bounded: a full
//! queue never drops a task. Blocking producers use [`WorkQueueSender::push`];
//! workers use [`WorkQueueSender::try_push`] and, when the queue is full,
//! keep the task and expand it themselves. That way a worker never waits on
//! a queue only workers can drain.
//!
//! Consumers block in [`WorkQueueReceiver::pop`] until a task arrives or the
//! walk's [`Termination`] signals shutdown.

use crate::walker::termination::Termination;
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Default interval between shutdown re-checks while blocked in `pop`
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A directory waiting to be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTask {
    /// Full path to the directory
    pub path: String,
}

impl DirTask {
    /// Create a new directory task
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Number of times a push found the queue full
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Bounded multi-producer, multi-consumer queue of [`DirTask`]s
pub struct WorkQueue {
    /// Sender for adding tasks
    sender: Sender<DirTask>,

    /// Receiver for getting tasks
    receiver: Receiver<DirTask>,

    /// Queue capacity
    capacity: usize,

    /// Shutdown re-check interval for blocked consumers
    poll_interval: Duration,

    /// Queue statistics
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new work queue with the specified capacity
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_poll_interval(capacity, DEFAULT_POLL_INTERVAL)
    }

    /// Create a work queue with a custom shutdown poll interval
    pub fn with_poll_interval(capacity: usize, poll_interval: Duration) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            poll_interval,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get a sender for this queue (clone for each worker)
    pub fn sender(&self) -> WorkQueueSender {
        WorkQueueSender {
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.receiver.clone(),
            poll_interval: self.poll_interval,
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Handle for sending tasks to the queue
#[derive(Clone)]
pub struct WorkQueueSender {
    sender: Sender<DirTask>,
    stats: Arc<QueueStats>,
}

impl WorkQueueSender {
    /// Send a task, blocking while the queue is full
    ///
    /// Returns the task if every receiver is gone.
    pub fn push(&self, task: DirTask) -> Result<(), DirTask> {
        self.sender.send(task).map_err(|e| e.into_inner())
    }

    /// Try to send a task without blocking
    ///
    /// Ownership of the task comes back to the caller when it could not be
    /// queued, so it can be processed inline.
    pub fn try_push(&self, task: DirTask) -> Result<(), DirTask> {
        match self.sender.try_send(task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(task)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                Err(task)
            }
            Err(TrySendError::Disconnected(task)) => Err(task),
        }
    }
}

/// Handle for receiving tasks from the queue
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<DirTask>,
    poll_interval: Duration,
}

impl WorkQueueReceiver {
    /// Receive a task, blocking until one is available
    ///
    /// Returns `None` once `termination` has signalled shutdown: the queue is
    /// then logically closed. Blocked callers wake as soon as the shutdown
    /// broadcast fires; the poll interval only bounds how long a missed
    /// wake-up can go unnoticed.
    pub fn pop(&self, termination: &Termination) -> Option<DirTask> {
        let wake = termination.wake_signal();

        loop {
            select! {
                recv(self.receiver) -> msg => return msg.ok(),
                recv(wake) -> _ => {
                    if termination.is_shutdown() {
                        return None;
                    }
                }
                default(self.poll_interval) => {
                    if termination.is_shutdown() {
                        return None;
                    }
                }
            }
        }
    }

    /// Try to receive a task without blocking
    pub fn try_pop(&self) -> Option<DirTask> {
        self.receiver.try_recv().ok()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}
