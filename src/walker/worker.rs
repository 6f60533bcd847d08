//! Worker thread logic for parallel directory walking
//!
//! Each worker:
//! - Pulls directory tasks from the work queue
//! - Lists the directory through the shared [`DirLister`]
//! - Drops children the rule set ignores (pruning whole subtrees)
//! - Queues surviving subdirectories, expanding them inline when the queue
//!   is full
//! - Sends surviving, not-yet-seen files to the output writer
//! - Completes the task with the termination detector

use crate::error::{WalkOutcome, WorkerError};
use crate::filter::RuleSet;
use crate::output::PathWriterHandle;
use crate::walker::listing::{join_child, relative_to_root, DirLister};
use crate::walker::queue::{DirTask, WorkQueueReceiver, WorkQueueSender};
use crate::walker::seen::SeenSet;
use crate::walker::termination::Termination;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Directories listed
    pub dirs_processed: AtomicU64,

    /// Files sent to the output
    pub files_emitted: AtomicU64,

    /// Files suppressed because their relative path was already seen
    pub duplicates: AtomicU64,

    /// Entries dropped by the rule set
    pub ignored: AtomicU64,

    /// Tasks expanded inline because the queue was full
    pub inline_processed: AtomicU64,

    /// Errors encountered
    pub errors: AtomicU64,

    /// Directories or entries skipped (permission denied, etc.)
    pub skipped: AtomicU64,
}

impl WorkerStats {
    fn record_dir(&self) {
        self.dirs_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_file(&self) {
        self.files_emitted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    fn record_inline(&self) {
        self.inline_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared state every worker needs
#[derive(Clone)]
pub struct WorkerContext {
    /// Normalized walk root
    pub root: Arc<str>,

    /// Read-only rule set
    pub rules: Arc<RuleSet>,

    /// Directory listing source
    pub lister: Arc<dyn DirLister>,

    /// Emitted-path registry
    pub seen: Arc<SeenSet>,

    /// Quiescence detector
    pub termination: Arc<Termination>,

    /// Queue producer side
    pub queue_tx: WorkQueueSender,

    /// Queue consumer side
    pub queue_rx: WorkQueueReceiver,

    /// Output writer
    pub writer: PathWriterHandle,
}

/// A worker thread that processes directory tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(id: usize, ctx: WorkerContext) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, ctx, stats_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Check whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the worker to finish
    ///
    /// Statistics stay readable afterwards; joining twice is a no-op.
    pub fn join(&mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Aborts the walk if the owning worker unwinds
///
/// A panicking worker never completes its current task, so without this the
/// remaining workers would wait for a zero count that cannot come.
struct PanicGuard<'a> {
    id: usize,
    termination: &'a Termination,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(worker = self.id, "Worker panicked, aborting walk");
            self.termination.abort();
        }
    }
}

/// Main worker loop
pub fn worker_loop(id: usize, ctx: WorkerContext, stats: Arc<WorkerStats>) {
    let _guard = PanicGuard {
        id,
        termination: &ctx.termination,
    };
    debug!(worker = id, "Worker starting");

    // Tasks that did not fit in the queue; still counted as in flight
    let mut backlog: Vec<DirTask> = Vec::new();

    loop {
        let task = match backlog.pop() {
            Some(task) => {
                stats.record_inline();
                task
            }
            None => match ctx.queue_rx.pop(&ctx.termination) {
                Some(task) => task,
                None => break,
            },
        };

        let outcome = process_directory(id, &task, &ctx, &mut backlog, &stats);

        match &outcome {
            WalkOutcome::Success {
                entries, subdirs, ..
            } => {
                trace!(worker = id, path = %task.path, entries, subdirs, "Directory processed");
            }
            WalkOutcome::Skipped { path, reason } => {
                debug!(worker = id, path = %path, reason = %reason, "Directory skipped");
            }
            WalkOutcome::Failed { path, error } => {
                warn!(worker = id, path = %path, error = %error, "Directory failed");
            }
        }

        ctx.termination.complete();
    }

    debug!(
        worker = id,
        dirs = stats.dirs_processed.load(Ordering::Relaxed),
        files = stats.files_emitted.load(Ordering::Relaxed),
        "Worker shutting down"
    );
}

/// Expand a single directory
///
/// Listing failures are not fatal: the directory counts as empty.
pub fn process_directory(
    worker_id: usize,
    task: &DirTask,
    ctx: &WorkerContext,
    backlog: &mut Vec<DirTask>,
    stats: &WorkerStats,
) -> WalkOutcome {
    let listing = match ctx.lister.list(&task.path) {
        Ok(listing) => listing,
        Err(e) => {
            stats.record_error();

            if e.is_recoverable() {
                stats.record_skip();
                return WalkOutcome::Skipped {
                    path: task.path.clone(),
                    reason: e.to_string(),
                };
            }

            return WalkOutcome::Failed {
                path: task.path.clone(),
                error: e,
            };
        }
    };

    stats.record_dir();

    for err in &listing.errors {
        stats.record_skip();
        if err.is_recoverable() {
            debug!(worker = worker_id, error = %err, "Skipping entry");
        } else {
            warn!(worker = worker_id, error = %err, "Skipping unreadable entry");
        }
    }

    let mut entry_count = 0;
    let mut subdir_count = 0;

    for entry in listing.entries {
        if entry.is_special() {
            continue;
        }

        let full_path = join_child(&task.path, &entry.name);
        let relative = relative_to_root(&ctx.root, &full_path);
        if relative.is_empty() {
            continue;
        }

        let is_dir = entry.entry_type.is_dir();
        if ctx.rules.is_ignored(&relative, is_dir) {
            stats.record_ignored();
            trace!(worker = worker_id, path = %relative, "Ignored");
            continue;
        }

        entry_count += 1;

        if is_dir {
            subdir_count += 1;

            // Count the liability before anyone can pop the task
            ctx.termination.register();
            let subtask = DirTask::new(full_path);

            if let Err(subtask) = ctx.queue_tx.try_push(subtask) {
                trace!(
                    worker = worker_id,
                    path = %subtask.path,
                    "Backpressure - expanding inline"
                );
                backlog.push(subtask);
            }
        } else if ctx.seen.insert(&relative) {
            match ctx.writer.send_path(full_path) {
                Ok(()) => stats.record_file(),
                Err(e) => {
                    stats.record_error();
                    debug!(worker = worker_id, path = %e.0, "Output closed, path dropped");
                }
            }
        } else {
            stats.record_duplicate();
        }
    }

    WalkOutcome::Success {
        path: task.path.clone(),
        entries: entry_count,
        subdirs: subdir_count,
    }
}

/// Totals across all workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub dirs: u64,
    pub files: u64,
    pub duplicates: u64,
    pub ignored: u64,
    pub inline: u64,
    pub errors: u64,
    pub skipped: u64,
}

/// Aggregate statistics from multiple workers
pub fn aggregate_stats(workers: &[Worker]) -> AggregateStats {
    let mut total = AggregateStats::default();

    for worker in workers {
        let stats = worker.stats();
        total.dirs += stats.dirs_processed.load(Ordering::Relaxed);
        total.files += stats.files_emitted.load(Ordering::Relaxed);
        total.duplicates += stats.duplicates.load(Ordering::Relaxed);
        total.ignored += stats.ignored.load(Ordering::Relaxed);
        total.inline += stats.inline_processed.load(Ordering::Relaxed);
        total.errors += stats.errors.load(Ordering::Relaxed);
        total.skipped += stats.skipped.load(Ordering::Relaxed);
    }

    total
}
