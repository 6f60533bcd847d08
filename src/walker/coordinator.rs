//! Walk coordinator - orchestrates the parallel directory walk
//!
//! The coordinator is responsible for:
//! - Setting up the work queue, termination detector and output writer
//! - Seeding the root and spawning workers
//! - Progress reporting while workers run
//! - Joining workers and collecting final statistics

use crate::config::WalkConfig;
use crate::error::{Result, WorkerError};
use crate::filter::RuleSet;
use crate::output::{PathWriter, DEFAULT_CHANNEL_SIZE};
use crate::walker::listing::{DirLister, FsLister};
use crate::walker::queue::{DirTask, WorkQueue};
use crate::walker::seen::SeenSet;
use crate::walker::termination::Termination;
use crate::walker::worker::{aggregate_stats, AggregateStats, Worker, WorkerContext};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How often progress callbacks fire
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a completed walk
#[derive(Debug, Clone)]
pub struct WalkResult {
    /// Directories listed
    pub total_dirs: u64,

    /// Files sent to the output
    pub total_files: u64,

    /// Paths the writer actually wrote
    pub paths_written: u64,

    /// Files suppressed as already seen
    pub duplicates: u64,

    /// Entries dropped by the rules
    pub ignored: u64,

    /// Tasks expanded inline because the queue was full
    pub inline_processed: u64,

    /// Times a worker found the queue full
    pub backpressure_events: u64,

    /// Number of errors encountered
    pub errors: u64,

    /// Number of directories or entries skipped
    pub skipped: u64,

    /// Workers that ran
    pub workers: usize,

    /// Time taken for the walk
    pub duration: Duration,

    /// Whether the walk ran to exhaustion (vs was aborted)
    pub completed: bool,
}

impl WalkResult {
    fn from_stats(
        stats: AggregateStats,
        paths_written: u64,
        backpressure_events: u64,
        workers: usize,
        duration: Duration,
        completed: bool,
    ) -> Self {
        Self {
            total_dirs: stats.dirs,
            total_files: stats.files,
            paths_written,
            duplicates: stats.duplicates,
            ignored: stats.ignored,
            inline_processed: stats.inline,
            backpressure_events,
            errors: stats.errors,
            skipped: stats.skipped,
            workers,
            duration,
            completed,
        }
    }
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Directories processed
    pub dirs: u64,

    /// Files emitted
    pub files: u64,

    /// Entries ignored
    pub ignored: u64,

    /// Current queue size
    pub queue_size: usize,

    /// Tasks still outstanding
    pub in_flight: i64,

    /// Active workers
    pub active_workers: usize,

    /// Total workers
    pub total_workers: usize,

    /// Errors encountered
    pub errors: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Calculate files per second rate
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.files as f64 / secs
        } else {
            0.0
        }
    }

    /// Calculate dirs per second rate
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates the parallel directory walk
pub struct WalkCoordinator {
    /// Configuration
    config: WalkConfig,

    /// Read-only rules shared by all workers
    rules: Arc<RuleSet>,

    /// Directory listing source
    lister: Arc<dyn DirLister>,

    /// Emitted-path registry
    seen: Arc<SeenSet>,
}

impl WalkCoordinator {
    /// Create a coordinator that walks the local filesystem
    pub fn new(config: WalkConfig, rules: RuleSet) -> Self {
        Self {
            config,
            rules: Arc::new(rules),
            lister: Arc::new(FsLister),
            seen: Arc::new(SeenSet::new()),
        }
    }

    /// Replace the listing source
    pub fn with_lister(mut self, lister: Arc<dyn DirLister>) -> Self {
        self.lister = lister;
        self
    }

    /// Share an existing seen set with this walk
    pub fn with_seen_set(mut self, seen: Arc<SeenSet>) -> Self {
        self.seen = seen;
        self
    }

    /// The seen set this walk records into
    pub fn seen_set(&self) -> Arc<SeenSet> {
        Arc::clone(&self.seen)
    }

    /// Run the walk, writing accepted paths to `out`
    ///
    /// Returns once every worker has exited and the output is flushed; the
    /// stream is handed back with the result.
    pub fn run<W: Write + Send + 'static>(self, out: W) -> Result<(WalkResult, W)> {
        self.execute(out, None::<fn(&WalkProgress)>)
    }

    /// Run the walk, calling `on_progress` periodically while it is active
    pub fn run_with_progress<W, F>(self, out: W, on_progress: F) -> Result<(WalkResult, W)>
    where
        W: Write + Send + 'static,
        F: FnMut(&WalkProgress),
    {
        self.execute(out, Some(on_progress))
    }

    /// Without a callback the workers are joined directly
    fn execute<W, F>(self, out: W, on_progress: Option<F>) -> Result<(WalkResult, W)>
    where
        W: Write + Send + 'static,
        F: FnMut(&WalkProgress),
    {
        let start_time = Instant::now();
        let config = &self.config;

        info!(
            root = %config.root,
            workers = config.worker_count,
            rules = self.rules.len(),
            "Starting directory walk"
        );

        let queue = WorkQueue::with_poll_interval(config.queue_size, config.poll_interval);
        let termination = Arc::new(Termination::new());
        let writer = PathWriter::new(out, DEFAULT_CHANNEL_SIZE)?;

        // Seed the root; the count is positive before any worker exists
        termination.register();
        queue
            .sender()
            .push(DirTask::new(config.root.clone()))
            .map_err(|_| WorkerError::QueueClosed)?;

        let ctx = WorkerContext {
            root: Arc::from(config.root.as_str()),
            rules: Arc::clone(&self.rules),
            lister: Arc::clone(&self.lister),
            seen: Arc::clone(&self.seen),
            termination: Arc::clone(&termination),
            queue_tx: queue.sender(),
            queue_rx: queue.receiver(),
            writer: writer.handle(),
        };

        let mut workers = spawn_workers(config.worker_count, &ctx)?;
        drop(ctx);

        let total_workers = workers.len();
        if let Some(mut on_progress) = on_progress {
            while !workers.iter().all(Worker::is_finished) {
                let stats = aggregate_stats(&workers);
                on_progress(&WalkProgress {
                    dirs: stats.dirs,
                    files: stats.files,
                    ignored: stats.ignored,
                    queue_size: queue.len(),
                    in_flight: termination.in_flight(),
                    active_workers: workers.iter().filter(|w| !w.is_finished()).count(),
                    total_workers,
                    errors: stats.errors,
                    elapsed: start_time.elapsed(),
                });
                thread::sleep(PROGRESS_INTERVAL);
            }
        }

        let panicked = join_workers(&mut workers);
        let stats = aggregate_stats(&workers);
        let backpressure_events = queue.stats().backpressure_count();

        // Every worker's writer handle is gone now
        let (out, paths_written) = writer.finish()?;

        if let Some(e) = panicked {
            return Err(e.into());
        }

        let completed = termination.is_shutdown() && !termination.is_aborted();
        let duration = start_time.elapsed();

        info!(
            dirs = stats.dirs,
            files = stats.files,
            ignored = stats.ignored,
            duplicates = stats.duplicates,
            errors = stats.errors,
            inline = stats.inline,
            backpressure = backpressure_events,
            duration_ms = duration.as_millis() as u64,
            "Walk completed"
        );

        Ok((
            WalkResult::from_stats(
                stats,
                paths_written,
                backpressure_events,
                total_workers,
                duration,
                completed,
            ),
            out,
        ))
    }
}

/// Spawn worker threads
///
/// Individual spawn failures are logged; only a pool with no workers at all
/// is an error.
fn spawn_workers(
    count: usize,
    ctx: &WorkerContext,
) -> std::result::Result<Vec<Worker>, WorkerError> {
    let mut workers = Vec::with_capacity(count);
    let mut last_error = None;

    for id in 0..count {
        match Worker::spawn(id, ctx.clone()) {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                warn!(worker = id, error = %e, "Failed to spawn worker");
                last_error = Some(e);
            }
        }
    }

    if workers.is_empty() {
        if let Some(e) = last_error {
            return Err(e);
        }
    }

    info!(count = workers.len(), "Workers spawned");
    Ok(workers)
}

/// Join all worker threads, returning the first failure
fn join_workers(workers: &mut [Worker]) -> Option<WorkerError> {
    let mut first_error = None;

    for worker in workers.iter_mut() {
        let id = worker.id();
        match worker.join() {
            Ok(()) => debug!(worker = id, "Worker joined"),
            Err(e) => {
                error!(error = %e, "Worker failed to join cleanly");
                first_error.get_or_insert(e);
            }
        }
    }

    first_error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalize_root;
    use std::fs;

    #[test]
    fn test_walk_progress_rates() {
        let progress = WalkProgress {
            dirs: 1000,
            files: 10000,
            ignored: 50,
            queue_size: 500,
            in_flight: 600,
            active_workers: 4,
            total_workers: 8,
            errors: 5,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.files_per_second() - 1000.0).abs() < 0.1);
        assert!((progress.dirs_per_second() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_run_small_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.txt"), "").unwrap();
        fs::write(dir.path().join("a/b/deep.txt"), "").unwrap();
        fs::write(dir.path().join("a/skip.log"), "").unwrap();

        let mut config = WalkConfig::for_root(normalize_root(dir.path()).unwrap());
        config.worker_count = 3;
        let rules = RuleSet::from_lines(["*.log"]);

        let (result, out) = WalkCoordinator::new(config, rules).run(Vec::new()).unwrap();

        let mut lines: Vec<_> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect();
        lines.sort();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("deep.txt"));
        assert!(lines[1].ends_with("top.txt"));
        assert_eq!(result.total_dirs, 3);
        assert_eq!(result.total_files, 2);
        assert_eq!(result.paths_written, 2);
        assert_eq!(result.ignored, 1);
        assert!(result.completed);
    }

    #[test]
    fn test_run_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "").unwrap();

        let mut config = WalkConfig::for_root(normalize_root(dir.path()).unwrap());
        config.worker_count = 2;

        let mut max_workers = 0;
        let (result, _) = WalkCoordinator::new(config, RuleSet::new().or_match_all())
            .run_with_progress(Vec::new(), |p| {
                assert!(p.active_workers <= p.total_workers);
                max_workers = max_workers.max(p.total_workers);
            })
            .unwrap();

        assert!(result.completed);
        assert_eq!(result.total_files, 1);
        assert_eq!(result.workers, 2);
        assert!(max_workers == 0 || max_workers == 2);
    }

    #[test]
    fn test_run_without_callback_joins_directly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only.txt"), "").unwrap();

        let mut config = WalkConfig::for_root(normalize_root(dir.path()).unwrap());
        config.worker_count = 1;

        let (result, _) = WalkCoordinator::new(config, RuleSet::new())
            .run(Vec::new())
            .unwrap();

        assert!(result.completed);
        assert_eq!(result.total_files, 1);
        assert!(
            result.duration < PROGRESS_INTERVAL,
            "walk waited for a progress tick: {:?}",
            result.duration
        );
    }

    #[test]
    fn test_backpressure_counted_in_result() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c", "d"] {
            fs::create_dir(dir.path().join(name)).unwrap();
            fs::write(dir.path().join(name).join("f.txt"), "").unwrap();
        }

        let mut config = WalkConfig::for_root(normalize_root(dir.path()).unwrap());
        config.worker_count = 1;
        config.queue_size = 1;

        let (result, _) = WalkCoordinator::new(config, RuleSet::new())
            .run(Vec::new())
            .unwrap();

        // One slot: after the first child is queued the rest overflow
        assert_eq!(result.total_files, 4);
        assert!(result.backpressure_events >= 3);
        assert_eq!(result.inline_processed, result.backpressure_events);
        assert!(result.completed);
    }

    #[test]
    fn test_shared_seen_set_suppresses_second_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("once.txt"), "").unwrap();
        let root = normalize_root(dir.path()).unwrap();
        let seen = Arc::new(SeenSet::new());

        let first = WalkCoordinator::new(WalkConfig::for_root(root.clone()), RuleSet::new())
            .with_seen_set(Arc::clone(&seen))
            .run(Vec::new())
            .unwrap()
            .0;
        let second = WalkCoordinator::new(WalkConfig::for_root(root), RuleSet::new())
            .with_seen_set(Arc::clone(&seen))
            .run(Vec::new())
            .unwrap()
            .0;

        assert_eq!(first.total_files, 1);
        assert_eq!(second.total_files, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(seen.len(), 1);
    }
}
