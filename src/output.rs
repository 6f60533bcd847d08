//! Path output writer
//!
//! Accepted paths are written by a dedicated thread that owns the output
//! stream. Workers send paths over a bounded channel through cloneable
//! [`PathWriterHandle`]s, so no worker ever waits on a stdout lock while
//! holding other shared state.
//!
//! The writer thread exits once every handle has been dropped;
//! [`PathWriter::finish`] then joins it, flushes, and hands the stream back.

use crate::error::WorkerError;
use crossbeam_channel::{bounded, Receiver, SendError, Sender};
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Default channel capacity between workers and the writer thread
pub const DEFAULT_CHANNEL_SIZE: usize = 4096;

/// Statistics about write operations
#[derive(Debug, Default)]
pub struct WriterStats {
    /// Total paths written
    pub paths_written: AtomicU64,
}

impl WriterStats {
    /// Get the number of paths written so far
    pub fn paths_written(&self) -> u64 {
        self.paths_written.load(Ordering::Relaxed)
    }
}

/// Handle for sending paths to the writer
#[derive(Clone)]
pub struct PathWriterHandle {
    sender: Sender<String>,
    stats: Arc<WriterStats>,
}

impl PathWriterHandle {
    /// Queue a path for output
    ///
    /// Fails only if the writer thread has stopped (e.g. the output stream
    /// was closed).
    pub fn send_path(&self, path: String) -> Result<(), SendError<String>> {
        self.sender.send(path)
    }
}

/// Dedicated output thread writing one path per line
pub struct PathWriter<W: Write + Send + 'static> {
    /// Thread handle
    handle: JoinHandle<io::Result<W>>,

    /// Handle kept so `handle()` can mint more senders
    writer_handle: PathWriterHandle,
}

impl<W: Write + Send + 'static> PathWriter<W> {
    /// Spawn the writer thread around `output`
    pub fn new(output: W, channel_size: usize) -> Result<Self, WorkerError> {
        let (sender, receiver) = bounded(channel_size.max(1));
        let stats = Arc::new(WriterStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("path-writer".into())
            .spawn(move || writer_thread(output, receiver, stats_clone))
            .map_err(|e| WorkerError::WriterFailed(format!("Failed to spawn writer thread: {}", e)))?;

        Ok(Self {
            handle,
            writer_handle: PathWriterHandle { sender, stats },
        })
    }

    /// Get a handle for sending paths to the writer
    pub fn handle(&self) -> PathWriterHandle {
        self.writer_handle.clone()
    }

    /// Wait for all queued paths to be written and return the stream
    ///
    /// Every other handle must already be dropped, otherwise this blocks
    /// until they are.
    pub fn finish(self) -> Result<(W, u64), WorkerError> {
        let PathWriter {
            handle,
            writer_handle,
        } = self;
        let stats = Arc::clone(&writer_handle.stats);
        drop(writer_handle);

        let output = match handle.join() {
            Ok(result) => result.map_err(|e| WorkerError::WriterFailed(e.to_string()))?,
            Err(_) => return Err(WorkerError::WriterFailed("Writer thread panicked".into())),
        };

        Ok((output, stats.paths_written()))
    }
}

fn writer_thread<W: Write>(
    output: W,
    receiver: Receiver<String>,
    stats: Arc<WriterStats>,
) -> io::Result<W> {
    let mut out = BufWriter::new(output);

    for path in receiver {
        writeln!(out, "{}", path)?;
        stats.paths_written.fetch_add(1, Ordering::Relaxed);
    }

    out.flush()?;
    out.into_inner().map_err(|e| e.into_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_path_per_line() {
        let writer = PathWriter::new(Vec::new(), 4).unwrap();
        let handle = writer.handle();

        handle.send_path("/data/a.txt".into()).unwrap();
        handle.send_path("/data/b.txt".into()).unwrap();
        drop(handle);

        let (output, written) = writer.finish().unwrap();
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(output).unwrap(), "/data/a.txt\n/data/b.txt\n");
    }

    #[test]
    fn test_many_senders() {
        let writer = PathWriter::new(Vec::new(), 1).unwrap();

        let senders: Vec<_> = (0..4)
            .map(|t| {
                let handle = writer.handle();
                thread::spawn(move || {
                    for i in 0..100 {
                        handle.send_path(format!("/t{}/f{}", t, i)).unwrap();
                    }
                })
            })
            .collect();
        for sender in senders {
            sender.join().unwrap();
        }

        let (output, written) = writer.finish().unwrap();
        assert_eq!(written, 400);
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 400);
    }

    #[test]
    fn test_failing_output_reported() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
        }

        let writer = PathWriter::new(Closed, 4).unwrap();
        let handle = writer.handle();
        let _ = handle.send_path("/x".into());
        drop(handle);

        assert!(matches!(writer.finish(), Err(WorkerError::WriterFailed(_))));
    }
}
