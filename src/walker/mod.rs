//! Parallel directory walker
//!
//! A fixed pool of worker threads shares one bounded queue of directory
//! tasks. Each worker lists a directory, filters the children through the
//! rule set, queues surviving subdirectories and sends surviving files to the
//! output writer. The walk ends when the termination detector sees the last
//! outstanding task complete.
//!
//! # Architecture
//!
//! ```text
//!                   ┌──────────────────────────┐
//!                   │     WalkCoordinator      │
//!                   │  seed root, spawn, join  │
//!                   └────────────┬─────────────┘
//!                                │
//!                                ▼
//!                   ┌──────────────────────────┐
//!        ┌─────────▶│        WorkQueue         │◀─────────┐
//!        │          │   (crossbeam bounded)    │          │
//!        │          └────────────┬─────────────┘          │
//!        │ try_push              │ pop                    │ try_push
//!        │        ┌──────────────┼──────────────┐         │
//!        │        ▼              ▼              ▼         │
//!   ┌────┴────┐ ┌─────────┐ ┌─────────┐               ┌───┴─────┐
//!   │Worker 1 │ │Worker 2 │ │Worker 3 │     ...       │Worker N │
//!   │ backlog │ │ backlog │ │ backlog │               │ backlog │
//!   └────┬────┘ └────┬────┘ └────┬────┘               └────┬────┘
//!        │           │           │  RuleSet / SeenSet      │
//!        └───────────┴─────┬─────┴─────────────────────────┘
//!                          ▼
//!              ┌──────────────────────┐      ┌─────────────┐
//!              │      PathWriter      │      │ Termination │
//!              │  one path per line   │      │ in-flight=0 │
//!              └──────────────────────┘      └─────────────┘
//! ```

pub mod coordinator;
pub mod listing;
pub mod queue;
pub mod seen;
pub mod termination;
pub mod worker;

pub use coordinator::{WalkCoordinator, WalkProgress, WalkResult};
pub use listing::{DirLister, EntryType, FsLister, ListedEntry, Listing};
pub use queue::{DirTask, WorkQueue};
pub use seen::SeenSet;
pub use termination::Termination;
