//! # Shortid Backfill
//!
//! Online population of display identifiers for pre-existing records while
//! the live system keeps reading and writing.
//!
//! ## Pipeline
//!
//! ```text
//! EntityKind (declared order)
//!     │
//!     ├──> count unassigned ──> "no work" or
//!     │
//!     ├──> page of unassigned keys
//!     │      └─> per record, concurrently:
//!     │            mint candidate ─> collision check ─> conditional write
//!     │
//!     └──> post-run duplicate validation
//! ```
//!
//! The orchestrator is stateless between runs: "where it left off" is always
//! recomputed from which records currently lack a display identifier, never
//! from a checkpoint. Every write is a single-record conditional update, so
//! interrupting between pages loses progress, not correctness, and multiple
//! instances may run against the same store without external locking.
//!
//! ## Example
//!
//! ```no_run
//! use shortid_backfill::{BackfillConfig, BackfillRunner, MemoryStore, NullSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let runner = BackfillRunner::new(store, BackfillConfig::default());
//!     let report = runner.run(&NullSink).await?;
//!
//!     println!("processed {} records", report.totals.processed);
//!     Ok(())
//! }
//! ```

mod error;
mod json_store;
mod memory;
mod orchestrator;
mod progress;
mod report;
mod store;
mod validate;

pub use error::{BackfillError, Result};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;
pub use orchestrator::{BackfillConfig, BackfillRunner, MAX_COLLISION_PASSES};
pub use progress::{NullSink, ProgressEvent, ProgressSink};
pub use report::{BackfillReport, KindStats, ReportGate};
pub use store::{InternalKey, RecordStore, StoreError};
pub use validate::{find_duplicates, DuplicateViolation};
