//! Concurrent batch synchronization
//!
//! Pushes per-item updates to a remote store under unreliable network
//! conditions, with bounded concurrency, retry with exponential backoff and
//! a complete accounting of what succeeded and what did not.
//!
//! # Item lifecycle
//!
//! ```text
//! Pending ──► InFlight ──► Succeeded
//!                │  ▲
//!                │  └── Retrying  (transient error, budget left)
//!                ▼
//!              Failed            (permanent error, or budget exhausted)
//! ```
//!
//! Bad request, unauthorized, forbidden and not-found are permanent and
//! never retried. Everything else waits `base * 2^n` before retry `n`.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use visitplan::sync::{BatchOptions, BatchSynchronizer, ItemError, ItemOperation};
//!
//! struct Touch;
//!
//! #[async_trait]
//! impl ItemOperation<String> for Touch {
//!     async fn execute(&self, _item: &String) -> Result<(), ItemError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), visitplan::sync::SyncError> {
//!     let synchronizer = BatchSynchronizer::new(
//!         BatchOptions::new().on_progress(|p| println!("{}/{}", p.processed, p.total)),
//!     );
//!     let items = vec!["a".to_string(), "b".to_string()];
//!
//!     let result = synchronizer.run(items, &Touch).await?;
//!     if result.failure_count() > 0 {
//!         let retried = synchronizer.retry_failed(&result, &Touch).await?;
//!         println!("recovered {}", retried.success_count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod operation;
pub mod options;
pub mod result;

pub use batch::{BatchSynchronizer, RETRY_PASS_MAX_RETRIES};
pub use error::{ItemError, SyncError, SyncResult};
pub use operation::ItemOperation;
pub use options::{
    BatchOptions, BatchProgress, CancellationHandle, ItemNamer, ProgressCallback,
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES,
};
pub use result::{BatchResult, FailedItem};
