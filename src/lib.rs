//! visitplan - Working-day aware visit scheduling
//!
//! Turns a pool of candidate locations into a dated, grouped visit schedule
//! that skips weekends and public holidays, then pushes the schedule to a
//! remote record store with bounded concurrency and retry.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`calendar`] - Holiday tables and working-day arithmetic
//! - [`scheduler`] - Candidate filtering, ordering and assignment generation
//! - [`sync`] - Concurrent batch synchronizer with retry and cancellation
//! - [`store`] - HTTP client for the remote record store
//! - [`models`] - Core data structures and types
//! - [`config`] - Configuration management and settings
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use visitplan::calendar::WorkingDayCalendar;
//! use visitplan::config::Config;
//! use visitplan::scheduler::{AssignmentGenerator, CandidateFilter, GenerationParams};
//! use visitplan::store::RecordStoreClient;
//! use visitplan::sync::{BatchOptions, BatchSynchronizer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = RecordStoreClient::new(&config.store)?;
//!
//!     let candidates = store.fetch_candidates().await?;
//!     let start = chrono::Local::now().date_naive();
//!     let params = GenerationParams::new(start, 9, 3);
//!     let schedule = AssignmentGenerator::new(WorkingDayCalendar::hong_kong())
//!         .generate(&candidates, &CandidateFilter::new(), &params)?;
//!
//!     let synchronizer = BatchSynchronizer::new(BatchOptions::from_config(&config.sync));
//!     let result = synchronizer.run(schedule.into_assignments(), &store).await?;
//!     println!("{} updated, {} failed", result.success_count(), result.failure_count());
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::calendar::{CalendarYearTable, WorkingDayCalendar};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, VisitplanErrorTrait};
    pub use crate::models::{Candidate, CandidateStatus, ScheduleAssignment};
    pub use crate::scheduler::{AssignmentGenerator, CandidateFilter, GenerationParams, Schedule};
    pub use crate::store::RecordStoreClient;
    pub use crate::sync::{
        BatchOptions, BatchResult, BatchSynchronizer, CancellationHandle, ItemError, ItemOperation,
    };
}

// Direct re-exports for convenience
pub use models::{Candidate, CandidateStatus, ScheduleAssignment};
