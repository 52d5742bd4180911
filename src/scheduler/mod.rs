//! Visit scheduling
//!
//! This module turns a pool of unplanned candidate locations into a dated,
//! grouped visit schedule.
//!
//! # Overview
//!
//! Scheduling is a pure, single-threaded pass. The pool is filtered, ordered
//! by a cheap locality key so that neighbouring locations land on the same
//! day, then poured into working days of fixed capacity. Within a day the
//! group number cycles `1..=groups_per_day` by position.
//!
//! ```text
//!  pool ──► filter ──► sort(lat+lon) ──► fill working days ──► sort(date, group)
//!                                            │
//!                                    WorkingDayCalendar
//! ```
//!
//! # Modules
//!
//! - [`generator`] - Filtering and the assignment algorithm
//! - [`schedule`] - Schedule container, summary and JSON persistence
//! - [`error`] - Scheduler errors
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use visitplan::calendar::WorkingDayCalendar;
//! use visitplan::scheduler::{AssignmentGenerator, CandidateFilter, GenerationParams};
//!
//! # fn main() -> visitplan::scheduler::SchedulerResult<()> {
//! let generator = AssignmentGenerator::new(WorkingDayCalendar::hong_kong());
//! let filter = CandidateFilter::new().with_regions(["HK"]);
//! let start = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
//!
//! let schedule = generator.generate(&[], &filter, &GenerationParams::new(start, 9, 3))?;
//! for assignment in schedule.iter() {
//!     println!("{} group {} - {}", assignment.date, assignment.group, assignment.candidate_id());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Parameters
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `shops_per_day` | 9 | Candidates placed on each working day |
//! | `groups_per_day` | 3 | Groups cycled within a day |
//! | `include_restricted` | true | Keep restricted-transit candidates |

pub mod error;
pub mod generator;
pub mod schedule;

// Re-export main types
pub use error::{SchedulerError, SchedulerResult};
pub use generator::{group_for_index, AssignmentGenerator, CandidateFilter, GenerationParams};
pub use schedule::{Schedule, ScheduleSummary};
