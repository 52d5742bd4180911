//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use visitplan::models::{Candidate, ScheduleAssignment};
use visitplan::sync::{ItemError, ItemOperation};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a candidate spread along the diagonal so index order is sort order
pub fn create_candidate(index: usize) -> Candidate {
    Candidate::new(
        format!("S-{index:03}"),
        22.20 + index as f64 * 0.01,
        114.10,
    )
    .with_name(format!("Shop {index}"))
    .with_location("HK", "Central")
}

/// Create `n` unplanned candidates
pub fn create_candidates(n: usize) -> Vec<Candidate> {
    (0..n).map(create_candidate).collect()
}

/// Create `n` assignments on a single date
pub fn create_assignments(n: usize) -> Vec<ScheduleAssignment> {
    create_candidates(n)
        .into_iter()
        .map(|c| ScheduleAssignment::new(c, ymd(2025, 3, 3), 1))
        .collect()
}

/// Deterministic store fake keyed by candidate id
///
/// Ids listed in `failing` answer with the configured error until they have
/// been called `fail_times` times; everything else succeeds.
pub struct FakeStore {
    failing: HashSet<String>,
    error: ItemError,
    fail_times: u32,
    calls: Mutex<HashMap<String, u32>>,
}

impl FakeStore {
    pub fn succeeding() -> Self {
        Self::failing_with(Vec::<String>::new(), ItemError::Timeout, 0)
    }

    pub fn failing_with<I, S>(ids: I, error: ItemError, fail_times: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: ids.into_iter().map(Into::into).collect(),
            error,
            fail_times,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Ids that fail on every call
    pub fn always_failing<I, S>(ids: I, error: ItemError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::failing_with(ids, error, u32::MAX)
    }

    pub fn calls_for(&self, id: &str) -> u32 {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ItemOperation<ScheduleAssignment> for FakeStore {
    async fn execute(&self, item: &ScheduleAssignment) -> Result<(), ItemError> {
        let id = item.candidate_id();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(id.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if self.failing.contains(id) && call <= self.fail_times {
            Err(self.error.clone())
        } else {
            Ok(())
        }
    }
}
