//! Schedule data structures
//!
//! A [`Schedule`] is the generator's ordered output. It can be summarised
//! for display and persisted as JSON between the `plan` and `sync` steps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::error::{SchedulerError, SchedulerResult};
use crate::models::ScheduleAssignment;

// ============================================================================
// Schedule
// ============================================================================

/// Ordered list of assignments, sorted by date then group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub assignments: Vec<ScheduleAssignment>,

    /// When this schedule was generated
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Schedule {
    /// Wrap generated assignments
    pub fn new(assignments: Vec<ScheduleAssignment>) -> Self {
        Self {
            assignments,
            generated_at: Utc::now(),
        }
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True when no candidate was eligible
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterate assignments in presentation order
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleAssignment> {
        self.assignments.iter()
    }

    /// Earliest assigned date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.assignments.iter().map(|a| a.date).min()
    }

    /// Latest assigned date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.assignments.iter().map(|a| a.date).max()
    }

    /// Assignments for a single date
    pub fn for_date(&self, date: NaiveDate) -> Vec<&ScheduleAssignment> {
        self.assignments.iter().filter(|a| a.date == date).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut per_group: BTreeMap<u32, usize> = BTreeMap::new();

        for assignment in &self.assignments {
            *per_date.entry(assignment.date).or_insert(0) += 1;
            *per_group.entry(assignment.group).or_insert(0) += 1;
        }

        ScheduleSummary {
            total_assignments: self.assignments.len(),
            working_days: per_date.len(),
            first_date: self.first_date(),
            last_date: self.last_date(),
            per_date,
            per_group,
        }
    }

    /// Consume into the underlying assignments
    pub fn into_assignments(self) -> Vec<ScheduleAssignment> {
        self.assignments
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> SchedulerResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> SchedulerResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to file
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> SchedulerResult<()> {
        let json = self.to_json()?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|e| SchedulerError::io_error("save_schedule", e.to_string()))?;
        Ok(())
    }

    /// Load from file
    pub async fn load_from_file(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let json = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| SchedulerError::io_error("load_schedule", e.to_string()))?;
        Self::from_json(&json)
    }
}

/// Schedule summary statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub total_assignments: usize,
    pub working_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub per_date: BTreeMap<NaiveDate, usize>,
    pub per_group: BTreeMap<u32, usize>,
}
