//! Working-day aware assignment generator
//!
//! Turns a pool of unplanned candidates into a date/group schedule in a
//! single deterministic pass:
//!
//! 1. filter the pool by region, district and restricted-transit flag
//! 2. order it by `latitude + longitude` so neighbours end up adjacent
//! 3. fill each working day with `shops_per_day` candidates, cycling the
//!    group number by position within the day
//!
//! The generator performs no I/O and touches no shared state.

use chrono::NaiveDate;
use std::collections::HashSet;

use super::error::{SchedulerError, SchedulerResult};
use super::schedule::Schedule;
use crate::calendar::WorkingDayCalendar;
use crate::models::{Candidate, ScheduleAssignment};

// ============================================================================
// Candidate Filter
// ============================================================================

/// Attribute filter applied to the pool before assignment
///
/// An empty region or district set matches every candidate.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    regions: HashSet<String>,
    districts: HashSet<String>,
    include_restricted: bool,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            regions: HashSet::new(),
            districts: HashSet::new(),
            include_restricted: true,
        }
    }
}

impl CandidateFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given regions
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given districts
    pub fn with_districts<I, S>(mut self, districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.districts = districts.into_iter().map(Into::into).collect();
        self
    }

    /// Whether restricted-transit candidates are kept
    pub fn include_restricted(mut self, include: bool) -> Self {
        self.include_restricted = include;
        self
    }

    /// Check a candidate against the filter
    pub fn matches(&self, candidate: &Candidate) -> bool {
        (self.regions.is_empty() || self.regions.contains(&candidate.region))
            && (self.districts.is_empty() || self.districts.contains(&candidate.district))
            && (self.include_restricted || !candidate.restricted_transit)
    }
}

// ============================================================================
// Generation Parameters
// ============================================================================

/// Parameters for a single generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    /// First candidate date, need not be a working day
    pub start_date: NaiveDate,

    /// Candidates per working day
    pub shops_per_day: u32,

    /// Groups per working day
    pub groups_per_day: u32,
}

impl GenerationParams {
    /// Create generation parameters
    pub fn new(start_date: NaiveDate, shops_per_day: u32, groups_per_day: u32) -> Self {
        Self {
            start_date,
            shops_per_day,
            groups_per_day,
        }
    }

    /// Reject zero capacities
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.shops_per_day == 0 {
            return Err(SchedulerError::not_positive(
                "shops_per_day",
                i64::from(self.shops_per_day),
            ));
        }
        if self.groups_per_day == 0 {
            return Err(SchedulerError::not_positive(
                "groups_per_day",
                i64::from(self.groups_per_day),
            ));
        }
        Ok(())
    }
}

/// Group number for the candidate at `index` in the ordered pool
///
/// Groups cycle by position within the day, so every day starts at group 1
/// even when `groups_per_day` does not divide `shops_per_day`. When groups
/// outnumber the daily capacity the higher groups stay empty.
pub fn group_for_index(index: usize, shops_per_day: u32, groups_per_day: u32) -> u32 {
    let position_in_day = index % shops_per_day as usize;
    (position_in_day % groups_per_day as usize) as u32 + 1
}

// ============================================================================
// Assignment Generator
// ============================================================================

/// Maps a candidate pool onto working days and groups
#[derive(Debug, Clone, Default)]
pub struct AssignmentGenerator {
    calendar: WorkingDayCalendar,
}

impl AssignmentGenerator {
    /// Create a generator using the given calendar
    pub fn new(calendar: WorkingDayCalendar) -> Self {
        Self { calendar }
    }

    /// Calendar in effect for this generator
    pub fn calendar(&self) -> &WorkingDayCalendar {
        &self.calendar
    }

    /// Generate a schedule for the pool
    ///
    /// Returns an empty schedule when nothing passes the filter. Only
    /// unplanned candidates are ever considered.
    pub fn generate(
        &self,
        pool: &[Candidate],
        filter: &CandidateFilter,
        params: &GenerationParams,
    ) -> SchedulerResult<Schedule> {
        params.validate()?;

        if params.groups_per_day > params.shops_per_day {
            tracing::warn!(
                shops_per_day = params.shops_per_day,
                groups_per_day = params.groups_per_day,
                "More groups than daily capacity, some groups will stay empty"
            );
        }

        let mut eligible: Vec<&Candidate> = pool
            .iter()
            .filter(|c| c.status.is_schedulable() && filter.matches(c))
            .collect();

        tracing::debug!(
            pool = pool.len(),
            eligible = eligible.len(),
            "Filtered candidate pool"
        );

        if eligible.is_empty() {
            return Ok(Schedule::default());
        }

        // stable, so equal keys keep pool order
        eligible.sort_by(|a, b| a.locality_key().total_cmp(&b.locality_key()));

        let shops_per_day = params.shops_per_day as usize;
        let mut current_date = self.calendar.next_working_day(params.start_date);
        let mut assignments = Vec::with_capacity(eligible.len());

        for (i, candidate) in eligible.into_iter().enumerate() {
            let group = group_for_index(i, params.shops_per_day, params.groups_per_day);
            assignments.push(ScheduleAssignment::new(
                candidate.clone(),
                current_date,
                group,
            ));

            if (i + 1) % shops_per_day == 0 {
                current_date = self.calendar.following_working_day(current_date);
            }
        }

        assignments.sort_by(|a, b| (a.date, a.group).cmp(&(b.date, b.group)));

        let schedule = Schedule::new(assignments);
        tracing::info!(
            assignments = schedule.len(),
            first_date = ?schedule.first_date(),
            last_date = ?schedule.last_date(),
            "Generated schedule"
        );

        Ok(schedule)
    }
}
