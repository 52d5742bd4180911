//! Core data structures and types
//!
//! Candidates are the location records read from the remote store. The
//! generator only ever plans [`CandidateStatus::Unplanned`] records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a candidate location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Not yet scheduled
    #[default]
    Unplanned,
    /// Assigned a date and group
    Planned,
    /// Visit completed
    Done,
    /// Location closed, never scheduled again
    Closed,
}

impl CandidateStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unplanned => "unplanned",
            Self::Planned => "planned",
            Self::Done => "done",
            Self::Closed => "closed",
        }
    }

    /// Whether a record in this status may enter the assignment generator
    pub fn is_schedulable(&self) -> bool {
        matches!(self, Self::Unplanned)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unplanned" => Ok(Self::Unplanned),
            "planned" => Ok(Self::Planned),
            "done" => Ok(Self::Done),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown candidate status: {s}")),
        }
    }
}

/// A physical location eligible for scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique record identifier in the remote store
    pub id: String,

    /// Human readable name (shop name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// Region code, e.g. "HK", "KLN", "NT"
    #[serde(default)]
    pub region: String,

    /// District within the region
    #[serde(default)]
    pub district: String,

    /// Location is only reachable with restricted transit
    #[serde(default)]
    pub restricted_transit: bool,

    #[serde(default)]
    pub status: CandidateStatus,

    /// Scheduled visit date, set once planned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,

    /// Group number within the scheduled date, set once planned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

impl Candidate {
    /// Create an unplanned candidate at the given coordinates
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            latitude,
            longitude,
            region: String::new(),
            district: String::new(),
            restricted_transit: false,
            status: CandidateStatus::Unplanned,
            scheduled_date: None,
            group: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set region and district
    pub fn with_location(mut self, region: impl Into<String>, district: impl Into<String>) -> Self {
        self.region = region.into();
        self.district = district.into();
        self
    }

    /// Set the restricted-transit flag
    pub fn with_restricted_transit(mut self, restricted: bool) -> Self {
        self.restricted_transit = restricted;
        self
    }

    /// Set the lifecycle status
    pub fn with_status(mut self, status: CandidateStatus) -> Self {
        self.status = status;
        self
    }

    /// Scalar locality key used to order the pool before assignment
    ///
    /// Candidates in the same diagonal band of the coordinate plane end up
    /// next to each other. This is a cheap proxy, not a travel-distance
    /// optimisation.
    pub fn locality_key(&self) -> f64 {
        self.latitude + self.longitude
    }

    /// Name for diagnostics, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A candidate placed on a working day within a numbered group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    pub candidate: Candidate,

    /// Assigned working day
    pub date: NaiveDate,

    /// Group number, 1-based
    pub group: u32,
}

impl ScheduleAssignment {
    /// Create a new assignment
    pub fn new(candidate: Candidate, date: NaiveDate, group: u32) -> Self {
        Self {
            candidate,
            date,
            group,
        }
    }

    /// Candidate id this assignment refers to
    pub fn candidate_id(&self) -> &str {
        &self.candidate.id
    }

    /// The candidate as it looks once the assignment is applied
    pub fn to_planned_candidate(&self) -> Candidate {
        Candidate {
            status: CandidateStatus::Planned,
            scheduled_date: Some(self.date),
            group: Some(self.group),
            ..self.candidate.clone()
        }
    }
}
