//! Working-day calendar
//!
//! A date is a working day unless it falls on a weekend or is listed as a
//! holiday under its year in the [`CalendarYearTable`]. Years missing from
//! the table have no holidays; lookups never fail.
//!
//! The table is loaded once at startup, either from a JSON file of the form
//! `{"2026": ["2026-01-01", ...]}` or from the bundled Hong Kong general
//! holiday list.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Bundled Hong Kong general holidays
const HONG_KONG_HOLIDAYS: &str = include_str!("hk_holidays.json");

/// Result type for calendar loading
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors raised while building a holiday table
#[derive(Error, Debug)]
pub enum CalendarError {
    /// A holiday entry is not an ISO-8601 date
    #[error("Invalid holiday date '{value}' listed under {year}")]
    InvalidDate { year: i32, value: String },

    /// Holiday table JSON could not be parsed
    #[error("Invalid holiday table: {0}")]
    Format(#[from] serde_json::Error),

    /// Holiday file could not be read
    #[error("Failed to read holiday table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Calendar Year Table
// ============================================================================

/// Immutable mapping of year to that year's holidays
#[derive(Debug, Clone, Default)]
pub struct CalendarYearTable {
    holidays: HashMap<i32, HashSet<NaiveDate>>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawYearTable(HashMap<i32, Vec<String>>);

impl CalendarYearTable {
    /// Create an empty table (weekends are the only non-working days)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from year to ISO-8601 date strings
    pub fn from_year_map<I, S>(years: I) -> CalendarResult<Self>
    where
        I: IntoIterator<Item = (i32, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut holidays = HashMap::new();

        for (year, dates) in years {
            let entry: &mut HashSet<NaiveDate> = holidays.entry(year).or_default();
            for value in dates {
                let value = value.as_ref().trim();
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    CalendarError::InvalidDate {
                        year,
                        value: value.to_string(),
                    }
                })?;

                if date.year() != year {
                    tracing::warn!(
                        year = year,
                        date = %date,
                        "Holiday listed under a different year will never match"
                    );
                }
                entry.insert(date);
            }
        }

        Ok(Self { holidays })
    }

    /// Parse a table from JSON
    pub fn from_json_str(json: &str) -> CalendarResult<Self> {
        let raw: RawYearTable = serde_json::from_str(json)?;
        Self::from_year_map(raw.0)
    }

    /// Load a table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> CalendarResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CalendarError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let table = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            years = table.holidays.len(),
            holidays = table.holiday_count(),
            "Loaded holiday table"
        );
        Ok(table)
    }

    /// Bundled Hong Kong general holidays
    pub fn hong_kong() -> Self {
        Self::from_json_str(HONG_KONG_HOLIDAYS).expect("bundled holiday table is valid")
    }

    /// Check whether the date is listed under its own year
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays
            .get(&date.year())
            .is_some_and(|days| days.contains(&date))
    }

    /// Whether the table carries an entry for the year
    pub fn covers_year(&self, year: i32) -> bool {
        self.holidays.contains_key(&year)
    }

    /// Years present in the table, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<_> = self.holidays.keys().copied().collect();
        years.sort_unstable();
        years
    }

    /// Total number of holidays across all years
    pub fn holiday_count(&self) -> usize {
        self.holidays.values().map(HashSet::len).sum()
    }
}

// ============================================================================
// Working Day Calendar
// ============================================================================

/// Decides which dates are eligible for scheduling
#[derive(Debug, Clone, Default)]
pub struct WorkingDayCalendar {
    table: CalendarYearTable,
}

impl WorkingDayCalendar {
    /// Create a calendar over the given holiday table
    pub fn new(table: CalendarYearTable) -> Self {
        Self { table }
    }

    /// Calendar using the bundled Hong Kong holidays
    pub fn hong_kong() -> Self {
        Self::new(CalendarYearTable::hong_kong())
    }

    /// Underlying holiday table
    pub fn table(&self) -> &CalendarYearTable {
        &self.table
    }

    /// A working day is neither Saturday, Sunday nor a listed holiday
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.table.is_holiday(date)
    }

    /// First working day on or after `date`
    ///
    /// There is no iteration cap: holiday tables are assumed never to cover
    /// a full week.
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_working_day(current) {
            current = match current.succ_opt() {
                Some(next) => next,
                None => return current,
            };
        }
        current
    }

    /// First working day strictly after `date`
    pub fn following_working_day(&self, date: NaiveDate) -> NaiveDate {
        match date.succ_opt() {
            Some(next) => self.next_working_day(next),
            None => date,
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
