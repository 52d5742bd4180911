pub mod plan;
pub mod sync;

use anyhow::{Context, Result};
use std::path::Path;

use visitplan::calendar::{CalendarYearTable, WorkingDayCalendar};
use visitplan::config::{CalendarConfig, Config};
use visitplan::error::{Error, VisitplanErrorTrait};

// Re-export command functions for convenience
pub use plan::{plan, PlanParams};
pub use sync::{sync, SyncParams};

/// Load configuration from the given file, or from the environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build the working-day calendar from the `[calendar]` section
pub fn load_calendar(config: &CalendarConfig) -> Result<WorkingDayCalendar> {
    let table = match &config.holidays_path {
        Some(path) => CalendarYearTable::from_file(path)
            .map_err(classify)
            .with_context(|| format!("Failed to load holidays from {}", path.display()))?,
        None => CalendarYearTable::hong_kong(),
    };

    tracing::debug!(
        years = ?table.years(),
        holidays = table.holiday_count(),
        "Holiday table ready"
    );
    Ok(WorkingDayCalendar::new(table))
}

/// Lift a library error into the unified error, logging how it is classified
pub fn classify<E: Into<Error>>(err: E) -> Error {
    let err = err.into();
    tracing::error!(
        category = %err.category(),
        recoverable = err.is_recoverable(),
        error = %err,
        "Operation failed"
    );
    err
}
