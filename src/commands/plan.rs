use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

use visitplan::config::Config;
use visitplan::models::Candidate;
use visitplan::scheduler::{AssignmentGenerator, CandidateFilter, GenerationParams, Schedule};
use visitplan::store::RecordStoreClient;

use super::classify;

/// Arguments of the `plan` command
pub struct PlanParams {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub start: Option<NaiveDate>,
    pub shops: Option<u32>,
    pub groups: Option<u32>,
    pub regions: Vec<String>,
    pub districts: Vec<String>,
    pub exclude_restricted: bool,
}

pub async fn plan(config: Config, params: PlanParams) -> Result<()> {
    println!("Generating Visit Schedule");
    println!("=========================");

    let calendar = super::load_calendar(&config.calendar)?;

    let candidates = match &params.input {
        Some(path) => load_candidates(path).await?,
        None => {
            let store = RecordStoreClient::new(&config.store).map_err(classify)?;
            store
                .fetch_candidates()
                .await
                .map_err(classify)
                .context("Failed to fetch candidates from record store")?
        }
    };

    let start_date = params
        .start
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    if !calendar.table().covers_year(start_date.year()) {
        tracing::warn!(
            year = start_date.year(),
            "Holiday table has no entry for the start year, only weekends will be skipped"
        );
    }

    let generation = GenerationParams::new(
        start_date,
        params.shops.unwrap_or(config.planning.shops_per_day),
        params.groups.unwrap_or(config.planning.groups_per_day),
    );

    let filter = CandidateFilter::new()
        .with_regions(params.regions)
        .with_districts(params.districts)
        .include_restricted(config.planning.include_restricted && !params.exclude_restricted);

    println!("  Candidates: {}", candidates.len());
    println!("  Start date: {start_date}");
    println!("  Shops per day: {}", generation.shops_per_day);
    println!("  Groups per day: {}", generation.groups_per_day);

    let schedule = AssignmentGenerator::new(calendar)
        .generate(&candidates, &filter, &generation)
        .map_err(classify)?;

    if schedule.is_empty() {
        println!("\nNothing to schedule: no unplanned candidates match the filters");
        return Ok(());
    }

    schedule
        .save_to_file(&params.output)
        .await
        .map_err(classify)
        .with_context(|| format!("Failed to write schedule to {}", params.output.display()))?;

    print_summary(&schedule);
    println!("\nSchedule written to {}", params.output.display());
    Ok(())
}

async fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read candidates from {}", path.display()))?;
    let candidates: Vec<Candidate> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid candidate file {}", path.display()))?;

    tracing::info!(count = candidates.len(), path = %path.display(), "Loaded candidates");
    Ok(candidates)
}

fn print_summary(schedule: &Schedule) {
    let summary = schedule.summary();

    println!("\nSchedule Summary");
    println!("================");
    println!("  Assignments: {}", summary.total_assignments);
    println!("  Working days: {}", summary.working_days);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("  Period: {first} .. {last}");
    }

    println!("\n  Per date:");
    for (date, count) in &summary.per_date {
        println!("    {} ({}): {count}", date, date.weekday());
    }

    println!("\n  Per group:");
    for (group, count) in &summary.per_group {
        println!("    group {group}: {count}");
    }
}
