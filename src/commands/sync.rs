use anyhow::{Context, Result};
use std::path::PathBuf;

use visitplan::config::Config;
use visitplan::models::ScheduleAssignment;
use visitplan::scheduler::Schedule;
use visitplan::store::RecordStoreClient;
use visitplan::sync::{BatchOptions, BatchResult, BatchSynchronizer, CancellationHandle};
use visitplan::utils::truncate_text;

use super::classify;

const ITEM_NAME_LEN: usize = 40;

/// Arguments of the `sync` command
pub struct SyncParams {
    pub schedule: PathBuf,
    pub concurrency: Option<usize>,
    pub retry_failed: bool,
    pub failed_output: Option<PathBuf>,
}

pub async fn sync(config: Config, params: SyncParams) -> Result<()> {
    println!("Synchronizing Schedule");
    println!("======================");

    let schedule = Schedule::load_from_file(&params.schedule)
        .await
        .map_err(classify)
        .with_context(|| format!("Failed to load schedule from {}", params.schedule.display()))?;

    if schedule.is_empty() {
        println!("Schedule is empty, nothing to synchronize");
        return Ok(());
    }

    let store = RecordStoreClient::new(&config.store).map_err(classify)?;

    let mut options = BatchOptions::<ScheduleAssignment>::from_config(&config.sync)
        .with_item_name(|a| truncate_text(a.candidate.display_name(), ITEM_NAME_LEN))
        .on_progress(|p| {
            tracing::info!(
                processed = p.processed,
                total = p.total,
                last = %p.last_item_name,
                "Sync progress"
            );
        });
    if let Some(concurrency) = params.concurrency {
        options = options.with_concurrency(concurrency);
    }

    let cancellation = CancellationHandle::new();
    let signal_handle = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight items");
            signal_handle.cancel();
        }
    });

    let synchronizer = BatchSynchronizer::new(options).with_cancellation(cancellation);

    println!("  Assignments: {}", schedule.len());
    println!("  Store: {}", config.store.base_url);
    println!("  Concurrency: {}", synchronizer.options().concurrency);

    let mut result = synchronizer
        .run(schedule.into_assignments(), &store)
        .await
        .map_err(classify)?;
    print_result("Sync", &result);

    if params.retry_failed && result.failure_count() > 0 && !result.was_cancelled() {
        println!("\nRetrying {} failed assignments...", result.failure_count());
        let retried = synchronizer
            .retry_failed(&result, &store)
            .await
            .map_err(classify)?;
        print_result("Retry", &retried);
        result = retried;
    }

    if let Some(path) = &params.failed_output {
        let leftover: Vec<ScheduleAssignment> = result
            .failed_items()
            .chain(result.skipped())
            .cloned()
            .collect();
        if !leftover.is_empty() {
            Schedule::new(leftover)
                .save_to_file(path)
                .await
                .map_err(classify)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("\nUnsynchronized assignments written to {}", path.display());
        }
    }

    Ok(())
}

fn print_result(label: &str, result: &BatchResult<ScheduleAssignment>) {
    println!("\n{label} Results");
    println!("  Succeeded: {}", result.success_count());
    println!("  Failed: {}", result.failure_count());
    if result.was_cancelled() {
        println!("  Skipped (cancelled): {}", result.skipped().len());
    }

    for failure in result.failed() {
        println!(
            "    {} [{}] after {} attempt(s): {}",
            failure.item.candidate_id(),
            failure.item.candidate.display_name(),
            failure.attempts,
            failure.error
        );
    }
}
