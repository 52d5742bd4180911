//! Chunked, bounded-concurrency batch execution
//!
//! Items are split into chunks of `concurrency`. A chunk is dispatched all
//! at once and fully joined before the next chunk starts, so no more than
//! `concurrency` operations are ever in flight. Outcomes are folded into the
//! result by the single loop that drains the chunk, in completion order.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::error::{ItemError, SyncResult};
use super::operation::ItemOperation;
use super::options::{BatchOptions, BatchProgress, CancellationHandle, DEFAULT_ITEM_NAME};
use super::result::{BatchResult, FailedItem};
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Retry budget for a retry-failed pass
pub const RETRY_PASS_MAX_RETRIES: u32 = 1;

enum ItemOutcome<T> {
    Succeeded(T),
    Failed(FailedItem<T>),
}

/// Pushes per-item updates with bounded concurrency and retries
pub struct BatchSynchronizer<T> {
    options: BatchOptions<T>,
    cancellation: Option<CancellationHandle>,
}

impl<T> BatchSynchronizer<T> {
    /// Create a synchronizer with the given options
    pub fn new(options: BatchOptions<T>) -> Self {
        Self {
            options,
            cancellation: None,
        }
    }

    /// Create with default options
    pub fn with_defaults() -> Self {
        Self::new(BatchOptions::default())
    }

    /// Attach a cancellation handle
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancellation = Some(handle);
        self
    }

    /// Options in effect
    pub fn options(&self) -> &BatchOptions<T> {
        &self.options
    }

    /// Run `operation` over every item
    ///
    /// Individual failures are recorded in the result and never abort the
    /// run. The only error is an invalid option set, reported before any
    /// item is touched. If cancelled, chunks not yet started are returned
    /// as skipped.
    pub async fn run<O>(&self, items: Vec<T>, operation: &O) -> SyncResult<BatchResult<T>>
    where
        O: ItemOperation<T> + ?Sized,
    {
        self.options.validate()?;

        let total = items.len();
        if total == 0 {
            debug!("Empty batch, nothing to synchronize");
            return Ok(BatchResult::empty());
        }

        let chunk_size = self.options.concurrency;
        let chunk_count = total.div_ceil(chunk_size);
        let retry = self.options.retry_config();

        info!(
            total = total,
            chunks = chunk_count,
            concurrency = chunk_size,
            max_retries = self.options.max_retries,
            "Starting batch"
        );

        let mut succeeded = Vec::with_capacity(total);
        let mut failed = Vec::new();
        let mut processed = 0usize;
        let mut cancelled = false;
        let mut pending = items.into_iter();

        for chunk_index in 0..chunk_count {
            if self.is_cancelled() {
                cancelled = true;
                break;
            }

            let chunk: Vec<T> = pending.by_ref().take(chunk_size).collect();
            let last_item_name = chunk
                .last()
                .map(|item| self.options.name_of(item))
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());

            let mut outcomes = stream::iter(chunk)
                .map(|item| self.process_item(item, operation, &retry))
                .buffer_unordered(chunk_size);

            while let Some(outcome) = outcomes.next().await {
                processed += 1;
                match outcome {
                    ItemOutcome::Succeeded(item) => succeeded.push(item),
                    ItemOutcome::Failed(failure) => failed.push(failure),
                }
            }

            debug!(
                chunk = chunk_index + 1,
                chunks = chunk_count,
                processed = processed,
                succeeded = succeeded.len(),
                failed = failed.len(),
                "Chunk completed"
            );

            self.report_progress(processed, total, last_item_name);

            if chunk_index + 1 < chunk_count && !self.options.batch_delay.is_zero() {
                self.pause_between_chunks().await;
            }
        }

        let skipped: Vec<T> = pending.collect();
        if cancelled {
            warn!(
                processed = processed,
                skipped = skipped.len(),
                "Batch cancelled before completion"
            );
        }

        info!(
            total = total,
            succeeded = succeeded.len(),
            failed = failed.len(),
            skipped = skipped.len(),
            "Batch finished"
        );

        Ok(BatchResult::new(succeeded, failed, skipped, cancelled))
    }

    /// Run again over exactly the failed items of `previous`
    ///
    /// Previous errors are discarded and each item gets a single retry. A
    /// result without failures yields an empty result and the operation is
    /// never called.
    pub async fn retry_failed<O>(
        &self,
        previous: &BatchResult<T>,
        operation: &O,
    ) -> SyncResult<BatchResult<T>>
    where
        T: Clone,
        O: ItemOperation<T> + ?Sized,
    {
        if previous.failure_count() == 0 {
            return Ok(BatchResult::empty());
        }

        let items: Vec<T> = previous.failed_items().cloned().collect();
        info!(items = items.len(), "Retrying failed items");

        let retry_pass = Self {
            options: self
                .options
                .clone()
                .with_max_retries(RETRY_PASS_MAX_RETRIES),
            cancellation: self.cancellation.clone(),
        };
        retry_pass.run(items, operation).await
    }

    async fn process_item<O>(&self, item: T, operation: &O, retry: &RetryConfig) -> ItemOutcome<T>
    where
        O: ItemOperation<T> + ?Sized,
    {
        let mut attempts = 0u32;
        let outcome = with_retry_if(
            retry,
            || {
                attempts += 1;
                operation.execute(&item)
            },
            ItemError::is_transient,
        )
        .await;

        match outcome {
            Ok(()) => ItemOutcome::Succeeded(item),
            Err(error) => {
                warn!(
                    item = %self.options.name_of(&item),
                    attempts = attempts,
                    permanent = error.is_permanent(),
                    error = %error,
                    "Item failed"
                );
                ItemOutcome::Failed(FailedItem {
                    item,
                    error,
                    attempts,
                })
            }
        }
    }

    fn report_progress(&self, processed: usize, total: usize, last_item_name: String) {
        if let Some(callback) = &self.options.progress {
            callback(&BatchProgress {
                processed,
                total,
                last_item_name,
            });
        }
    }

    async fn pause_between_chunks(&self) {
        let delay = self.options.batch_delay;
        match &self.cancellation {
            Some(handle) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = handle.cancelled() => {
                        debug!("Cancelled during inter-chunk delay");
                    }
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationHandle::is_cancelled)
    }
}
