//! Batch run configuration, progress reporting and cancellation

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::error::{SyncError, SyncResult};
use crate::config::SyncConfig;
use crate::utils::retry::RetryConfig;

/// Default number of operations in flight
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default retries per item after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default base delay before the first retry
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Name reported for items when no namer is configured
pub const DEFAULT_ITEM_NAME: &str = "item";

// ============================================================================
// Progress
// ============================================================================

/// Snapshot reported after each completed chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Items that reached a terminal state so far
    pub processed: usize,

    /// Items in the whole run
    pub total: usize,

    /// Name of the last item of the chunk
    pub last_item_name: String,
}

impl BatchProgress {
    /// Completion ratio in `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Callback invoked synchronously after each chunk
pub type ProgressCallback = Arc<dyn Fn(&BatchProgress) + Send + Sync>;

/// Derives a diagnostic name for an item
pub type ItemNamer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

// ============================================================================
// Batch Options
// ============================================================================

/// Configuration for a batch run; every field has a default
pub struct BatchOptions<T> {
    /// Chunk size and in-flight ceiling
    pub concurrency: usize,

    /// Pause between chunks
    pub batch_delay: Duration,

    /// Retries per item after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further retry
    pub retry_base_delay: Duration,

    /// Upper bound for a single backoff delay
    pub retry_max_delay: Duration,

    /// Progress callback
    pub progress: Option<ProgressCallback>,

    /// Item namer for diagnostics
    pub item_name: Option<ItemNamer<T>>,
}

impl<T> Default for BatchOptions<T> {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_delay: Duration::ZERO,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            retry_max_delay: Duration::from_secs(30),
            progress: None,
            item_name: None,
        }
    }
}

impl<T> Clone for BatchOptions<T> {
    fn clone(&self) -> Self {
        Self {
            concurrency: self.concurrency,
            batch_delay: self.batch_delay,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
            retry_max_delay: self.retry_max_delay,
            progress: self.progress.clone(),
            item_name: self.item_name.clone(),
        }
    }
}

impl<T> fmt::Debug for BatchOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("concurrency", &self.concurrency)
            .field("batch_delay", &self.batch_delay)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_delay", &self.retry_max_delay)
            .field("progress", &self.progress.is_some())
            .field("item_name", &self.item_name.is_some())
            .finish()
    }
}

impl<T> BatchOptions<T> {
    /// Options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from the `[sync]` configuration section
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            retry_max_delay: Duration::from_millis(config.retry_max_delay_ms),
            ..Self::default()
        }
    }

    /// Set concurrency
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the pause between chunks
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Set retries per item
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base backoff delay
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the progress callback
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BatchProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Set the item namer
    pub fn with_item_name<F>(mut self, namer: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.item_name = Some(Arc::new(namer));
        self
    }

    /// Reject options that cannot drive a batch
    pub fn validate(&self) -> SyncResult<()> {
        if self.concurrency == 0 {
            return Err(SyncError::invalid_argument(
                "concurrency",
                "must be greater than 0",
            ));
        }
        if self.retry_max_delay < self.retry_base_delay {
            return Err(SyncError::invalid_argument(
                "retry_max_delay",
                "must not be shorter than retry_base_delay",
            ));
        }
        Ok(())
    }

    /// Backoff schedule for a single item
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_delays(
            self.max_retries,
            self.retry_base_delay.as_millis() as u64,
            self.retry_max_delay.as_millis() as u64,
        )
    }

    /// Diagnostic name for an item
    pub fn name_of(&self, item: &T) -> String {
        match &self.item_name {
            Some(namer) => namer(item),
            None => DEFAULT_ITEM_NAME.to_string(),
        }
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Stops a batch from dispatching further chunks
///
/// Items already in flight run to completion. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationHandle {
    /// Create an untriggered handle
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger cancellation
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation was triggered
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until cancellation is triggered
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
