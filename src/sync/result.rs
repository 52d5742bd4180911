//! Aggregated outcome of a batch run

use super::error::ItemError;

/// An item whose operation ended in failure
#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem<T> {
    pub item: T,

    /// Last error encountered
    pub error: ItemError,

    /// Calls made for this item, including the first
    pub attempts: u32,
}

/// Immutable accounting of a batch run
///
/// Lists are in completion order, not input order; match on item identity
/// when correlating with the input.
#[derive(Debug, Clone)]
pub struct BatchResult<T> {
    succeeded: Vec<T>,
    failed: Vec<FailedItem<T>>,
    skipped: Vec<T>,
    cancelled: bool,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> BatchResult<T> {
    /// Result of a run over no items
    pub fn empty() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn new(
        succeeded: Vec<T>,
        failed: Vec<FailedItem<T>>,
        skipped: Vec<T>,
        cancelled: bool,
    ) -> Self {
        Self {
            succeeded,
            failed,
            skipped,
            cancelled,
        }
    }

    /// Items whose operation succeeded
    pub fn succeeded(&self) -> &[T] {
        &self.succeeded
    }

    /// Items whose operation failed, with the last error
    pub fn failed(&self) -> &[FailedItem<T>] {
        &self.failed
    }

    /// Items never dispatched because the run was cancelled
    pub fn skipped(&self) -> &[T] {
        &self.skipped
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Items that reached a terminal state
    pub fn total_processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Items handed to the run, processed or not
    pub fn total_items(&self) -> usize {
        self.total_processed() + self.skipped.len()
    }

    /// Whether the run stopped early on cancellation
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Every item was processed and none failed
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Failed items without their errors
    pub fn failed_items(&self) -> impl Iterator<Item = &T> {
        self.failed.iter().map(|f| &f.item)
    }

    /// Split into succeeded, failed and skipped lists
    pub fn into_parts(self) -> (Vec<T>, Vec<FailedItem<T>>, Vec<T>) {
        (self.succeeded, self.failed, self.skipped)
    }
}
