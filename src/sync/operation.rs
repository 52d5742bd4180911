//! Per-item remote operation

use async_trait::async_trait;

use super::error::ItemError;

/// One remote call per item
///
/// Implementations perform a single atomic update and classify failures via
/// [`ItemError`]. The synchronizer adds no timeout of its own, so
/// implementations must bound their own network calls.
#[async_trait]
pub trait ItemOperation<T>: Send + Sync {
    /// Apply the update for `item`
    async fn execute(&self, item: &T) -> Result<(), ItemError>;
}
