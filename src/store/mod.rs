//! Remote record store client
//!
//! HTTP client for the store that holds candidate records. It is both the
//! candidate source (`GET {base}/records`) and the per-item update operation
//! used by the batch synchronizer (`PATCH {base}/records/{id}`).
//!
//! Every request goes through a shared rate limiter and carries the
//! configured timeout; the synchronizer itself never times operations out.

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::StoreConfig;
use crate::models::{Candidate, CandidateStatus, ScheduleAssignment};
use crate::sync::{ItemError, ItemOperation};

type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

// ============================================================================
// Store Errors
// ============================================================================

/// Errors raised by store operations other than per-item updates
#[derive(Error, Debug)]
pub enum StoreError {
    /// Client could not be built
    #[error("Initialization error: {0}")]
    Init(String),

    /// Base URL cannot carry a path
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// Request failed or returned a non-success status
    #[error("Request failed: {0}")]
    Request(#[from] ItemError),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Quota that admits `rate` requests per second on average
///
/// Fractional rates stretch the replenish interval beyond one second. Bursts
/// are capped at the whole number of requests per second, and at least one.
fn quota_for(rate: f64) -> Result<Quota, StoreError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(StoreError::Init(format!(
            "rate_limit must be positive, got {rate}"
        )));
    }

    let burst = NonZeroU32::new(rate.floor() as u32).unwrap_or(NonZeroU32::MIN);
    Duration::try_from_secs_f64(1.0 / rate)
        .ok()
        .and_then(Quota::with_period)
        .map(|quota| quota.allow_burst(burst))
        .ok_or_else(|| StoreError::Init(format!("rate_limit {rate} is out of range")))
}

// ============================================================================
// Request Bodies
// ============================================================================

/// Body of the assignment update
#[derive(Debug, Serialize)]
struct AssignmentPatch {
    status: CandidateStatus,
    scheduled_date: NaiveDate,
    group: u32,
}

impl From<&ScheduleAssignment> for AssignmentPatch {
    fn from(assignment: &ScheduleAssignment) -> Self {
        Self {
            status: CandidateStatus::Planned,
            scheduled_date: assignment.date,
            group: assignment.group,
        }
    }
}

// ============================================================================
// Record Store Client
// ============================================================================

/// Client for the remote record store
pub struct RecordStoreClient {
    http_client: Client,
    base_url: Url,
    api_token: Option<String>,
    rate_limiter: Arc<DirectRateLimiter>,
}

impl RecordStoreClient {
    /// Create a new store client
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url.clone()));
        }

        let http_client = Client::builder()
            .user_agent(format!("visitplan/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| StoreError::Init(e.to_string()))?;

        let rate_limiter = Arc::new(RateLimiter::direct(quota_for(config.rate_limit)?));

        Ok(Self {
            http_client,
            base_url,
            api_token: config.api_token.clone(),
            rate_limiter,
        })
    }

    /// Read every candidate record
    pub async fn fetch_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let url = self.records_url(None)?;
        tracing::debug!(url = %url, "Fetching candidates");

        let response = self.send(self.http_client.get(url)).await?;
        let candidates: Vec<Candidate> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        tracing::info!(count = candidates.len(), "Fetched candidates");
        Ok(candidates)
    }

    /// Persist one assignment as a single PATCH
    pub async fn update_assignment(&self, assignment: &ScheduleAssignment) -> Result<(), ItemError> {
        let url = self
            .records_url(Some(assignment.candidate_id()))
            .map_err(|e| ItemError::Other(e.to_string()))?;

        tracing::debug!(
            url = %url,
            date = %assignment.date,
            group = assignment.group,
            "Updating assignment"
        );

        let request = self
            .http_client
            .patch(url)
            .json(&AssignmentPatch::from(assignment));
        self.send(request).await?;
        Ok(())
    }

    // Internal: rate limit, authenticate, send and classify the outcome
    async fn send(&self, request: RequestBuilder) -> Result<Response, ItemError> {
        self.rate_limiter.until_ready().await;

        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ItemError::Timeout
            } else {
                ItemError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ItemError::from_status(status.as_u16(), message));
        }

        Ok(response)
    }

    // Internal: `{base}/records` or `{base}/records/{id}`
    fn records_url(&self, id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("records");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ItemOperation<ScheduleAssignment> for RecordStoreClient {
    async fn execute(&self, item: &ScheduleAssignment) -> Result<(), ItemError> {
        self.update_assignment(item).await
    }
}
