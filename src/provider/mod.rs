//! Distance provider: travel-time estimates for an origin/destination pair.
//!
//! The monitoring loop only sees the [`DistanceProvider`] trait. The
//! production implementation is [`GoogleDistanceMatrix`]; tests plug in
//! scripted providers.

pub mod google;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

pub use google::GoogleDistanceMatrix;

/// One estimate for leaving now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DistanceEstimate {
    /// Free-flow duration in seconds.
    pub duration_seconds: i32,
    /// Traffic-aware duration in seconds, when the provider returned one.
    pub duration_in_traffic_seconds: Option<i32>,
    /// Route length in meters.
    pub distance_meters: i32,
}

/// Reasons a provider call produced no estimate.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider has no credentials or a malformed endpoint.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Network or HTTP-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call did not finish in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Top-level status other than `OK`.
    #[error("provider returned status {0}")]
    Status(String),

    /// Element status other than `OK` (e.g. `NOT_FOUND`, `ZERO_RESULTS`).
    #[error("route element returned status {0}")]
    ElementStatus(String),

    /// The response carried no row or element for the pair.
    #[error("response has no route element")]
    MissingElement,

    /// The element was `OK` but a required field was absent.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Source of travel-time estimates.
#[async_trait]
pub trait DistanceProvider: Send + Sync + std::fmt::Debug {
    /// Estimates the trip from `origin` to `destination` departing now.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when no usable estimate is available.
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DistanceEstimate, ProviderError>;
}
