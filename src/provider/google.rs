//! Google Distance Matrix client.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{DistanceEstimate, DistanceProvider, ProviderError};
use crate::config::ProviderConfig;

/// Distance Matrix client asking for a "depart now", `best_guess`
/// traffic estimate.
///
/// Success requires both the top-level and the element status to be `OK`.
#[derive(Debug, Clone)]
pub struct GoogleDistanceMatrix {
    client: reqwest::Client,
    base: Url,
    api_key: String,
    timeout: std::time::Duration,
}

impl GoogleDistanceMatrix {
    /// Builds a client from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotConfigured`] if the endpoint URL does not
    /// parse, or [`ProviderError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base: Url = config
            .url
            .parse()
            .map_err(|e| ProviderError::NotConfigured(format!("{} is not a valid url: {e}", config.url)))?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    fn request_url(&self, origin: &str, destination: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("origins", origin)
            .append_pair("destinations", destination)
            .append_pair("departure_time", "now")
            .append_pair("traffic_model", "best_guess")
            .append_pair("key", &self.api_key);
        url
    }
}

#[async_trait]
impl DistanceProvider for GoogleDistanceMatrix {
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DistanceEstimate, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("missing API key".to_string()));
        }

        let response = self
            .client
            .get(self.request_url(origin, destination))
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()?;

        let body: MatrixResponse = response.json().await.map_err(|e| self.classify(e))?;
        body.into_estimate()
    }
}

impl GoogleDistanceMatrix {
    fn classify(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Distance Matrix JSON response.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    /// Top-level status code.
    pub status: String,
    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
    /// Explanation accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One origin's row of elements.
#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    /// One element per destination.
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// Result for one origin/destination pair.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    /// Element status code.
    pub status: String,
    /// Free-flow duration.
    #[serde(default)]
    pub duration: Option<MatrixValue>,
    /// Traffic-aware duration.
    #[serde(default)]
    pub duration_in_traffic: Option<MatrixValue>,
    /// Route length.
    #[serde(default)]
    pub distance: Option<MatrixValue>,
}

/// A `{ "value": .., "text": .. }` pair; only the value is used.
#[derive(Debug, Deserialize)]
pub struct MatrixValue {
    /// Seconds or meters.
    pub value: i32,
}

impl MatrixResponse {
    /// Applies the status policy and extracts the first element.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Status`] or [`ProviderError::ElementStatus`]
    /// for non-`OK` codes, [`ProviderError::MissingElement`] when there is
    /// no element, and [`ProviderError::Decode`] when an `OK` element lacks
    /// duration or distance.
    pub fn into_estimate(self) -> Result<DistanceEstimate, ProviderError> {
        if self.status != "OK" {
            let status = match self.error_message {
                Some(message) => format!("{}: {message}", self.status),
                None => self.status,
            };
            return Err(ProviderError::Status(status));
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or(ProviderError::MissingElement)?;

        if element.status != "OK" {
            return Err(ProviderError::ElementStatus(element.status));
        }

        let duration = element
            .duration
            .ok_or_else(|| ProviderError::Decode("element has no duration".to_string()))?;
        let distance = element
            .distance
            .ok_or_else(|| ProviderError::Decode("element has no distance".to_string()))?;

        Ok(DistanceEstimate {
            duration_seconds: duration.value,
            duration_in_traffic_seconds: element.duration_in_traffic.map(|d| d.value),
            distance_meters: distance.value,
        })
    }
}
