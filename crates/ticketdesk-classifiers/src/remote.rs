//! HTTP client for the remote classification service

use crate::classifier::TicketClassifier;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use ticketdesk_core::{
    Category, Error, PredictionRequest, PredictionResult, RemoteFailure, Result, TopCategoryScore,
};
use tracing::{debug, warn};

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Number of candidates kept from the remote response
const MAX_TOP_CLASSES: usize = 3;

/// Remote classifier connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the classification service; `/predict` is appended
    pub base_url: String,

    /// Bound on the whole request, connect through body (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// One candidate as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteClass {
    pub label: String,
    pub score: f64,
}

/// Raw response body of `POST /predict`.
///
/// Decoding only checks the JSON shape. [`RemoteResponse::validate`] turns it
/// into a [`PredictionResult`] or a [`RemoteFailure::Malformed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub category: String,
    pub confidence: f64,
    #[serde(default)]
    pub top_classes: Vec<RemoteClass>,
}

impl RemoteResponse {
    /// Validate and normalize into the internal result shape.
    ///
    /// Only the first three candidates are considered. Labels outside the
    /// category set become `Incident`; if that produces a repeated category
    /// the later candidate is dropped, so the list can come back shorter.
    pub fn validate(self) -> std::result::Result<PredictionResult, RemoteFailure> {
        if !is_unit_interval(self.confidence) {
            return Err(RemoteFailure::Malformed(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }

        let mut top_categories: Vec<TopCategoryScore> = Vec::with_capacity(MAX_TOP_CLASSES);
        for class in self.top_classes.into_iter().take(MAX_TOP_CLASSES) {
            if !is_unit_interval(class.score) {
                return Err(RemoteFailure::Malformed(format!(
                    "score {} for '{}' outside [0, 1]",
                    class.score, class.label
                )));
            }

            let category = Category::normalize(&class.label);
            if top_categories.iter().any(|t| t.category == category) {
                debug!(label = %class.label, "dropping duplicate candidate after normalization");
                continue;
            }
            top_categories.push(TopCategoryScore::new(category, class.score));
        }

        // Stable, so equal scores keep the service's order
        top_categories.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(PredictionResult::new(
            Category::normalize(&self.category),
            self.confidence,
            top_categories,
        ))
    }
}

fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Client for the remote classification service.
///
/// Performs exactly one call per prediction. No retries: any failure is
/// reported as [`Error::RemoteUnavailable`] and left to the caller.
pub struct PredictionClient {
    name: String,
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl PredictionClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}/predict", config.base_url.trim_end_matches('/'));

        Ok(Self {
            name: "remote".to_string(),
            http,
            endpoint,
            timeout,
        })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call(&self, request: &PredictionRequest) -> std::result::Result<PredictionResult, RemoteFailure> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFailure::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_failure)?;
        let raw: RemoteResponse = serde_json::from_slice(&body)
            .map_err(|e| RemoteFailure::Malformed(e.to_string()))?;

        raw.validate()
    }
}

#[async_trait::async_trait]
impl TicketClassifier for PredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let start = Instant::now();
        debug!(endpoint = %self.endpoint, "sending remote prediction request");

        match self.call(request).await {
            Ok(result) => {
                debug!(
                    category = %result.category,
                    confidence = result.confidence,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "remote prediction succeeded"
                );
                Ok(result)
            }
            Err(failure) => {
                warn!(
                    endpoint = %self.endpoint,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "remote prediction failed: {}",
                    failure
                );
                Err(Error::RemoteUnavailable(failure))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn transport_failure(err: reqwest::Error) -> RemoteFailure {
    if err.is_timeout() {
        RemoteFailure::Timeout
    } else if err.is_decode() {
        RemoteFailure::Malformed(err.to_string())
    } else {
        RemoteFailure::Network(err.to_string())
    }
}
