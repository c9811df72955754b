//! Prediction orchestration

use crate::admission::AdmissionControl;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use ticketdesk_classifiers::{FallbackClassifier, TicketClassifier};
use ticketdesk_core::{
    Error, HistoryEntry, PredictionRequest, PredictionResult, Result, UserContext,
};
use ticketdesk_history::{build_chart_data, stats, ChartData, HistoryStore, Stats};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Message surfaced to the user when the offline estimate was used
pub const FALLBACK_ADVISORY: &str = "Live prediction failed. Showing offline estimate.";

/// Which classifier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Remote,
    Fallback,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// Everything the front end needs after a prediction completes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub source: PredictionSource,

    /// The history entry that was appended
    pub entry: HistoryEntry,

    /// Set when the result is a degraded (offline) prediction
    pub advisory: Option<String>,

    /// Set when the entry could not be persisted; it is still in memory
    pub persistence_warning: Option<String>,
}

impl PredictionOutcome {
    pub fn is_degraded(&self) -> bool {
        self.source == PredictionSource::Fallback
    }
}

/// Remote classifier -> fallback on failure -> history append.
pub struct PredictionService {
    remote: Arc<dyn TicketClassifier>,
    fallback: FallbackClassifier,
    history: Arc<HistoryStore>,
    admission: AdmissionControl,
}

impl PredictionService {
    pub fn new(
        remote: Arc<dyn TicketClassifier>,
        fallback: FallbackClassifier,
        history: Arc<HistoryStore>,
    ) -> Self {
        info!("Prediction service using remote classifier '{}'", remote.name());
        Self {
            remote,
            fallback,
            history,
            admission: AdmissionControl::new(),
        }
    }

    /// Underlying history store
    pub fn history_store(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Whether a prediction for this user has not resolved yet
    pub fn is_in_flight(&self, ctx: &UserContext) -> bool {
        self.admission.is_in_flight(&ctx.session_key())
    }

    /// Predict a category for the ticket and record it in the caller's history.
    ///
    /// Always yields a usable result unless the call is rejected because the
    /// same user already has a prediction in flight, or `cancel` fires before
    /// the remote call resolves. A cancelled call appends nothing.
    pub async fn predict(
        &self,
        ctx: &UserContext,
        subject: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<PredictionOutcome> {
        let _guard = self.admission.admit(ctx.session_key())?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut request = PredictionRequest::new(subject, body);
        if let Some(user_id) = ctx.persisted_user() {
            request = request.with_user_id(user_id);
        }

        let start = Instant::now();
        let remote = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(user = ctx.label(), "prediction cancelled before the remote call resolved");
                return Err(Error::Cancelled);
            }
            result = self.remote.predict(&request) => result,
        };

        let (result, source, advisory) = match remote {
            Ok(result) => (result, PredictionSource::Remote, None),
            Err(e) => {
                if e.is_fallback_eligible() {
                    warn!(user = ctx.label(), "using offline estimate: {}", e);
                } else {
                    error!(user = ctx.label(), "classifier failed unexpectedly, using offline estimate: {}", e);
                }
                let result = self.fallback.classify(&request.subject, &request.body);
                (result, PredictionSource::Fallback, Some(FALLBACK_ADVISORY.to_string()))
            }
        };

        metrics::histogram!("ticketdesk_prediction_latency_us")
            .record(start.elapsed().as_micros() as f64);
        metrics::counter!("ticketdesk_predictions_total", "source" => source.as_str())
            .increment(1);

        let entry = HistoryEntry::from_prediction(&request, &result);
        let persistence_warning = match self.history.append(ctx, entry.clone()).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user = ctx.label(), "history not persisted: {}", e);
                metrics::counter!("ticketdesk_persistence_errors_total").increment(1);
                Some(e.to_string())
            }
        };

        debug!(
            user = ctx.label(),
            category = %result.category,
            source = source.as_str(),
            "prediction recorded"
        );

        Ok(PredictionOutcome {
            result,
            source,
            entry,
            advisory,
            persistence_warning,
        })
    }

    /// Refresh the user's history from storage
    pub async fn load_history(&self, ctx: &UserContext) -> Result<Vec<HistoryEntry>> {
        self.history.load(ctx).await
    }

    /// Current in-memory history, newest first
    pub fn history(&self, ctx: &UserContext) -> Vec<HistoryEntry> {
        self.history.snapshot(ctx)
    }

    /// Dashboard statistics for the current history
    pub fn stats(&self, ctx: &UserContext) -> Stats {
        stats(&self.history.snapshot(ctx))
    }

    /// Chart series for the current history
    pub fn chart_data(&self, ctx: &UserContext) -> ChartData {
        build_chart_data(&self.history.snapshot(ctx))
    }

    /// Delete the user's history
    pub async fn clear_history(&self, ctx: &UserContext) -> Result<()> {
        self.history.clear(ctx).await
    }
}
