//! Classifier trait

use async_trait::async_trait;
use ticketdesk_core::{PredictionRequest, PredictionResult, Result};

/// Trait for anything that can predict a ticket category
#[async_trait]
pub trait TicketClassifier: Send + Sync {
    /// Classify the given ticket content
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}
