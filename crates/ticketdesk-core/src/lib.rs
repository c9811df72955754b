//! Ticketdesk Core
//!
//! Core types and utilities shared across the ticketdesk components.
//!
//! This crate provides:
//! - The closed category vocabulary and its normalization rules
//! - Prediction results, history entries, and the explicit user context
//! - Error types and result handling

pub mod category;
pub mod error;
pub mod types;

pub use category::Category;
pub use error::{Error, RemoteFailure, Result};
pub use types::{
    HistoryEntry, PredictionRequest, PredictionResult, TopCategoryScore, SessionKey, UserContext,
    ANONYMOUS_USER,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::category::Category;
    pub use crate::error::{Error, RemoteFailure, Result};
    pub use crate::types::{
        HistoryEntry, PredictionRequest, PredictionResult, SessionKey, TopCategoryScore,
        UserContext,
    };
}
