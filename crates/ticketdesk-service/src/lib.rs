//! Ticketdesk Service
//!
//! The prediction pipeline's only stateful orchestrator: remote classifier
//! first, offline fallback on failure, then an append to the caller's history.

pub mod admission;
pub mod service;

pub use admission::{AdmissionControl, InFlightGuard};
pub use service::{PredictionOutcome, PredictionService, PredictionSource, FALLBACK_ADVISORY};
