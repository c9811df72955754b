//! Ticketdesk Classifiers
//!
//! Classifiers that turn free-text ticket content into a category prediction.
//!
//! Two implementations live here:
//! - [`PredictionClient`]: calls the remote classification service and
//!   normalizes its response into the closed category set
//! - [`FallbackClassifier`]: an offline keyword heuristic used when the remote
//!   side is unreachable
//!
//! Both sit behind the [`TicketClassifier`] trait so the orchestrator can be
//! driven by test doubles.

pub mod classifier;
pub mod fallback;
pub mod remote;

pub use classifier::TicketClassifier;
pub use fallback::FallbackClassifier;
pub use remote::{ClientConfig, PredictionClient, RemoteClass, RemoteResponse, DEFAULT_TIMEOUT_MS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::TicketClassifier;
    pub use crate::fallback::FallbackClassifier;
    pub use crate::remote::{ClientConfig, PredictionClient};
}
