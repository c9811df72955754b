//! Ticketdesk History
//!
//! Durable, per-user, newest-first log of past predictions and the read-only
//! views derived from it.
//!
//! Provides:
//! - [`HistoryStore`] over a pluggable key-value [`HistoryBackend`]
//! - Search, category filtering, and pagination ([`HistoryQuery`])
//! - CSV and JSON export
//! - Dashboard statistics and chart series, recomputed from a snapshot

pub mod backend;
pub mod chart;
pub mod export;
pub mod query;
pub mod stats;
pub mod store;

pub use backend::{FileBackend, HistoryBackend, MemoryBackend};
pub use chart::{build_chart_data, build_chart_data_on, CategoryCount, ChartData, DayCount};
pub use export::{export_csv, export_file_name, export_json, export_to_file, ExportFormat};
pub use query::{paginate, HistoryQuery, Page, DEFAULT_PAGE_SIZE};
pub use stats::{stats, Stats};
pub use store::{storage_key, HistoryStore, HISTORY_KEY_PREFIX};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::{FileBackend, HistoryBackend, MemoryBackend};
    pub use crate::chart::{build_chart_data, ChartData};
    pub use crate::query::{HistoryQuery, Page};
    pub use crate::stats::{stats, Stats};
    pub use crate::store::HistoryStore;
}
