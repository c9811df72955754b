//! Search, filter, and paginate history

use serde::Serialize;
use ticketdesk_core::{Category, HistoryEntry};

/// Rows per page in the history listing
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Query filter for history entries
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Case-insensitive substring matched against subject or body
    pub search: Option<String>,

    /// Only entries of this category
    pub category: Option<Category>,
}

impl HistoryQuery {
    /// Create a new empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by free text
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Filter by category
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Check if an entry matches the query
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(category) = self.category {
            if entry.category != category {
                return false;
            }
        }

        match self.search.as_deref() {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                entry.subject.to_lowercase().contains(&needle)
                    || entry.body.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    /// Matching entries, order preserved
    pub fn apply(&self, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
        entries.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    /// 1-based page number
    pub page: usize,
    pub total_pages: usize,

    /// Rows across all pages
    pub total: usize,
}

/// Slice out one 1-based page. Page 0 is treated as page 1.
pub fn paginate<T: Clone>(entries: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = entries.len();
    let total_pages = total.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items = entries
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        page,
        total_pages,
        total,
    }
}
