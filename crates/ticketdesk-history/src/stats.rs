//! Dashboard statistics over a history snapshot

use serde::{Serialize, Serializer};
use std::fmt;
use ticketdesk_core::{Category, HistoryEntry};

/// Shown in place of a category when history is empty
pub const NOT_AVAILABLE: &str = "N/A";

/// Summary numbers for the dashboard. Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_predictions: usize,

    #[serde(serialize_with = "category_or_na")]
    pub most_common_category: Option<Category>,

    #[serde(serialize_with = "category_or_na")]
    pub last_prediction_category: Option<Category>,

    pub unique_categories: usize,
}

impl Stats {
    pub fn most_common_label(&self) -> &'static str {
        label(self.most_common_category)
    }

    pub fn last_prediction_label(&self) -> &'static str {
        label(self.last_prediction_category)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total predictions:  {}", self.total_predictions)?;
        writeln!(f, "Most common:        {}", self.most_common_label())?;
        writeln!(f, "Last prediction:    {}", self.last_prediction_label())?;
        write!(f, "Unique categories:  {}", self.unique_categories)
    }
}

fn label(category: Option<Category>) -> &'static str {
    category.map(|c| c.as_str()).unwrap_or(NOT_AVAILABLE)
}

fn category_or_na<S: Serializer>(
    category: &Option<Category>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(label(*category))
}

/// Compute dashboard statistics from a newest-first history.
///
/// Ties for the most common category go to whichever tied category was seen
/// first while scanning from the newest entry.
pub fn stats(history: &[HistoryEntry]) -> Stats {
    // Tally in first-seen order
    let mut tally: Vec<(Category, usize)> = Vec::with_capacity(Category::ALL.len());
    for entry in history {
        match tally.iter_mut().find(|(c, _)| *c == entry.category) {
            Some((_, count)) => *count += 1,
            None => tally.push((entry.category, 1)),
        }
    }

    let mut most_common: Option<(Category, usize)> = None;
    for &(category, count) in &tally {
        if most_common.map_or(true, |(_, best)| count > best) {
            most_common = Some((category, count));
        }
    }

    Stats {
        total_predictions: history.len(),
        most_common_category: most_common.map(|(c, _)| c),
        last_prediction_category: history.first().map(|e| e.category),
        unique_categories: tally.len(),
    }
}
