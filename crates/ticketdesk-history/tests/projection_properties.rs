//! Property tests for the read-only projections over history

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use ticketdesk_core::{Category, HistoryEntry};
use ticketdesk_history::{build_chart_data_on, paginate, stats, HistoryQuery};

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn history() -> impl Strategy<Value = Vec<HistoryEntry>> {
    prop::collection::vec((category(), 0i64..30 * 24 * 3600, "[a-z ]{0,12}"), 0..40).prop_map(
        |rows| {
            let base = Utc.with_ymd_and_hms(2026, 10, 16, 23, 0, 0).unwrap();
            let mut entries: Vec<_> = rows
                .into_iter()
                .enumerate()
                .map(|(i, (category, secs_ago, subject))| HistoryEntry {
                    id: i.to_string(),
                    timestamp: base - Duration::seconds(secs_ago),
                    subject,
                    body: String::new(),
                    category,
                    confidence: 0.8,
                })
                .collect();
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            entries
        },
    )
}

proptest! {
    #[test]
    fn prop_chart_shape_is_fixed(entries in history()) {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let chart = build_chart_data_on(&entries, today, &Utc);

        prop_assert_eq!(chart.category_data.len(), 4);
        prop_assert_eq!(chart.time_series_data.len(), 7);
        prop_assert_eq!(chart.total(), entries.len());
        let in_window: usize = chart.time_series_data.iter().map(|d| d.count).sum();
        prop_assert!(in_window <= entries.len());
    }

    #[test]
    fn prop_stats_agree_with_history(entries in history()) {
        let s = stats(&entries);

        prop_assert_eq!(s.total_predictions, entries.len());
        prop_assert_eq!(s.last_prediction_category, entries.first().map(|e| e.category));
        prop_assert!(s.unique_categories <= 4);

        if let Some(best) = s.most_common_category {
            let best_count = entries.iter().filter(|e| e.category == best).count();
            for c in Category::ALL {
                prop_assert!(entries.iter().filter(|e| e.category == c).count() <= best_count);
            }
        } else {
            prop_assert!(entries.is_empty());
        }
    }

    #[test]
    fn prop_pages_cover_filtered_rows(entries in history(), per_page in 1usize..10) {
        let filtered = HistoryQuery::new().search("a").apply(&entries);
        let first = paginate(&filtered, 1, per_page);

        let mut seen = 0;
        for page in 1..=first.total_pages {
            seen += paginate(&filtered, page, per_page).items.len();
        }
        prop_assert_eq!(seen, filtered.len());
    }
}
