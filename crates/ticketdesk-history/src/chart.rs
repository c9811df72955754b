//! Chart series for the analytics view

use chrono::{Duration, Local, NaiveDate, TimeZone};
use serde::Serialize;
use ticketdesk_core::{Category, HistoryEntry};

/// Days covered by the time series, ending today
pub const TIME_SERIES_DAYS: usize = 7;

/// Predictions per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Predictions on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,

    /// Short weekday name, e.g. `Mon`
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// One row per category in fixed order, zero counts included
    pub category_data: Vec<CategoryCount>,

    /// Exactly seven rows, oldest first, last row is today
    pub time_series_data: Vec<DayCount>,
}

impl ChartData {
    /// Total predictions across all categories
    pub fn total(&self) -> usize {
        self.category_data.iter().map(|c| c.count).sum()
    }

    /// Mean predictions per day over the window, rounded to nearest
    pub fn average_per_day(&self) -> usize {
        let sum: usize = self.time_series_data.iter().map(|d| d.count).sum();
        (sum as f64 / TIME_SERIES_DAYS as f64).round() as usize
    }
}

/// Build chart data for today in the local time zone
pub fn build_chart_data(history: &[HistoryEntry]) -> ChartData {
    build_chart_data_on(history, Local::now().date_naive(), &Local)
}

/// Build chart data for an explicit "today" and time zone.
///
/// An entry belongs to a day when its timestamp, converted to `tz`, falls on
/// that calendar date.
pub fn build_chart_data_on<Tz: TimeZone>(
    history: &[HistoryEntry],
    today: NaiveDate,
    tz: &Tz,
) -> ChartData {
    let mut category_counts = [0usize; 4];
    for entry in history {
        category_counts[entry.category.index()] += 1;
    }

    let category_data = Category::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            count: category_counts[category.index()],
        })
        .collect();

    let local_days: Vec<NaiveDate> = history
        .iter()
        .map(|e| e.timestamp.with_timezone(tz).date_naive())
        .collect();

    let time_series_data = (0..TIME_SERIES_DAYS)
        .map(|i| {
            let date = today - Duration::days((TIME_SERIES_DAYS - 1 - i) as i64);
            DayCount {
                date,
                label: date.format("%a").to_string(),
                count: local_days.iter().filter(|d| **d == date).count(),
            }
        })
        .collect();

    ChartData {
        category_data,
        time_series_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn entry_at(rfc3339: &str, category: Category) -> HistoryEntry {
        HistoryEntry {
            id: rfc3339.to_string(),
            timestamp: rfc3339.parse::<chrono::DateTime<Utc>>().unwrap(),
            subject: String::new(),
            body: String::new(),
            category,
            confidence: 0.9,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_empty_history_has_fixed_shape() {
        let chart = build_chart_data_on(&[], today(), &Utc);

        assert_eq!(chart.category_data.len(), 4);
        assert!(chart.category_data.iter().all(|c| c.count == 0));
        assert_eq!(chart.time_series_data.len(), 7);
        assert_eq!(chart.total(), 0);
        assert_eq!(chart.average_per_day(), 0);
    }

    #[test]
    fn test_category_rows_in_fixed_order() {
        let history = vec![
            entry_at("2026-10-16T10:00:00Z", Category::Change),
            entry_at("2026-10-15T10:00:00Z", Category::Change),
            entry_at("2026-10-14T10:00:00Z", Category::Incident),
        ];
        let chart = build_chart_data_on(&history, today(), &Utc);

        let rows: Vec<_> = chart
            .category_data
            .iter()
            .map(|c| (c.category, c.count))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Category::Incident, 1),
                (Category::Request, 0),
                (Category::Problem, 0),
                (Category::Change, 2),
            ]
        );
        assert_eq!(chart.total(), 3);
    }

    #[test]
    fn test_time_series_window_and_labels() {
        let chart = build_chart_data_on(&[], today(), &Utc);

        assert_eq!(chart.time_series_data[0].date, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
        assert_eq!(chart.time_series_data[6].date, today());
        // 2026-10-16 is a Friday
        assert_eq!(chart.time_series_data[6].label, "Fri");
        assert_eq!(chart.time_series_data[0].label, "Sat");
    }

    #[test]
    fn test_time_series_counts_ignore_out_of_window() {
        let history = vec![
            entry_at("2026-10-16T23:59:59Z", Category::Request),
            entry_at("2026-10-16T00:00:00Z", Category::Request),
            entry_at("2026-10-12T12:00:00Z", Category::Problem),
            entry_at("2026-10-09T23:59:59Z", Category::Problem),
            entry_at("2026-09-01T12:00:00Z", Category::Problem),
        ];
        let chart = build_chart_data_on(&history, today(), &Utc);
        let counts: Vec<_> = chart.time_series_data.iter().map(|d| d.count).collect();

        assert_eq!(counts, vec![0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(chart.total(), 5);
        // 3 in window / 7 rounds to 0
        assert_eq!(chart.average_per_day(), 0);
    }

    #[test]
    fn test_days_follow_the_given_time_zone() {
        // 22:30 UTC on the 15th is the 16th at UTC+2
        let history = vec![entry_at("2026-10-15T22:30:00Z", Category::Incident)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let local = build_chart_data_on(&history, today(), &plus_two);
        assert_eq!(local.time_series_data[6].count, 1);

        let utc = build_chart_data_on(&history, today(), &Utc);
        assert_eq!(utc.time_series_data[5].count, 1);
        assert_eq!(utc.time_series_data[6].count, 0);
    }

    #[test]
    fn test_average_per_day_rounds() {
        let history: Vec<_> = (0..4)
            .map(|_| entry_at("2026-10-16T09:00:00Z", Category::Request))
            .collect();
        let chart = build_chart_data_on(&history, today(), &Utc);
        // 4 / 7 = 0.57
        assert_eq!(chart.average_per_day(), 1);
    }
}
