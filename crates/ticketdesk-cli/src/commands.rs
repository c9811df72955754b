//! Subcommand handlers and terminal rendering

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt::Write as _;
use std::path::PathBuf;
use ticketdesk_core::{Category, HistoryEntry, UserContext};
use ticketdesk_history::{
    export_file_name, export_to_file, paginate, ChartData, ExportFormat, HistoryQuery, Page,
    DEFAULT_PAGE_SIZE,
};
use ticketdesk_service::{PredictionOutcome, PredictionService};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const SUBJECT_WIDTH: usize = 40;

pub async fn predict(
    service: &PredictionService,
    ctx: &UserContext,
    subject: &str,
    body: &str,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning prediction");
            trigger.cancel();
        }
    });

    let outcome = service
        .predict(ctx, subject, body, &cancel)
        .await
        .context("Prediction failed")?;
    print!("{}", render_outcome(&outcome));
    Ok(())
}

pub fn history(
    service: &PredictionService,
    ctx: &UserContext,
    query: &HistoryQuery,
    page: usize,
) {
    let filtered = query.apply(&service.history(ctx));
    let page = paginate(&filtered, page, DEFAULT_PAGE_SIZE);
    print!("{}", render_page(&page));
}

pub fn stats(service: &PredictionService, ctx: &UserContext) {
    println!("{}", service.stats(ctx));
}

pub fn chart(service: &PredictionService, ctx: &UserContext) {
    print!("{}", render_chart(&service.chart_data(ctx)));
}

pub fn export(
    service: &PredictionService,
    ctx: &UserContext,
    query: &HistoryQuery,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let entries = query.apply(&service.history(ctx));
    let path = out.unwrap_or_else(|| {
        PathBuf::from(export_file_name(Local::now().date_naive())).with_extension(format.extension())
    });

    let count = export_to_file(&entries, &path, format)
        .with_context(|| format!("Failed to export history to {}", path.display()))?;
    info!("Exported {} entries to {}", count, path.display());
    println!("Exported {} entries to {}", count, path.display());
    Ok(())
}

pub async fn clear(service: &PredictionService, ctx: &UserContext) -> Result<()> {
    service
        .clear_history(ctx)
        .await
        .context("Failed to clear history")?;
    println!("History cleared");
    Ok(())
}

pub fn render_outcome(outcome: &PredictionOutcome) -> String {
    let mut out = String::new();
    let result = &outcome.result;

    let _ = writeln!(
        out,
        "Category:   {} ({})",
        result.category,
        percent(result.confidence)
    );
    let _ = writeln!(out, "Source:     {}", outcome.source.as_str());
    for (rank, candidate) in result.top_categories.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<10} {}",
            rank + 1,
            candidate.category.as_str(),
            percent(candidate.score)
        );
    }
    if let Some(advisory) = &outcome.advisory {
        let _ = writeln!(out, "Note: {}", advisory);
    }
    if let Some(warning) = &outcome.persistence_warning {
        let _ = writeln!(out, "Warning: history not saved: {}", warning);
    }
    out
}

pub fn render_page(page: &Page<HistoryEntry>) -> String {
    let mut out = String::new();

    if page.total == 0 {
        out.push_str("No predictions yet\n");
        return out;
    }

    for entry in &page.items {
        let _ = writeln!(
            out,
            "{}  {:<10} {:>6}  {}",
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.category.as_str(),
            percent(entry.confidence),
            truncate(&entry.subject, SUBJECT_WIDTH)
        );
    }
    let _ = writeln!(
        out,
        "Page {} of {} ({} entries)",
        page.page, page.total_pages, page.total
    );
    out
}

pub fn render_chart(chart: &ChartData) -> String {
    let mut out = String::new();

    out.push_str("By category\n");
    for row in &chart.category_data {
        let _ = writeln!(out, "  {:<10} {:>4}", row.category.as_str(), row.count);
    }

    out.push_str("Last 7 days\n");
    for day in &chart.time_series_data {
        let _ = writeln!(
            out,
            "  {} {}  {:>4} {}",
            day.label,
            day.date.format("%m-%d"),
            day.count,
            "#".repeat(day.count.min(50))
        );
    }

    let _ = writeln!(out, "Total predictions: {}", chart.total());
    let _ = writeln!(out, "Average per day:   {}", chart.average_per_day());
    out
}

/// Build a history query from optional CLI filters
pub fn build_query(search: Option<String>, category: Option<Category>) -> HistoryQuery {
    let mut query = HistoryQuery::new();
    if let Some(text) = search {
        query = query.search(text);
    }
    if let Some(category) = category {
        query = query.category(category);
    }
    query
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ticketdesk_core::{PredictionRequest, PredictionResult, TopCategoryScore};
    use ticketdesk_history::build_chart_data_on;
    use ticketdesk_service::{PredictionSource, FALLBACK_ADVISORY};

    fn outcome(source: PredictionSource) -> PredictionOutcome {
        let result = PredictionResult::new(
            Category::Incident,
            0.8,
            vec![
                TopCategoryScore::new(Category::Incident, 0.8),
                TopCategoryScore::new(Category::Problem, 0.12),
                TopCategoryScore::new(Category::Change, 0.08),
            ],
        );
        let request = PredictionRequest::new("Login broken", "");
        PredictionOutcome {
            entry: HistoryEntry::from_prediction(&request, &result),
            result,
            source,
            advisory: (source == PredictionSource::Fallback).then(|| FALLBACK_ADVISORY.to_string()),
            persistence_warning: None,
        }
    }

    #[test]
    fn test_render_outcome_lists_candidates() {
        let text = render_outcome(&outcome(PredictionSource::Remote));
        assert!(text.contains("Category:   Incident (80.0%)"));
        assert!(text.contains("  2. Problem    12.0%"));
        assert!(!text.contains("Note:"));
    }

    #[test]
    fn test_render_outcome_shows_advisory() {
        let text = render_outcome(&outcome(PredictionSource::Fallback));
        assert!(text.contains("Source:     fallback"));
        assert!(text.contains(FALLBACK_ADVISORY));
    }

    #[test]
    fn test_render_empty_page() {
        let page = paginate::<HistoryEntry>(&[], 1, DEFAULT_PAGE_SIZE);
        assert_eq!(render_page(&page), "No predictions yet\n");
    }

    #[test]
    fn test_render_chart_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let text = render_chart(&build_chart_data_on(&[], today, &chrono::Utc));
        assert!(text.contains("  Fri 10-16     0 "));
        assert!(text.contains("Total predictions: 0"));
        assert!(text.contains("Average per day:   0"));
    }

    #[test]
    fn test_truncate_long_subject() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer subject", 10), "a much ...");
    }
}
