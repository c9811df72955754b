//! Export of (filtered) history for reporting

use chrono::{NaiveDate, SecondsFormat};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use ticketdesk_core::{Error, HistoryEntry, Result};

const CSV_HEADER: &str = "Timestamp,Subject,Category,Confidence";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated table
    #[default]
    Csv,
    /// Pretty-printed JSON array, same shape as persisted history
    Json,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{}', expected csv or json", other)),
        }
    }
}

/// Render entries as a CSV table in the order given.
///
/// Subjects are always quoted with inner quotes doubled; confidence is a
/// percentage with one decimal. No trailing newline.
pub fn export_csv(entries: &[HistoryEntry]) -> String {
    let mut output = String::from(CSV_HEADER);

    for entry in entries {
        let _ = write!(
            output,
            "\n{},\"{}\",{},{:.1}%",
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.subject.replace('"', "\"\""),
            entry.category,
            percent_one_decimal(entry.confidence)
        );
    }

    output
}

/// Confidence as a percentage with one decimal, halves rounded up
fn percent_one_decimal(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 10.0
}

/// Render entries as a pretty JSON array
pub fn export_json(entries: &[HistoryEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Default download name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("ticketdesk-history-{}.csv", date.format("%Y-%m-%d"))
}

/// Write entries to `path` and return how many rows were exported
pub fn export_to_file(entries: &[HistoryEntry], path: &Path, format: ExportFormat) -> Result<usize> {
    let content = match format {
        ExportFormat::Csv => export_csv(entries),
        ExportFormat::Json => export_json(entries)?,
    };

    std::fs::write(path, content)
        .map_err(|e| Error::persistence(format!("failed to write export {:?}: {}", path, e)))?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ticketdesk_core::Category;

    fn entry(subject: &str, confidence: f64) -> HistoryEntry {
        HistoryEntry {
            id: "id".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 5).unwrap(),
            subject: subject.to_string(),
            body: "body".to_string(),
            category: Category::Request,
            confidence,
        }
    }

    #[test]
    fn test_export_csv_rows() {
        let csv = export_csv(&[entry("Need access", 0.873), entry("Say \"hi\", ok", 0.5)]);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "Timestamp,Subject,Category,Confidence");
        assert_eq!(lines[1], "2026-10-16T08:30:05.000Z,\"Need access\",Request,87.3%");
        assert_eq!(lines[2], "2026-10-16T08:30:05.000Z,\"Say \"\"hi\"\", ok\",Request,50.0%");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_export_csv_rounds_halves_up() {
        let csv = export_csv(&[entry("Tie", 0.8125), entry("Low tie", 0.0625)]);
        let lines: Vec<_> = csv.lines().collect();

        assert!(lines[1].ends_with(",81.3%"));
        assert!(lines[2].ends_with(",6.3%"));
    }

    #[test]
    fn test_export_csv_empty_is_header_only() {
        assert_eq!(export_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(export_file_name(date), "ticketdesk-history-2026-01-05.csv");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let entries = vec![entry("A", 0.9), entry("B", 0.7)];

        let csv_path = temp_dir.path().join("out.csv");
        let count = export_to_file(&entries, &csv_path, ExportFormat::Csv).unwrap();
        assert_eq!(count, 2);
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("\"B\""));

        let json_path = temp_dir.path().join("out.json");
        export_to_file(&entries, &json_path, ExportFormat::Json).unwrap();
        let parsed: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, entries);
    }
}
