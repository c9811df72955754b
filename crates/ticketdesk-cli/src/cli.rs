use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ticketdesk_core::Category;
use ticketdesk_history::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "ticketdesk")]
#[command(
    author,
    version,
    about = "Classify support tickets and browse prediction history"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    pub config: String,

    /// Base URL of the classification service
    #[arg(long, env = "TICKETDESK_API_BASE_URL", global = true)]
    pub api: Option<String>,

    /// Authenticated user whose history is persisted
    #[arg(short, long, env = "TICKETDESK_USER", global = true)]
    pub user: Option<String>,

    /// Directory holding persisted history
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the category of a ticket and record it
    Predict {
        /// Ticket subject
        #[arg(short, long)]
        subject: String,

        /// Ticket body
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Show one page of past predictions, newest first
    History {
        /// Case-insensitive text to find in subject or body
        #[arg(short, long)]
        search: Option<String>,

        /// Only show this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show dashboard statistics
    Stats,

    /// Show category counts and the last seven days
    Chart,

    /// Export (filtered) history to a file
    Export {
        /// Case-insensitive text to find in subject or body
        #[arg(short, long)]
        search: Option<String>,

        /// Only export this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// Output format: csv or json
        #[arg(short, long, default_value = "csv", value_parser = parse_format)]
        format: ExportFormat,

        /// Output path (defaults to a dated file name in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete the current user's history
    Clear,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        format!(
            "unknown category '{}', expected one of Incident, Request, Problem, Change",
            s
        )
    })
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}
