//! CLI configuration

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ticketdesk_classifiers::{ClientConfig, DEFAULT_TIMEOUT_MS};
use ticketdesk_core::UserContext;

/// Ticketdesk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketdeskConfig {
    /// Base URL of the classification service
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bound on a single remote prediction
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory holding persisted history
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,

    /// Authenticated user; anonymous when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TicketdeskConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(api) = &cli.api {
            config.api_base_url = api.clone();
        }

        if let Some(user) = &cli.user {
            config.user_id = Some(user.clone());
        }

        if let Some(dir) = &cli.history_dir {
            config.history_dir = dir.clone();
        }

        Ok(config)
    }

    /// Identity for this invocation
    pub fn user_context(&self) -> UserContext {
        match self.user_id.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => UserContext::authenticated(user),
            _ => UserContext::anonymous(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_base_url).with_timeout_ms(self.timeout_ms)
    }
}

impl Default for TicketdeskConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_ms: default_timeout_ms(),
            history_dir: default_history_dir(),
            user_id: None,
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("./history")
}
