//! Core types for ticketdesk

use crate::category::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used in logs and messages for unauthenticated callers
pub const ANONYMOUS_USER: &str = "anonymous";

/// One candidate category with its score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopCategoryScore {
    pub category: Category,

    /// Score in `[0, 1]`
    pub score: f64,
}

impl TopCategoryScore {
    pub fn new(category: Category, score: f64) -> Self {
        Self { category, score }
    }
}

/// Outcome of a single classification, remote or offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Predicted category
    pub category: Category,

    /// Confidence of the predicted category (0.0-1.0)
    pub confidence: f64,

    /// Up to three candidates, descending by score, categories distinct
    pub top_categories: Vec<TopCategoryScore>,
}

impl PredictionResult {
    /// Create a new prediction result
    pub fn new(category: Category, confidence: f64, top_categories: Vec<TopCategoryScore>) -> Self {
        Self {
            category,
            confidence,
            top_categories,
        }
    }

    /// Check the structural invariants every result handed to callers must hold
    pub fn is_well_formed(&self) -> bool {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);

        if !in_unit(self.confidence) || self.top_categories.len() > 3 {
            return false;
        }

        let descending = self
            .top_categories
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score);

        let distinct = self.top_categories.iter().enumerate().all(|(i, a)| {
            self.top_categories[i + 1..]
                .iter()
                .all(|b| b.category != a.category)
        });

        descending && distinct && self.top_categories.iter().all(|t| in_unit(t.score))
    }
}

/// Input for one classification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub subject: String,
    pub body: String,

    /// Passed through for server-side attribution only
    pub user_id: Option<String>,
}

impl PredictionRequest {
    /// Create a request without attribution
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            user_id: None,
        }
    }

    /// Attach the caller's user id
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A recorded past prediction. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique id within a store
    pub id: String,

    /// When the prediction completed
    pub timestamp: DateTime<Utc>,

    pub subject: String,
    pub body: String,
    pub category: Category,
    pub confidence: f64,
}

impl HistoryEntry {
    /// Record a prediction that completed just now
    pub fn from_prediction(request: &PredictionRequest, result: &PredictionResult) -> Self {
        Self::at(Utc::now(), request, result)
    }

    /// Record a prediction with an explicit completion time
    pub fn at(
        timestamp: DateTime<Utc>,
        request: &PredictionRequest,
        result: &PredictionResult,
    ) -> Self {
        Self {
            id: generate_entry_id(),
            timestamp,
            subject: request.subject.clone(),
            body: request.body.clone(),
            category: result.category,
            confidence: result.confidence,
        }
    }
}

/// Generate a unique entry id using UUID v4
fn generate_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Identity of the caller, passed explicitly into every history operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserContext {
    /// Stable opaque user identifier, if known
    pub user_id: Option<String>,

    /// Whether the session is authenticated
    pub authenticated: bool,
}

impl UserContext {
    /// An authenticated user whose history is persisted
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            authenticated: true,
        }
    }

    /// An unauthenticated session; history stays in memory only
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The user id whose history may be persisted, if any
    pub fn persisted_user(&self) -> Option<&str> {
        if self.authenticated {
            self.user_id.as_deref()
        } else {
            None
        }
    }

    /// Key for in-memory views and admission control.
    ///
    /// Anonymous sessions get their own variant, so no user id can collide
    /// with them.
    pub fn session_key(&self) -> SessionKey {
        match self.persisted_user() {
            Some(user_id) => SessionKey::User(user_id.to_string()),
            None => SessionKey::Anonymous,
        }
    }

    /// Human-readable name for logs
    pub fn label(&self) -> &str {
        self.persisted_user().unwrap_or(ANONYMOUS_USER)
    }
}

/// Whose in-memory state an operation touches
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Shared by every unauthenticated caller
    Anonymous,
    /// One authenticated user
    User(String),
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str(ANONYMOUS_USER),
            Self::User(user_id) => f.write_str(user_id),
        }
    }
}
