//! The closed vocabulary of ticket categories

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ticket classification label.
///
/// The set is closed. Anything that arrives from outside the process, whether
/// from the remote classifier or from persisted history, goes through
/// [`Category::normalize`] and lands on `Incident` when unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Incident,
    Request,
    Problem,
    Change,
}

impl Category {
    /// All categories in their fixed display order
    pub const ALL: [Category; 4] = [
        Category::Incident,
        Category::Request,
        Category::Problem,
        Category::Change,
    ];

    /// Label used on the wire, in storage, and in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incident => "Incident",
            Self::Request => "Request",
            Self::Problem => "Problem",
            Self::Change => "Change",
        }
    }

    /// Map an external label onto the closed set.
    ///
    /// Surrounding whitespace is ignored; matching is otherwise exact.
    pub fn normalize(label: &str) -> Self {
        match label.trim() {
            "Request" => Self::Request,
            "Problem" => Self::Problem,
            "Change" => Self::Change,
            _ => Self::Incident,
        }
    }

    /// Strict, case-insensitive parse for user input such as CLI filters
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }

    /// The three other categories, in fixed order
    pub fn others(self) -> [Category; 3] {
        let mut out = [Category::Incident; 3];
        let mut i = 0;
        for category in Self::ALL {
            if category != self {
                out[i] = category;
                i += 1;
            }
        }
        out
    }

    /// Position in [`Category::ALL`]
    pub fn index(self) -> usize {
        match self {
            Self::Incident => 0,
            Self::Request => 1,
            Self::Problem => 2,
            Self::Change => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::normalize(&label))
    }
}
