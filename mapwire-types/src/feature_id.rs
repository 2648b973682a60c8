use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifier of a feature inside a map source.
///
/// GL engines accept either non-negative integers or strings as feature ids. Feature-state
/// operations only work for features that have an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    /// Numeric id.
    Number(u64),
    /// String id (e.g. from `promoteId`).
    String(String),
}

impl From<u64> for FeatureId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Number(id) => write!(f, "{id}"),
            FeatureId::String(id) => write!(f, "{id}"),
        }
    }
}
