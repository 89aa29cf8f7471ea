//! Schema reconciliation policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a session brings a table into agreement with a record shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconciliationPolicy {
    /// No schema action.
    #[default]
    None,
    /// Compare column count to field count, fail on mismatch.
    Validate,
    /// Add the columns the table is missing.
    Update,
    /// Drop the table if it exists, then create it.
    Create,
    /// Create as above, then drop again.
    CreateDrop,
}

/// Unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reconciliation policy `{0}` (expected none, validate, update, create or create-drop)")]
pub struct ParsePolicyError(String);

impl ReconciliationPolicy {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Validate,
        Self::Update,
        Self::Create,
        Self::CreateDrop,
    ];

    /// Lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Validate => "validate",
            Self::Update => "update",
            Self::Create => "create",
            Self::CreateDrop => "create-drop",
        }
    }
}

impl fmt::Display for ReconciliationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconciliationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ParsePolicyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!("create-drop".parse(), Ok(ReconciliationPolicy::CreateDrop));
        assert_eq!("CREATE_DROP".parse(), Ok(ReconciliationPolicy::CreateDrop));
        assert_eq!(" Validate ".parse(), Ok(ReconciliationPolicy::Validate));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "migrate".parse::<ReconciliationPolicy>().unwrap_err();
        assert!(err.to_string().contains("`migrate`"));
    }

    #[test]
    fn test_display_parses_back() {
        for policy in ReconciliationPolicy::ALL {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ReconciliationPolicy::CreateDrop).unwrap(),
            "\"create-drop\""
        );
        let policy: ReconciliationPolicy = serde_json::from_str("\"update\"").unwrap();
        assert_eq!(policy, ReconciliationPolicy::Update);
        assert_eq!(ReconciliationPolicy::default(), ReconciliationPolicy::None);
    }
}
