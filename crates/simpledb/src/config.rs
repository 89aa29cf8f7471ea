//! Session configuration.

use serde::Deserialize;
use simpledb_core::ReconciliationPolicy;

use crate::error::{Error, Result};

/// Environment variable holding the connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable toggling development logging.
pub const DEV_MODE_VAR: &str = "SIMPLEDB_DEV_MODE";
/// Environment variable holding the initial reconciliation policy.
pub const POLICY_VAR: &str = "SIMPLEDB_DDL_AUTO";

const DEFAULT_URL: &str = "sqlite::memory:";

/// How to open a session.
///
/// Host, credentials and database name all travel in `url`, e.g.
/// `sqlite://data/app.db` or `sqlite::memory:`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimpleDbConfig {
    /// Connection URL.
    pub url: String,
    /// Log every statement with its parameters rendered inline.
    pub dev_mode: bool,
    /// Initial reconciliation policy.
    pub policy: ReconciliationPolicy,
}

impl Default for SimpleDbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            dev_mode: false,
            policy: ReconciliationPolicy::None,
        }
    }
}

impl SimpleDbConfig {
    /// Creates a configuration for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets development logging.
    #[must_use]
    pub const fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Sets the initial reconciliation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReconciliationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads `DATABASE_URL`, `SIMPLEDB_DEV_MODE` and `SIMPLEDB_DDL_AUTO`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.url = url;
        }
        if let Some(flag) = lookup(DEV_MODE_VAR) {
            config.dev_mode = parse_flag(DEV_MODE_VAR, &flag)?;
        }
        if let Some(policy) = lookup(POLICY_VAR) {
            config.policy = policy.parse()?;
        }
        Ok(config)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{name}: `{other}` is not a boolean"))),
    }
}
