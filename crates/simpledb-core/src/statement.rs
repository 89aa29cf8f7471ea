//! Statement classification.
//!
//! The leading keyword of a finalized statement decides how it is executed
//! and how its result is shaped. The mapping from [`StatementType`] to
//! [`ExecutionStrategy`] is a fixed table, resolved once per statement.

use std::fmt;

/// Statement kind derived from the first word of the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    /// `SELECT ...`
    Select,
    /// `INSERT ...`
    Insert,
    /// `UPDATE ...`
    Update,
    /// `DELETE ...`
    Delete,
    /// `SHOW ...`
    Show,
    /// `DESC ...` / `DESCRIBE ...`
    Desc,
    /// `PRAGMA ...` (SQLite introspection)
    Pragma,
    /// Anything else (DDL, transaction control, ...).
    Other,
}

/// How a statement is executed and what it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStrategy {
    /// Execute for update, then read the generated key.
    GeneratedKey,
    /// Execute for update, return the affected-row count.
    AffectedRows,
    /// Execute as a query and materialize every row.
    RowSet,
    /// Execute and report success.
    Generic,
}

impl StatementType {
    /// Classifies `sql` by its first word, case-insensitively.
    ///
    /// Returns `None` when the text has no leading word.
    #[must_use]
    pub fn classify(sql: &str) -> Option<Self> {
        let word: String = sql
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if word.is_empty() {
            return None;
        }
        Some(match word.to_ascii_uppercase().as_str() {
            "SELECT" => Self::Select,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "SHOW" => Self::Show,
            "DESC" | "DESCRIBE" => Self::Desc,
            "PRAGMA" => Self::Pragma,
            _ => Self::Other,
        })
    }

    /// The execution strategy for this kind.
    #[must_use]
    pub const fn strategy(self) -> ExecutionStrategy {
        match self {
            Self::Insert => ExecutionStrategy::GeneratedKey,
            Self::Update | Self::Delete => ExecutionStrategy::AffectedRows,
            Self::Select | Self::Show | Self::Desc | Self::Pragma => ExecutionStrategy::RowSet,
            Self::Other => ExecutionStrategy::Generic,
        }
    }

    /// Upper-case keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Show => "SHOW",
            Self::Desc => "DESC",
            Self::Pragma => "PRAGMA",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(StatementType::classify("select 1"), Some(StatementType::Select));
        assert_eq!(
            StatementType::classify("  \n\tInSeRt INTO t"),
            Some(StatementType::Insert)
        );
        assert_eq!(StatementType::classify("desc article"), Some(StatementType::Desc));
        assert_eq!(StatementType::classify("DESCRIBE article"), Some(StatementType::Desc));
        assert_eq!(StatementType::classify("show tables"), Some(StatementType::Show));
        assert_eq!(
            StatementType::classify("PRAGMA table_info(t)"),
            Some(StatementType::Pragma)
        );
    }

    #[test]
    fn test_unknown_keyword_is_other() {
        assert_eq!(
            StatementType::classify("CREATE TABLE t (id INTEGER)"),
            Some(StatementType::Other)
        );
        assert_eq!(StatementType::classify("STATEMENT_ERROR"), Some(StatementType::Other));
    }

    #[test]
    fn test_no_leading_word() {
        assert_eq!(StatementType::classify(""), None);
        assert_eq!(StatementType::classify("   "), None);
        assert_eq!(StatementType::classify("(SELECT 1)"), None);
    }

    #[test]
    fn test_strategy_table() {
        assert_eq!(StatementType::Insert.strategy(), ExecutionStrategy::GeneratedKey);
        assert_eq!(StatementType::Update.strategy(), ExecutionStrategy::AffectedRows);
        assert_eq!(StatementType::Delete.strategy(), ExecutionStrategy::AffectedRows);
        assert_eq!(StatementType::Show.strategy(), ExecutionStrategy::RowSet);
        assert_eq!(StatementType::Desc.strategy(), ExecutionStrategy::RowSet);
        assert_eq!(StatementType::Other.strategy(), ExecutionStrategy::Generic);
    }
}
