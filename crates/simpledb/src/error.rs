//! Error types for simpledb sessions.

use simpledb_core::{BindingError, ParsePolicyError, ResultShapeError, SchemaMismatchError};
use thiserror::Error;

/// Errors that can occur while using a session.
#[derive(Debug, Error)]
pub enum Error {
    /// Placeholders and values do not line up, or a list is empty.
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    /// The database rejected or failed a statement.
    #[error("failed to execute `{sql}`: {source}")]
    QueryExecution {
        /// The finalized statement text.
        sql: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The result does not have the shape the operation asked for.
    #[error("result shape error: {0}")]
    ResultShape(#[from] ResultShapeError),

    /// An insert affected no row and produced no key.
    #[error("insert produced no generated key: `{sql}`")]
    NoGeneratedKey {
        /// The finalized statement text.
        sql: String,
    },

    /// The live table disagrees with the record shape.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatchError),

    /// The statement text cannot be classified.
    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    /// Transaction control used in the wrong state.
    #[error("transaction error: {0}")]
    TransactionState(&'static str),

    /// Opening or closing the connection failed.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A configuration value cannot be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The blocking runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<ParsePolicyError> for Error {
    fn from(err: ParsePolicyError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
