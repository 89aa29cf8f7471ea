//! Error types raised before or after the database is involved.

use thiserror::Error;

/// A fragment's placeholders do not line up with its values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Marker count and value count differ.
    #[error("fragment has {markers} placeholder(s) but {values} value(s): `{fragment}`")]
    PlaceholderMismatch {
        /// Number of `?` markers found.
        markers: usize,
        /// Number of values supplied.
        values: usize,
        /// The offending fragment text.
        fragment: String,
    },

    /// A list value has no elements to expand into.
    #[error("list parameter #{position} is empty: `{fragment}`")]
    EmptyList {
        /// Zero-based index of the value within its fragment.
        position: usize,
        /// The offending fragment text.
        fragment: String,
    },
}

/// A result does not have the shape a terminal operation asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultShapeError {
    /// The statement did not produce a row set.
    #[error("statement did not produce a row set (got {0})")]
    NoRowSet(&'static str),

    /// The statement kind does not match the terminal operation.
    #[error("expected {expected} outcome, statement produced {found}")]
    UnexpectedOutcome {
        /// Outcome the operation needs.
        expected: &'static str,
        /// Outcome the statement produced.
        found: &'static str,
    },

    /// The row has no columns to read a scalar from.
    #[error("row has no columns")]
    NoColumns,

    /// A column value cannot be read as the requested type.
    #[error("column `{column}` holds {found}, expected {expected}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Requested type.
        expected: &'static str,
        /// Kind of the value found.
        found: &'static str,
    },

    /// A required column is absent from the row.
    #[error("missing column `{0}`")]
    MissingColumn(String),
}

/// The live table does not agree with the record shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatchError {
    /// Field count and column count differ.
    #[error(
        "entity and table `{table}` have a different number of properties \
         ({fields} field(s), {columns} column(s))"
    )]
    ColumnCount {
        /// Table name.
        table: String,
        /// Persistent fields in the record shape.
        fields: usize,
        /// Columns reported by the table.
        columns: usize,
    },
}
