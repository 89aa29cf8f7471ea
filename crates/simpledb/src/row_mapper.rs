//! Driver rows to [`ResultRow`]s.
//!
//! SQLite values carry a runtime storage class (integer, real, text, blob)
//! independent of the column's declared type. The storage class decides the
//! [`SqlValue`] variant, except that integers in a `BOOLEAN` column become
//! booleans and parseable text in a `DATETIME` column becomes a date-time.

use simpledb_core::{parse_datetime, ResultRow, ResultShapeError, SqlValue};
use sqlx::sqlite::{SqliteColumn, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Integer,
    Real,
    Text,
    Blob,
}

impl Storage {
    fn of(type_name: &str) -> Self {
        match type_name {
            "INTEGER" | "BOOLEAN" => Self::Integer,
            "REAL" => Self::Real,
            "BLOB" => Self::Blob,
            _ => Self::Text,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "float",
            Self::Text => "text",
            Self::Blob => "blob",
        }
    }
}

/// Maps every column of `row`, in result-set order.
pub fn map_row(row: &SqliteRow) -> Result<ResultRow, ResultShapeError> {
    let mut mapped = ResultRow::new();
    for column in row.columns() {
        mapped.insert(column.name(), decode_column(row, column)?);
    }
    Ok(mapped)
}

/// Maps a whole result set.
pub fn map_rows(rows: &[SqliteRow]) -> Result<Vec<ResultRow>, ResultShapeError> {
    rows.iter().map(map_row).collect()
}

fn decode_column(row: &SqliteRow, column: &SqliteColumn) -> Result<SqlValue, ResultShapeError> {
    let index = column.ordinal();
    let raw = row
        .try_get_raw(index)
        .map_err(|_| ResultShapeError::MissingColumn(column.name().to_string()))?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = Storage::of(raw.type_info().name());
    let declared = column.type_info().name().to_ascii_uppercase();

    let mismatch = |expected: &'static str| ResultShapeError::TypeMismatch {
        column: column.name().to_string(),
        expected,
        found: storage.as_str(),
    };

    let value = match storage {
        Storage::Integer if declared == "BOOLEAN" => row
            .try_get::<bool, _>(index)
            .map(SqlValue::Bool)
            .map_err(|_| mismatch("bool"))?,
        Storage::Integer => row
            .try_get::<i64, _>(index)
            .map(SqlValue::Int)
            .map_err(|_| mismatch("integer"))?,
        Storage::Real => row
            .try_get::<f64, _>(index)
            .map(SqlValue::Float)
            .map_err(|_| mismatch("float"))?,
        Storage::Text => {
            let text: String = row.try_get(index).map_err(|_| mismatch("text"))?;
            if matches!(declared.as_str(), "DATETIME" | "TIMESTAMP") {
                parse_datetime(&text).map_or(SqlValue::Text(text), SqlValue::DateTime)
            } else {
                SqlValue::Text(text)
            }
        }
        Storage::Blob => row
            .try_get::<Vec<u8>, _>(index)
            .map(SqlValue::Blob)
            .map_err(|_| mismatch("blob"))?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_names() {
        assert_eq!(Storage::of("INTEGER"), Storage::Integer);
        assert_eq!(Storage::of("REAL"), Storage::Real);
        assert_eq!(Storage::of("BLOB"), Storage::Blob);
        assert_eq!(Storage::of("TEXT"), Storage::Text);
    }

    // Decoding against live rows is covered by the integration tests.
}
