//! SQLite dialect.
//!
//! SQLite adds one column per `ALTER TABLE` statement, and a `NOT NULL`
//! column can only be added together with a non-null default.

use crate::entity::{FieldDescriptor, FieldType};
use crate::error::ResultShapeError;
use crate::row::ResultRow;

use super::{text_column, ColumnDescriptor, SchemaDialect};

/// SQLite schema dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    const fn zero_default(field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Text => "''",
            FieldType::Integer | FieldType::Boolean => "0",
            FieldType::Float => "0.0",
            FieldType::DateTime => "'1970-01-01 00:00:00'",
        }
    }
}

fn flag_column(row: &ResultRow, column: &str) -> Result<bool, ResultShapeError> {
    let value = row.try_get(column)?;
    value
        .as_i64()
        .map(|n| n != 0)
        .ok_or_else(|| ResultShapeError::TypeMismatch {
            column: column.to_string(),
            expected: "integer",
            found: value.kind(),
        })
}

impl SchemaDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Text => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "REAL",
            FieldType::Boolean => "BOOLEAN",
            FieldType::DateTime => "DATETIME",
        }
    }

    fn id_definition(&self, field: &FieldDescriptor) -> String {
        format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            self.quote_identifier(&field.name)
        )
    }

    fn add_column_definition(&self, field: &FieldDescriptor) -> String {
        let definition = self.column_definition(field);
        if field.nullable {
            definition
        } else {
            format!("{definition} DEFAULT {}", Self::zero_default(field.field_type))
        }
    }

    fn describe_table(&self, table: &str) -> String {
        format!("PRAGMA table_info({})", self.quote_identifier(table))
    }

    fn alter_table(&self, table: &str, clauses: &[String]) -> Vec<String> {
        let table = self.quote_identifier(table);
        clauses
            .iter()
            .map(|clause| format!("ALTER TABLE {table} {clause}"))
            .collect()
    }

    fn column_from_row(&self, row: &ResultRow) -> Result<ColumnDescriptor, ResultShapeError> {
        Ok(ColumnDescriptor {
            name: text_column(row, "name")?.to_string(),
            declared_type: text_column(row, "type")?.to_string(),
            nullable: !flag_column(row, "notnull")?,
            primary_key: flag_column(row, "pk")?,
        })
    }
}
