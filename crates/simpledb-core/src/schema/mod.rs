//! Schema conversion between record shapes and live tables.
//!
//! [`SchemaConverter`] derives `CREATE`, `DROP`, describe and `ALTER`
//! statements from a [`RecordShape`]. The additive delta only ever adds
//! columns: existing columns are never dropped or retyped.
//!
//! SQL text is produced by a [`SchemaDialect`]; SQLite and MySQL are
//! provided.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use std::collections::HashSet;

use crate::entity::{FieldDescriptor, FieldType, RecordShape};
use crate::error::{ResultShapeError, SchemaMismatchError};
use crate::row::ResultRow;

/// A column as introspected from a live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Declared type as reported by the database.
    pub declared_type: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,
}

/// Trait for database-specific DDL generation.
pub trait SchemaDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the column type for a field type.
    fn type_name(&self, field_type: FieldType) -> &'static str;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Definition of the auto-incrementing `id` primary key, including any
    /// separate `PRIMARY KEY` clause the dialect needs.
    fn id_definition(&self, field: &FieldDescriptor) -> String;

    /// Generates a column definition for a regular field.
    fn column_definition(&self, field: &FieldDescriptor) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(&field.name),
            self.type_name(field.field_type)
        );
        if !field.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// Column definition used by `ADD COLUMN`.
    fn add_column_definition(&self, field: &FieldDescriptor) -> String {
        self.column_definition(field)
    }

    /// Generates `CREATE TABLE` for a shape.
    fn create_table(&self, table: &str, shape: &RecordShape) -> String {
        let definitions: Vec<String> = shape
            .fields()
            .iter()
            .map(|field| {
                if field.is_id() {
                    self.id_definition(field)
                } else {
                    self.column_definition(field)
                }
            })
            .collect();
        format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.quote_identifier(table),
            definitions.join(",\n  ")
        )
    }

    /// Generates `DROP TABLE IF EXISTS`.
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_identifier(table))
    }

    /// Introspection statement returning one row per column.
    fn describe_table(&self, table: &str) -> String;

    /// Renders `ADD COLUMN` clauses into executable statements.
    fn alter_table(&self, table: &str, clauses: &[String]) -> Vec<String>;

    /// Reads one row of the describe statement.
    fn column_from_row(&self, row: &ResultRow) -> Result<ColumnDescriptor, ResultShapeError>;
}

/// The additive delta between a shape and a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaUpdate {
    table: String,
    added: Vec<FieldDescriptor>,
    clauses: Vec<String>,
    statements: Vec<String>,
}

impl SchemaUpdate {
    /// Table being altered.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fields that have no column yet.
    #[must_use]
    pub fn added(&self) -> &[FieldDescriptor] {
        &self.added
    }

    /// One `ADD COLUMN ...` clause per missing field.
    #[must_use]
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Statements to execute, empty when nothing is missing.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Returns whether the table already has every field.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Converts record shapes into DDL for one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter<D: SchemaDialect> {
    dialect: D,
}

impl<D: SchemaDialect> SchemaConverter<D> {
    /// Creates a converter.
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// `CREATE TABLE` for the shape.
    pub fn build_create(&self, shape: &RecordShape, table: &str) -> String {
        self.dialect.create_table(table, shape)
    }

    /// `DROP TABLE IF EXISTS`.
    pub fn build_drop(&self, table: &str) -> String {
        self.dialect.drop_table(table)
    }

    /// Introspection statement.
    pub fn build_describe(&self, table: &str) -> String {
        self.dialect.describe_table(table)
    }

    /// Computes `fields(shape) \ names(columns)` and renders one
    /// `ADD COLUMN` clause per missing field.
    pub fn build_update(
        &self,
        shape: &RecordShape,
        table: &str,
        columns: &[ColumnDescriptor],
    ) -> SchemaUpdate {
        let existing: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let added: Vec<FieldDescriptor> = shape
            .fields()
            .iter()
            .filter(|f| !existing.contains(f.name.as_ref()))
            .cloned()
            .collect();
        let clauses: Vec<String> = added
            .iter()
            .map(|f| format!("ADD COLUMN {}", self.dialect.add_column_definition(f)))
            .collect();
        let statements = if clauses.is_empty() {
            Vec::new()
        } else {
            self.dialect.alter_table(table, &clauses)
        };
        SchemaUpdate {
            table: table.to_string(),
            added,
            clauses,
            statements,
        }
    }

    /// Count-based validation: the number of persistent fields must equal
    /// the number of columns. Names and types are not compared.
    pub fn validate(
        &self,
        shape: &RecordShape,
        table: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<(), SchemaMismatchError> {
        if shape.len() == columns.len() {
            Ok(())
        } else {
            Err(SchemaMismatchError::ColumnCount {
                table: table.to_string(),
                fields: shape.len(),
                columns: columns.len(),
            })
        }
    }

    /// Parses describe rows into column descriptors.
    pub fn columns_from_rows(
        &self,
        rows: &[ResultRow],
    ) -> Result<Vec<ColumnDescriptor>, ResultShapeError> {
        rows.iter().map(|r| self.dialect.column_from_row(r)).collect()
    }
}

pub(crate) fn text_column<'a>(
    row: &'a ResultRow,
    column: &str,
) -> Result<&'a str, ResultShapeError> {
    let value = row.try_get(column)?;
    value.as_str().ok_or_else(|| ResultShapeError::TypeMismatch {
        column: column.to_string(),
        expected: "text",
        found: value.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldType;

    fn article_shape() -> RecordShape {
        RecordShape::new([
            FieldDescriptor::new("id", FieldType::Integer),
            FieldDescriptor::new("createdDate", FieldType::DateTime),
            FieldDescriptor::new("modifiedDate", FieldType::DateTime),
            FieldDescriptor::new("title", FieldType::Text),
            FieldDescriptor::new("body", FieldType::Text),
            FieldDescriptor::new("isBlind", FieldType::Boolean),
        ])
    }

    fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
        names
            .iter()
            .map(|name| ColumnDescriptor {
                name: (*name).to_string(),
                declared_type: String::from("TEXT"),
                nullable: false,
                primary_key: *name == "id",
            })
            .collect()
    }

    #[test]
    fn test_update_adds_only_missing_fields() {
        let converter = SchemaConverter::new(SqliteDialect::new());
        let update = converter.build_update(
            &article_shape(),
            "article",
            &columns(&["id", "createdDate", "modifiedDate", "title", "isBlind"]),
        );
        assert!(!update.is_noop());
        assert_eq!(update.added().len(), 1);
        assert_eq!(update.added()[0].name, "body");
        assert_eq!(update.clauses(), ["ADD COLUMN \"body\" TEXT NOT NULL DEFAULT ''"]);
    }

    #[test]
    fn test_update_is_monotonic() {
        let converter = SchemaConverter::new(SqliteDialect::new());
        let all = columns(&["id", "createdDate", "modifiedDate", "title", "body", "isBlind"]);
        for _ in 0..2 {
            let update = converter.build_update(&article_shape(), "article", &all);
            assert!(update.is_noop());
            assert!(update.clauses().is_empty());
            assert!(update.statements().is_empty());
        }
    }

    #[test]
    fn test_update_never_drops_extra_columns() {
        let converter = SchemaConverter::new(MySqlDialect::new());
        let update = converter.build_update(
            &article_shape(),
            "article",
            &columns(&[
                "id",
                "createdDate",
                "modifiedDate",
                "title",
                "body",
                "isBlind",
                "legacy",
            ]),
        );
        assert!(update.is_noop());
    }

    #[test]
    fn test_validate_is_count_based() {
        let converter = SchemaConverter::new(SqliteDialect::new());
        let shape = article_shape();

        let missing_one = columns(&["id", "createdDate", "modifiedDate", "title", "isBlind"]);
        assert_eq!(
            converter.validate(&shape, "article", &missing_one),
            Err(SchemaMismatchError::ColumnCount {
                table: String::from("article"),
                fields: 6,
                columns: 5,
            })
        );

        // Same count, different names: accepted.
        let renamed = columns(&["id", "a", "b", "c", "d", "e"]);
        assert!(converter.validate(&shape, "article", &renamed).is_ok());
    }
}
