//! MySQL dialect.
//!
//! Rendered only; the bundled backend executes against SQLite.

use crate::entity::{FieldDescriptor, FieldType};
use crate::error::ResultShapeError;
use crate::row::ResultRow;

use super::{text_column, ColumnDescriptor, SchemaDialect};

/// MySQL schema dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SchemaDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_name(&self, field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Text => "VARCHAR(255)",
            FieldType::Integer => "BIGINT",
            FieldType::Float => "DOUBLE",
            FieldType::Boolean => "BIT(1)",
            FieldType::DateTime => "DATETIME",
        }
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn id_definition(&self, field: &FieldDescriptor) -> String {
        let id = self.quote_identifier(&field.name);
        format!("{id} INT UNSIGNED NOT NULL AUTO_INCREMENT,\n  PRIMARY KEY({id})")
    }

    fn describe_table(&self, table: &str) -> String {
        format!("DESC {}", self.quote_identifier(table))
    }

    fn alter_table(&self, table: &str, clauses: &[String]) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} {}",
            self.quote_identifier(table),
            clauses.join(", ")
        )]
    }

    fn column_from_row(&self, row: &ResultRow) -> Result<ColumnDescriptor, ResultShapeError> {
        Ok(ColumnDescriptor {
            name: text_column(row, "Field")?.to_string(),
            declared_type: text_column(row, "Type")?.to_string(),
            nullable: text_column(row, "Null")?.eq_ignore_ascii_case("YES"),
            primary_key: text_column(row, "Key")?.eq_ignore_ascii_case("PRI"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RecordShape;
    use crate::schema::SchemaConverter;
    use crate::value::SqlValue;

    fn article() -> RecordShape {
        RecordShape::new([
            FieldDescriptor::new("id", FieldType::Integer),
            FieldDescriptor::new("createdDate", FieldType::DateTime),
            FieldDescriptor::new("title", FieldType::Text),
            FieldDescriptor::new("hits", FieldType::Integer),
            FieldDescriptor::new("isBlind", FieldType::Boolean),
        ])
    }

    #[test]
    fn test_create_table() {
        let converter = SchemaConverter::new(MySqlDialect::new());
        assert_eq!(
            converter.build_create(&article(), "article"),
            "CREATE TABLE `article` (\n  \
             `id` INT UNSIGNED NOT NULL AUTO_INCREMENT,\n  \
             PRIMARY KEY(`id`),\n  \
             `createdDate` DATETIME NOT NULL,\n  \
             `title` VARCHAR(255) NOT NULL,\n  \
             `hits` BIGINT NOT NULL,\n  \
             `isBlind` BIT(1) NOT NULL\n)"
        );
    }

    #[test]
    fn test_drop_and_describe() {
        let converter = SchemaConverter::new(MySqlDialect::new());
        assert_eq!(converter.build_drop("article"), "DROP TABLE IF EXISTS `article`");
        assert_eq!(converter.build_describe("article"), "DESC `article`");
    }

    #[test]
    fn test_alter_is_single_statement() {
        let converter = SchemaConverter::new(MySqlDialect::new());
        let existing: Vec<ColumnDescriptor> = ["id", "createdDate", "hits"]
            .iter()
            .map(|name| ColumnDescriptor {
                name: (*name).to_string(),
                declared_type: String::new(),
                nullable: false,
                primary_key: false,
            })
            .collect();
        let update = converter.build_update(&article(), "article", &existing);
        assert_eq!(
            update.statements(),
            ["ALTER TABLE `article` ADD COLUMN `title` VARCHAR(255) NOT NULL, \
              ADD COLUMN `isBlind` BIT(1) NOT NULL"]
        );
    }

    #[test]
    fn test_quote_escapes_backtick() {
        assert_eq!(MySqlDialect::new().quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_column_from_desc_row() {
        let row: ResultRow = [
            ("Field", SqlValue::from("id")),
            ("Type", SqlValue::from("int unsigned")),
            ("Null", SqlValue::from("NO")),
            ("Key", SqlValue::from("PRI")),
            ("Default", SqlValue::Null),
            ("Extra", SqlValue::from("auto_increment")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let column = MySqlDialect::new().column_from_row(&row).unwrap();
        assert_eq!(column.name, "id");
        assert!(!column.nullable);
        assert!(column.primary_key);
    }
}
