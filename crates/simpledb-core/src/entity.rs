//! Record shapes and typed row mapping.
//!
//! Each record type declares its fields once, statically, as a list of
//! [`FieldDescriptor`]s. The same list drives DDL generation and the mapping
//! of result rows into the type. `#[derive(Entity)]` from `simpledb-derive`
//! writes the implementation; it can also be written by hand.

use std::borrow::Cow;

use chrono::NaiveDateTime;

use crate::error::ResultShapeError;
use crate::row::ResultRow;
use crate::value::SqlValue;

/// Name of the field that becomes the auto-incrementing primary key.
pub const ID_FIELD: &str = "id";

/// Semantic type of a field, independent of any SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Strings.
    Text,
    /// Signed and unsigned integers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Flags.
    Boolean,
    /// Timestamps.
    DateTime,
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name the field maps to.
    pub name: Cow<'static, str>,
    /// Semantic type.
    pub field_type: FieldType,
    /// Whether NULL is a legal value (`Option<T>` fields).
    pub nullable: bool,
    /// Whether the field is stored at all.
    pub persistent: bool,
}

impl FieldDescriptor {
    /// Creates a persistent, non-nullable field.
    #[must_use]
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            field_type,
            nullable: false,
            persistent: true,
        }
    }

    /// Creates a field from a runtime name.
    #[must_use]
    pub fn named(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            field_type,
            nullable: false,
            persistent: true,
        }
    }

    /// Marks the field nullable.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the field as not stored.
    #[must_use]
    pub const fn transient(mut self) -> Self {
        self.persistent = false;
        self
    }

    /// Returns whether this is the `id` primary-key field.
    #[must_use]
    pub fn is_id(&self) -> bool {
        self.name == ID_FIELD
    }
}

/// The stored fields of a record type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    fields: Vec<FieldDescriptor>,
}

impl RecordShape {
    /// Builds a shape, dropping non-persistent fields.
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            fields: fields.into_iter().filter(|f| f.persistent).collect(),
        }
    }

    /// Persistent fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_ref())
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of persistent fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the shape has no persistent fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A record type that maps to a table.
pub trait Entity: Sized {
    /// Default table name.
    const TABLE: &'static str;

    /// Every declared field, including non-persistent ones.
    const FIELDS: &'static [FieldDescriptor];

    /// The persistent shape of this type.
    fn shape() -> RecordShape {
        RecordShape::new(Self::FIELDS.iter().cloned())
    }

    /// Builds a value from a row.
    ///
    /// Fields without a same-named column keep their default; columns
    /// without a field are ignored.
    fn from_row(row: &ResultRow) -> Result<Self, ResultShapeError>;
}

/// Rust types usable as entity fields.
pub trait FieldValue {
    /// Semantic type of the field.
    const FIELD_TYPE: FieldType;
    /// Whether the field accepts NULL.
    const NULLABLE: bool = false;
}

/// Conversion from a column value.
pub trait FromSqlValue: Sized {
    /// Name used in mismatch errors.
    const EXPECTED: &'static str;

    /// Converts, returning `None` when the value has the wrong kind.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;

    /// Converts the value of `column`, naming it in the error.
    fn from_column(column: &str, value: &SqlValue) -> Result<Self, ResultShapeError> {
        Self::from_sql_value(value).ok_or_else(|| ResultShapeError::TypeMismatch {
            column: column.to_string(),
            expected: Self::EXPECTED,
            found: value.kind(),
        })
    }
}

/// Reads `column` from `row` into a field, or its default when absent.
pub fn field_or_default<T>(row: &ResultRow, column: &str) -> Result<T, ResultShapeError>
where
    T: FromSqlValue + Default,
{
    row.get(column)
        .map_or_else(|| Ok(T::default()), |value| T::from_column(column, value))
}

macro_rules! impl_integer_field {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                const FIELD_TYPE: FieldType = FieldType::Integer;
            }

            impl FromSqlValue for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn from_sql_value(value: &SqlValue) -> Option<Self> {
                    value.as_i64().and_then(|n| <$t>::try_from(n).ok())
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;
}

impl FromSqlValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;
}

impl FromSqlValue for f64 {
    const EXPECTED: &'static str = "f64";

    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(f) => Some(*f),
            SqlValue::Int(n) => Some(*n as Self),
            _ => None,
        }
    }
}

impl FieldValue for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float;
}

impl FromSqlValue for f32 {
    const EXPECTED: &'static str = "f32";

    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        f64::from_sql_value(value).map(|f| f as Self)
    }
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;
}

impl FromSqlValue for String {
    const EXPECTED: &'static str = "String";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FieldValue for NaiveDateTime {
    const FIELD_TYPE: FieldType = FieldType::DateTime;
}

impl FromSqlValue for NaiveDateTime {
    const EXPECTED: &'static str = "NaiveDateTime";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        value.as_datetime()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const NULLABLE: bool = true;
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}
