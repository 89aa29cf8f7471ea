//! # simpledb-core
//!
//! Driver-agnostic building blocks of `simpledb`:
//!
//! - [`SqlValue`] and [`Param`]: what gets bound to `?` placeholders
//! - [`binder`]: placeholder counting and list expansion
//! - [`StatementType`]: first-word classification and its execution strategy
//! - [`ResultRow`]: one row of a result set
//! - [`Entity`] and [`RecordShape`]: statically declared record types
//! - [`SchemaConverter`]: DDL for a record shape, per [`SchemaDialect`]
//! - [`ReconciliationPolicy`]
//!
//! Nothing here talks to a database.
//!
//! ## Binding
//!
//! ```
//! use simpledb_core::binder::{finalize, Fragment};
//! use simpledb_core::SqlValue;
//!
//! let fragments = [
//!     Fragment::new("SELECT * FROM article WHERE id IN (?)", (vec![1_i64, 2, 3],)),
//!     Fragment::new("AND title = ?", ("hello",)),
//! ];
//! let (sql, values) = finalize(&fragments).unwrap();
//! assert_eq!(sql, "SELECT * FROM article WHERE id IN (?, ?, ?) AND title = ?");
//! assert_eq!(values.len(), 4);
//! assert_eq!(values[3], SqlValue::from("hello"));
//! ```

extern crate self as simpledb_core;

pub mod binder;
pub mod entity;
mod error;
mod param;
mod policy;
mod row;
pub mod schema;
mod statement;
mod value;

pub use binder::Fragment;
pub use entity::{Entity, FieldDescriptor, FieldType, FieldValue, FromSqlValue, RecordShape};
pub use error::{BindingError, ResultShapeError, SchemaMismatchError};
pub use param::{IntoParams, Param};
pub use policy::{ParsePolicyError, ReconciliationPolicy};
pub use row::ResultRow;
pub use schema::{
    ColumnDescriptor, MySqlDialect, SchemaConverter, SchemaDialect, SchemaUpdate, SqliteDialect,
};
pub use statement::{ExecutionStrategy, StatementType};
pub use value::{parse_datetime, SqlValue};
