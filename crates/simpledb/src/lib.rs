//! # simpledb
//!
//! A lightweight SQL access layer over SQLite:
//!
//! - raw SQL fragments with positional `?` parameters, where a list value
//!   expands into one marker per element
//! - terminal operations shaped by statement kind (generated key, affected
//!   rows, scalars, rows, typed records)
//! - explicit transactions
//! - reconciliation of a declared record shape against a live table
//!
//! ## Quick Start
//!
//! ```no_run
//! use simpledb::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! struct Article {
//!     id: i64,
//!     title: String,
//!     is_blind: bool,
//! }
//!
//! fn main() -> simpledb::Result<()> {
//!     let mut db = SimpleDb::open("sqlite::memory:")?;
//!     db.set_reconciliation_policy(ReconciliationPolicy::Create);
//!     db.reconcile_entity::<Article>()?;
//!
//!     let id = db
//!         .gen_sql()
//!         .append_with("INSERT INTO article (title, is_blind) VALUES (?, ?)", ("hello", false))
//!         .insert()?;
//!
//!     let article: Option<Article> = db
//!         .gen_sql()
//!         .append_with("SELECT * FROM article WHERE id = ?", (id,))
//!         .select_row_as()?;
//!     assert_eq!(article.map(|a| a.title).as_deref(), Some("hello"));
//!     db.close()
//! }
//! ```
//!
//! The derive expands to paths under `simpledb_core`, so crates using
//! `#[derive(Entity)]` depend on `simpledb-core` as well.

pub mod config;
pub mod dispatcher;
mod error;
mod row_mapper;
mod session;
mod sql;

pub use config::SimpleDbConfig;
pub use dispatcher::Outcome;
pub use error::{Error, Result};
pub use session::SimpleDb;
pub use sql::Sql;

pub use simpledb_core::{
    binder, entity, schema, ColumnDescriptor, Entity, FieldDescriptor, FieldType, IntoParams,
    Param, RecordShape, ReconciliationPolicy, ResultRow, SqlValue, StatementType,
};
pub use simpledb_derive::Entity;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Entity, Outcome, ReconciliationPolicy, ResultRow, SimpleDb, SimpleDbConfig, Sql, SqlValue,
    };
}
