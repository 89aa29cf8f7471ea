//! Statement dispatch.
//!
//! A finalized statement is classified once by its leading keyword, and the
//! resulting [`ExecutionStrategy`] picks how it runs against the connection
//! and what it yields.

use simpledb_core::{ExecutionStrategy, ResultRow, ResultShapeError, SqlValue, StatementType};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection};
use tracing::debug;

use crate::error::{Error, Result};
use crate::row_mapper;

/// What executing a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `INSERT`: the generated key, `None` when no row was inserted.
    GeneratedKey(Option<i64>),
    /// `UPDATE` / `DELETE`: number of affected rows.
    AffectedRows(u64),
    /// `SELECT` / `SHOW` / `DESC` / `PRAGMA`: every row, in order.
    Rows(Vec<ResultRow>),
    /// Anything else: executed, with the rows it reported as changed.
    Executed {
        /// Rows reported as changed, usually zero for DDL.
        rows_affected: u64,
    },
}

impl Outcome {
    /// Short name of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GeneratedKey(_) => "generated key",
            Self::AffectedRows(_) => "affected rows",
            Self::Rows(_) => "row set",
            Self::Executed { .. } => "execution status",
        }
    }

    /// Returns the rows, failing for outcomes without a row set.
    pub fn into_rows(self) -> std::result::Result<Vec<ResultRow>, ResultShapeError> {
        match self {
            Self::Rows(rows) => Ok(rows),
            other => Err(ResultShapeError::NoRowSet(other.kind())),
        }
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_value<'q>(query: SqliteQuery<'q>, value: &SqlValue) -> SqliteQuery<'q> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::DateTime(dt) => query.bind(*dt),
        SqlValue::Blob(b) => query.bind(b.clone()),
    }
}

fn execution_error(sql: &str) -> impl FnOnce(sqlx::Error) -> Error + '_ {
    move |source| Error::QueryExecution {
        sql: sql.to_string(),
        source,
    }
}

/// Classifies `sql`, runs it with `params` bound in order, and shapes the
/// result.
pub async fn dispatch(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<Outcome> {
    let statement_type = StatementType::classify(sql)
        .ok_or_else(|| Error::InvalidStatement(format!("no leading keyword in `{sql}`")))?;
    let strategy = statement_type.strategy();
    debug!(
        sql,
        statement = %statement_type,
        params = params.len(),
        "Executing statement"
    );

    let query = params
        .iter()
        .fold(sqlx::query(sql), |query, value| bind_value(query, value));

    let outcome = match strategy {
        ExecutionStrategy::GeneratedKey => {
            let result = query.execute(&mut *conn).await.map_err(execution_error(sql))?;
            let key = (result.rows_affected() > 0).then(|| result.last_insert_rowid());
            Outcome::GeneratedKey(key)
        }
        ExecutionStrategy::AffectedRows => {
            let result = query.execute(&mut *conn).await.map_err(execution_error(sql))?;
            Outcome::AffectedRows(result.rows_affected())
        }
        ExecutionStrategy::RowSet => {
            let rows = query.fetch_all(&mut *conn).await.map_err(execution_error(sql))?;
            Outcome::Rows(row_mapper::map_rows(&rows)?)
        }
        ExecutionStrategy::Generic => {
            let result = query.execute(&mut *conn).await.map_err(execution_error(sql))?;
            Outcome::Executed {
                rows_affected: result.rows_affected(),
            }
        }
    };

    debug!(outcome = outcome.kind(), "Statement completed");
    Ok(outcome)
}
