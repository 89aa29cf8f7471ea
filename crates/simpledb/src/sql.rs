//! The fragment-based statement builder.
//!
//! A [`Sql`] collects fragments and runs once, through one of its terminal
//! operations. Terminals consume the builder.
//!
//! ```no_run
//! # fn example(db: &mut simpledb::SimpleDb) -> simpledb::Result<()> {
//! let ids = db
//!     .gen_sql()
//!     .append("SELECT id FROM article")
//!     .append_in("WHERE id IN (?)", vec![1_i64, 2, 3])
//!     .append_with("AND is_blind = ?", (false,))
//!     .select_longs()?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDateTime;
use simpledb_core::binder::{self, Fragment};
use simpledb_core::{Entity, IntoParams, Param, ResultRow, ResultShapeError, SqlValue};

use crate::dispatcher::Outcome;
use crate::error::{Error, Result};
use crate::session::SimpleDb;

/// A statement under construction, bound to a session.
#[must_use = "a statement does nothing until a terminal operation runs it"]
#[derive(Debug)]
pub struct Sql<'db> {
    db: &'db mut SimpleDb,
    fragments: Vec<Fragment>,
}

impl<'db> Sql<'db> {
    pub(crate) fn new(db: &'db mut SimpleDb) -> Self {
        Self {
            db,
            fragments: Vec::new(),
        }
    }

    /// Appends a fragment without parameters.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(Fragment::new(text, ()));
        self
    }

    /// Appends a fragment whose `?` markers take `params`, in order.
    pub fn append_with(mut self, text: impl Into<String>, params: impl IntoParams) -> Self {
        self.fragments.push(Fragment::new(text, params));
        self
    }

    /// Appends a fragment with a single list parameter, expanded into one
    /// marker per element.
    pub fn append_in(mut self, text: impl Into<String>, list: impl Into<Param>) -> Self {
        let list = match list.into() {
            Param::Scalar(value) => Param::List(vec![value]),
            list @ Param::List(_) => list,
        };
        self.fragments.push(Fragment::new(text, vec![list]));
        self
    }

    /// Finalizes the statement without running it.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        Ok(binder::finalize(&self.fragments)?)
    }

    fn execute(self) -> Result<(String, Outcome)> {
        let Self { db, fragments } = self;
        let (sql, params) = binder::finalize(&fragments)?;
        let outcome = db.execute(&sql, &params)?;
        Ok((sql, outcome))
    }

    fn rows(self) -> Result<Vec<ResultRow>> {
        let (_, outcome) = self.execute()?;
        Ok(outcome.into_rows()?)
    }

    /// First column of the first row, `None` when there are no rows.
    fn first_value(self) -> Result<Option<(String, SqlValue)>> {
        let Some(row) = self.rows()?.into_iter().next() else {
            return Ok(None);
        };
        row.into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| ResultShapeError::NoColumns.into())
    }

    fn scalar<T>(
        self,
        expected: &'static str,
        read: impl FnOnce(&SqlValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.first_value()? {
            None => Ok(None),
            Some((_, SqlValue::Null)) => Ok(None),
            Some((column, value)) => read(&value).map(Some).ok_or_else(|| {
                ResultShapeError::TypeMismatch {
                    column,
                    expected,
                    found: value.kind(),
                }
                .into()
            }),
        }
    }

    /// Runs an `INSERT` and returns the generated key.
    pub fn insert(self) -> Result<i64> {
        match self.execute()? {
            (_, Outcome::GeneratedKey(Some(key))) => Ok(key),
            (sql, Outcome::GeneratedKey(None)) => Err(Error::NoGeneratedKey { sql }),
            (_, other) => Err(unexpected("generated key", &other)),
        }
    }

    /// Runs an `UPDATE` and returns the number of affected rows.
    pub fn update(self) -> Result<u64> {
        self.affected_rows()
    }

    /// Runs a `DELETE` and returns the number of affected rows.
    pub fn delete(self) -> Result<u64> {
        self.affected_rows()
    }

    fn affected_rows(self) -> Result<u64> {
        match self.execute()? {
            (_, Outcome::AffectedRows(count)) => Ok(count),
            (_, other) => Err(unexpected("affected rows", &other)),
        }
    }

    /// First column of the first row as an integer.
    pub fn select_long(self) -> Result<Option<i64>> {
        self.scalar("integer", SqlValue::as_i64)
    }

    /// First column of every row as an integer. NULLs are skipped.
    pub fn select_longs(self) -> Result<Vec<i64>> {
        let mut longs = Vec::new();
        for row in self.rows()? {
            let (column, value) = row.first().ok_or(ResultShapeError::NoColumns)?;
            if value.is_null() {
                continue;
            }
            let long = value.as_i64().ok_or_else(|| ResultShapeError::TypeMismatch {
                column: column.to_string(),
                expected: "integer",
                found: value.kind(),
            })?;
            longs.push(long);
        }
        Ok(longs)
    }

    /// First column of the first row as text. Numbers, flags and date-times
    /// are rendered; blobs are rejected.
    pub fn select_string(self) -> Result<Option<String>> {
        self.scalar("text", |value| match value {
            SqlValue::Blob(_) => None,
            other => Some(other.to_string()),
        })
    }

    /// First column of the first row as a date-time.
    pub fn select_datetime(self) -> Result<Option<NaiveDateTime>> {
        self.scalar("datetime", SqlValue::as_datetime)
    }

    /// First column of the first row as a flag.
    pub fn select_bool(self) -> Result<Option<bool>> {
        self.scalar("bool", SqlValue::as_bool)
    }

    /// The first row, or an empty row when there are none.
    pub fn select_row(self) -> Result<ResultRow> {
        Ok(self.rows()?.into_iter().next().unwrap_or_default())
    }

    /// Every row.
    pub fn select_rows(self) -> Result<Vec<ResultRow>> {
        self.rows()
    }

    /// The first row mapped into `T`.
    pub fn select_row_as<T: Entity>(self) -> Result<Option<T>> {
        self.rows()?
            .first()
            .map(T::from_row)
            .transpose()
            .map_err(Error::from)
    }

    /// Every row mapped into `T`.
    pub fn select_rows_as<T: Entity>(self) -> Result<Vec<T>> {
        self.rows()?
            .iter()
            .map(|row| T::from_row(row).map_err(Error::from))
            .collect()
    }
}

fn unexpected(expected: &'static str, outcome: &Outcome) -> Error {
    ResultShapeError::UnexpectedOutcome {
        expected,
        found: outcome.kind(),
    }
    .into()
}
