//! The connection session.
//!
//! [`SimpleDb`] owns one SQLite connection and a current-thread runtime that
//! drives it, so every method blocks until the database answers. Do not call
//! it from inside another async runtime.

use std::str::FromStr;

use simpledb_core::binder;
use simpledb_core::{
    ColumnDescriptor, Entity, IntoParams, RecordShape, ReconciliationPolicy, SchemaConverter,
    SqlValue, SqliteDialect,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::config::SimpleDbConfig;
use crate::dispatcher::{self, Outcome};
use crate::error::{Error, Result};
use crate::sql::Sql;

/// A database session: one connection, its transaction state and the
/// reconciliation policy.
#[derive(Debug)]
pub struct SimpleDb {
    runtime: Runtime,
    conn: SqliteConnection,
    converter: SchemaConverter<SqliteDialect>,
    policy: ReconciliationPolicy,
    dev_mode: bool,
    in_transaction: bool,
}

impl SimpleDb {
    /// Opens a session as configured.
    pub fn connect(config: &SimpleDbConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(Error::Connection)?
            .create_if_missing(true);
        let conn = runtime
            .block_on(options.connect())
            .map_err(Error::Connection)?;
        info!(url = %config.url, policy = %config.policy, "Connected");

        Ok(Self {
            runtime,
            conn,
            converter: SchemaConverter::new(SqliteDialect::new()),
            policy: config.policy,
            dev_mode: config.dev_mode,
            in_transaction: false,
        })
    }

    /// Opens a session on `url` with default settings.
    pub fn open(url: &str) -> Result<Self> {
        Self::connect(&SimpleDbConfig::new(url))
    }

    /// Closes the connection. An open transaction is rolled back by the
    /// database.
    pub fn close(self) -> Result<()> {
        if self.in_transaction {
            warn!("Closing session with an open transaction");
        }
        let Self { runtime, conn, .. } = self;
        runtime.block_on(conn.close()).map_err(Error::Connection)?;
        info!("Connection closed");
        Ok(())
    }

    /// Starts a statement.
    pub fn gen_sql(&mut self) -> Sql<'_> {
        Sql::new(self)
    }

    /// Binds `params` to `sql` and runs it.
    ///
    /// `BEGIN`, `COMMIT` and `ROLLBACK` sent here reach the database but are
    /// not tracked by the session; use [`start_transaction`](Self::start_transaction),
    /// [`commit`](Self::commit) and [`rollback`](Self::rollback) instead.
    pub fn run(&mut self, sql: &str, params: impl IntoParams) -> Result<Outcome> {
        let (sql, values) = binder::bind(sql, &params.into_params())?;
        self.execute(&sql, &values)
    }

    pub(crate) fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Outcome> {
        if self.dev_mode {
            info!(sql = %binder::render_inline(sql, params), "SQL");
        }
        self.runtime
            .block_on(dispatcher::dispatch(&mut self.conn, sql, params))
    }

    /// Whether statements are logged with their parameters inline.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Toggles development logging.
    pub fn set_dev_mode(&mut self, dev_mode: bool) {
        self.dev_mode = dev_mode;
    }

    // Transactions

    /// Returns whether a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Begins a transaction. Nested transactions are not supported.
    pub fn start_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(Error::TransactionState("a transaction is already active"));
        }
        self.execute("BEGIN", &[])?;
        self.in_transaction = true;
        info!("Transaction started");
        Ok(())
    }

    /// Persists every statement since [`start_transaction`](Self::start_transaction).
    pub fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(Error::TransactionState("no active transaction to commit"));
        }
        if let Err(err) = self.execute("COMMIT", &[]) {
            if ended_by_engine(&err) {
                warn!("Transaction already ended by the database");
                self.in_transaction = false;
            }
            return Err(err);
        }
        self.in_transaction = false;
        info!("Transaction committed");
        Ok(())
    }

    /// Discards every statement since [`start_transaction`](Self::start_transaction).
    ///
    /// A failed statement inside a transaction does not roll it back; call
    /// this explicitly. The session leaves the transaction even when
    /// `ROLLBACK` fails, e.g. because the database already ended it after an
    /// `OR ROLLBACK` conflict; the error is still returned.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(Error::TransactionState("no active transaction to roll back"));
        }
        self.in_transaction = false;
        self.execute("ROLLBACK", &[])?;
        info!("Transaction rolled back");
        Ok(())
    }

    // Schema

    /// The current reconciliation policy.
    #[must_use]
    pub const fn reconciliation_policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    /// Sets the policy used by subsequent [`reconcile`](Self::reconcile) calls.
    pub fn set_reconciliation_policy(&mut self, policy: ReconciliationPolicy) {
        self.policy = policy;
    }

    /// Columns of `table`, empty when the table does not exist.
    pub fn describe(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let sql = self.converter.build_describe(table);
        let rows = self.execute(&sql, &[])?.into_rows()?;
        Ok(self.converter.columns_from_rows(&rows)?)
    }

    /// Returns whether `table` exists.
    pub fn table_exists(&mut self, table: &str) -> Result<bool> {
        let count = self
            .gen_sql()
            .append_with(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                (table,),
            )
            .select_long()?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Creates `table` from `shape`.
    pub fn create_table(&mut self, shape: &RecordShape, table: &str) -> Result<()> {
        let sql = self.converter.build_create(shape, table);
        self.execute(&sql, &[])?;
        info!(table, "Created table");
        Ok(())
    }

    /// Drops `table` if it exists.
    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        let sql = self.converter.build_drop(table);
        self.execute(&sql, &[])?;
        info!(table, "Dropped table");
        Ok(())
    }

    /// Brings `table` into agreement with `shape` under the current policy.
    pub fn reconcile(&mut self, shape: &RecordShape, table: &str) -> Result<()> {
        let policy = self.policy;
        debug!(table, %policy, fields = shape.len(), "Reconciling");
        match policy {
            ReconciliationPolicy::None => Ok(()),
            ReconciliationPolicy::Create => self.recreate(shape, table),
            ReconciliationPolicy::CreateDrop => {
                self.recreate(shape, table)?;
                self.drop_table(table)
            }
            ReconciliationPolicy::Validate => {
                let columns = self.describe(table)?;
                self.converter
                    .validate(shape, table, &columns)
                    .map_err(|err| {
                        warn!(table, error = %err, "Schema validation failed");
                        Error::from(err)
                    })
            }
            ReconciliationPolicy::Update => {
                let columns = self.describe(table)?;
                if columns.is_empty() {
                    return self.create_table(shape, table);
                }
                let update = self.converter.build_update(shape, table, &columns);
                if update.is_noop() {
                    debug!(table, "Schema up to date");
                    return Ok(());
                }
                for statement in update.statements() {
                    self.execute(statement, &[])?;
                }
                for field in update.added() {
                    info!(table, column = %field.name, "Added column");
                }
                Ok(())
            }
        }
    }

    /// [`reconcile`](Self::reconcile) for an entity type and its table.
    pub fn reconcile_entity<T: Entity>(&mut self) -> Result<()> {
        self.reconcile(&T::shape(), T::TABLE)
    }

    fn recreate(&mut self, shape: &RecordShape, table: &str) -> Result<()> {
        self.drop_table(table)?;
        self.create_table(shape, table)
    }
}

/// Whether `err` reports that the database has no open transaction.
fn ended_by_engine(err: &Error) -> bool {
    match err {
        Error::QueryExecution {
            source: sqlx::Error::Database(db),
            ..
        } => db.message().contains("no transaction is active"),
        _ => false,
    }
}
