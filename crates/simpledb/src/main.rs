//! simpledb CLI
//!
//! Runs ad hoc statements and schema commands against a database.

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use simpledb::{Outcome, Param, SimpleDb, SimpleDbConfig};

/// Lightweight SQL access from the command line.
#[derive(Parser)]
#[command(name = "simpledb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Log every statement with its parameters inline.
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one statement.
    Exec {
        /// SQL text, `?` for parameters.
        sql: String,

        /// Parameter values, in placeholder order.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Show the columns of a table.
    Describe {
        /// Table name.
        table: String,
    },

    /// Drop a table if it exists.
    Drop {
        /// Table name.
        table: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SimpleDbConfig::new(&cli.database).with_dev_mode(cli.dev);
    let mut db = SimpleDb::connect(&config)?;

    match cli.command {
        Commands::Exec { sql, params } => {
            let params: Vec<Param> = params.into_iter().map(Param::from).collect();
            match db.run(&sql, params)? {
                Outcome::Rows(rows) => {
                    for row in &rows {
                        println!("{}", serde_json::to_string(row)?);
                    }
                    info!("{} row(s)", rows.len());
                }
                Outcome::GeneratedKey(Some(key)) => println!("{key}"),
                Outcome::GeneratedKey(None) => info!("No row inserted."),
                Outcome::AffectedRows(count) => println!("{count}"),
                Outcome::Executed { rows_affected } => {
                    info!("Statement executed ({rows_affected} row(s) changed).");
                }
            }
        }

        Commands::Describe { table } => {
            let columns = db.describe(&table)?;
            if columns.is_empty() {
                info!("Table {table} does not exist.");
            } else {
                println!("{:<24} {:<16} {:<8} KEY", "COLUMN", "TYPE", "NULL");
                println!("{:-<60}", "");
                for column in &columns {
                    println!(
                        "{:<24} {:<16} {:<8} {}",
                        column.name,
                        column.declared_type,
                        if column.nullable { "YES" } else { "NO" },
                        if column.primary_key { "PRI" } else { "" }
                    );
                }
            }
        }

        Commands::Drop { table } => {
            db.drop_table(&table)?;
        }
    }

    db.close()?;
    Ok(())
}
