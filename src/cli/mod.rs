pub mod categories;
pub mod import;
pub mod init;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db, DB_FILE};
use crate::error::Result;
use crate::settings::get_data_dir;

#[derive(Parser)]
#[command(name = "tally", about = "Income/outcome ledger with batch CSV import.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a CSV file (title,type,value,category) and delete it afterwards.
    Import {
        /// Path to the CSV file; the first line is treated as the header
        file: String,
    },
    /// List transactions and the current balance.
    Transactions,
    /// List categories with their transaction counts.
    Categories,
}

/// Open the configured database, creating the data directory and schema if
/// they are missing.
pub(crate) fn open_db() -> Result<Connection> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILE))?;
    init_db(&conn)?;
    Ok(conn)
}
