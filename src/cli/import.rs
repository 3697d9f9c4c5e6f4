use std::collections::HashSet;
use std::path::PathBuf;

use crate::cli::open_db;
use crate::cli::transactions::transaction_table;
use crate::error::Result;
use crate::importer::ImportTransactionsService;
use crate::stores::{SqliteCategoryStore, SqliteTransactionStore};

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_db()?;

    let service = ImportTransactionsService::new(
        SqliteCategoryStore::new(&conn),
        SqliteTransactionStore::new(&conn),
    );
    let created = service.execute(&file_path)?;

    if !created.is_empty() {
        println!("{}", transaction_table(&created));
    }
    let categories: HashSet<i64> = created.iter().map(|t| t.category.id).collect();
    println!(
        "{} transactions imported into {} categories",
        created.len(),
        categories.len()
    );
    Ok(())
}
