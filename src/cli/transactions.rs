use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Transaction, TransactionKind};
use crate::stores::{SqliteTransactionStore, TransactionStore};

pub fn transaction_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Type", "Value", "Category", "Created"]);
    for txn in transactions {
        let value = match txn.kind {
            TransactionKind::Income => money(txn.value).green(),
            TransactionKind::Outcome => money(-txn.value).red(),
        };
        table.add_row(vec![
            Cell::new(txn.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(&txn.title),
            Cell::new(txn.kind),
            Cell::new(value).set_alignment(CellAlignment::Right),
            Cell::new(&txn.category.title),
            Cell::new(&txn.created_at),
        ]);
    }
    table
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let store = SqliteTransactionStore::new(&conn);

    let transactions = store.list()?;
    println!("Transactions\n{}", transaction_table(&transactions));

    let balance = store.balance()?;
    let total = if balance.total < 0.0 {
        money(balance.total).red().bold()
    } else {
        money(balance.total).green().bold()
    };
    println!("Income:  {}", money(balance.income));
    println!("Outcome: {}", money(balance.outcome));
    println!("Total:   {total}");
    Ok(())
}
