use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::stores::{CategoryStore, SqliteCategoryStore};

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let categories = SqliteCategoryStore::new(&conn).list()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Transactions", "Created"]);
    for (category, count) in categories {
        table.add_row(vec![
            Cell::new(category.id),
            Cell::new(category.title),
            Cell::new(count),
            Cell::new(category.created_at),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}
