use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row};

use crate::db::now;
use crate::error::Result;
use crate::models::{Balance, Category, Transaction, TransactionKind};
use crate::stores::{CategoryStore, TransactionStore};

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

fn map_category(row: &Row, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        created_at: row.get(offset + 2)?,
    })
}

/// Titles bound per `IN (...)` lookup. SQLite builds older than 3.32 cap
/// host parameters at 999 per statement.
const MAX_BOUND_TITLES: usize = 999;

/// Category store backed by the `categories` table.
pub struct SqliteCategoryStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteCategoryStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl CategoryStore for SqliteCategoryStore<'_> {
    fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>> {
        let mut categories = Vec::new();
        for chunk in titles.chunks(MAX_BOUND_TITLES) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, title, created_at FROM categories WHERE title IN ({placeholders}) ORDER BY id"
            );
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let found = stmt
                .query_map(rusqlite::params_from_iter(chunk), |row| map_category(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            categories.extend(found);
        }
        Ok(categories)
    }

    fn save(&self, titles: &[String]) -> Result<Vec<Category>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = Vec::with_capacity(titles.len());
        {
            let mut insert = tx.prepare(
                "INSERT INTO categories (title, created_at) VALUES (?1, ?2) ON CONFLICT(title) DO NOTHING",
            )?;
            let mut select =
                tx.prepare("SELECT id, title, created_at FROM categories WHERE title = ?1")?;
            let created_at = now();
            for title in titles {
                insert.execute(rusqlite::params![title, created_at])?;
                saved.push(select.query_row([title], |row| map_category(row, 0))?);
            }
        }
        tx.commit()?;
        Ok(saved)
    }

    fn list(&self) -> Result<Vec<(Category, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.title, c.created_at, count(t.id) FROM categories c \
             LEFT JOIN transactions t ON t.category_id = c.id \
             GROUP BY c.id ORDER BY c.title",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let count: i64 = row.get(3)?;
                Ok((map_category(row, 0)?, count as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Transaction store backed by the `transactions` table.
pub struct SqliteTransactionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTransactionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TransactionStore for SqliteTransactionStore<'_> {
    fn save(&self, mut transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        if transactions.is_empty() {
            return Ok(transactions);
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO transactions (title, type, value, category_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            let mut update = tx.prepare(
                "UPDATE transactions SET title = ?1, type = ?2, value = ?3, category_id = ?4 \
                 WHERE id = ?5",
            )?;
            for txn in transactions.iter_mut() {
                match txn.id {
                    Some(id) => {
                        update.execute(rusqlite::params![
                            txn.title,
                            txn.kind,
                            txn.value,
                            txn.category.id,
                            id
                        ])?;
                    }
                    None => {
                        txn.id = Some(insert.insert(rusqlite::params![
                            txn.title,
                            txn.kind,
                            txn.value,
                            txn.category.id,
                            txn.created_at
                        ])?);
                    }
                }
            }
        }
        tx.commit()?;
        Ok(transactions)
    }

    fn list(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.title, t.type, t.value, t.created_at, c.id, c.title, c.created_at \
             FROM transactions t JOIN categories c ON c.id = t.category_id ORDER BY t.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Transaction {
                    id: Some(row.get(0)?),
                    title: row.get(1)?,
                    kind: row.get(2)?,
                    value: row.get(3)?,
                    created_at: row.get(4)?,
                    category: map_category(row, 5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn balance(&self) -> Result<Balance> {
        let (income, outcome): (f64, f64) = self.conn.query_row(
            "SELECT \
                COALESCE(SUM(CASE WHEN type = 'income' THEN value END), 0.0), \
                COALESCE(SUM(CASE WHEN type = 'outcome' THEN value END), 0.0) \
             FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(Balance {
            income,
            outcome,
            total: income - outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::NewTransaction;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn new_txn(title: &str, kind: TransactionKind, value: f64, category: &Category) -> NewTransaction {
        NewTransaction {
            title: title.to_string(),
            kind,
            value,
            category: category.clone(),
        }
    }

    #[test]
    fn test_save_categories_assigns_ids_in_order() {
        let (_dir, conn) = test_db();
        let store = SqliteCategoryStore::new(&conn);
        let saved = store.save(&titles(&["Job", "Food"])).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].title, "Job");
        assert_eq!(saved[1].title, "Food");
        assert!(saved[0].id > 0);
        assert_ne!(saved[0].id, saved[1].id);
    }

    #[test]
    fn test_save_existing_category_resolves_to_stored_row() {
        let (_dir, conn) = test_db();
        let store = SqliteCategoryStore::new(&conn);
        let first = store.save(&titles(&["Food"])).unwrap();
        let second = store.save(&titles(&["Food"])).unwrap();
        assert_eq!(first[0].id, second[0].id);
        let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_find_by_titles_matches_exactly() {
        let (_dir, conn) = test_db();
        let store = SqliteCategoryStore::new(&conn);
        store.save(&titles(&["Food", "Transport", "Job"])).unwrap();
        let found = store.find_by_titles(&titles(&["Food", "food", "Job"])).unwrap();
        let found: Vec<&str> = found.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(found, vec!["Food", "Job"]);
        assert!(store.find_by_titles(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_titles_beyond_parameter_limit() {
        let (_dir, conn) = test_db();
        let store = SqliteCategoryStore::new(&conn);
        let wanted: Vec<String> = (0..40_000).map(|i| format!("category-{i}")).collect();
        store.save(&titles(&["category-0", "category-20000", "category-39999"])).unwrap();

        let found = store.find_by_titles(&wanted).unwrap();
        let mut found: Vec<&str> = found.iter().map(|c| c.title.as_str()).collect();
        found.sort();
        assert_eq!(found, vec!["category-0", "category-20000", "category-39999"]);
    }

    #[test]
    fn test_save_transactions_assigns_ids() {
        let (_dir, conn) = test_db();
        let categories = SqliteCategoryStore::new(&conn).save(&titles(&["Job"])).unwrap();
        let store = SqliteTransactionStore::new(&conn);
        let created = store.create(vec![new_txn("Salary", TransactionKind::Income, 5000.0, &categories[0])]);
        assert_eq!(created[0].id, None);
        let saved = store.save(created).unwrap();
        assert!(saved[0].id.is_some());

        let listed = store.list().unwrap();
        assert_eq!(listed, saved);
    }

    #[test]
    fn test_save_updates_transaction_with_id() {
        let (_dir, conn) = test_db();
        let categories = SqliteCategoryStore::new(&conn).save(&titles(&["Food"])).unwrap();
        let store = SqliteTransactionStore::new(&conn);
        let mut saved = store
            .save(store.create(vec![new_txn("Coffee", TransactionKind::Outcome, 8.0, &categories[0])]))
            .unwrap();
        saved[0].value = 9.5;
        store.save(saved).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].value, 9.5);
    }

    #[test]
    fn test_balance_sums_by_kind() {
        let (_dir, conn) = test_db();
        let categories = SqliteCategoryStore::new(&conn).save(&titles(&["Job", "Food"])).unwrap();
        let store = SqliteTransactionStore::new(&conn);
        assert_eq!(store.balance().unwrap(), Balance::default());
        store
            .save(store.create(vec![
                new_txn("Salary", TransactionKind::Income, 5000.0, &categories[0]),
                new_txn("Coffee", TransactionKind::Outcome, 8.0, &categories[1]),
                new_txn("Lunch", TransactionKind::Outcome, 12.0, &categories[1]),
            ]))
            .unwrap();
        let balance = store.balance().unwrap();
        assert_eq!(balance.income, 5000.0);
        assert_eq!(balance.outcome, 20.0);
        assert_eq!(balance.total, 4980.0);
    }

    #[test]
    fn test_list_categories_counts_transactions() {
        let (_dir, conn) = test_db();
        let category_store = SqliteCategoryStore::new(&conn);
        let categories = category_store.save(&titles(&["Food", "Job"])).unwrap();
        let store = SqliteTransactionStore::new(&conn);
        store
            .save(store.create(vec![
                new_txn("Coffee", TransactionKind::Outcome, 8.0, &categories[0]),
                new_txn("Lunch", TransactionKind::Outcome, 12.0, &categories[0]),
            ]))
            .unwrap();
        let listed = category_store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0.title, "Food");
        assert_eq!(listed[0].1, 2);
        assert_eq!(listed[1].0.title, "Job");
        assert_eq!(listed[1].1, 0);
    }
}
