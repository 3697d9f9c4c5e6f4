//! Traits for the objects that persist categories and transactions, plus
//! their SQLite implementations.

mod sqlite;

pub use sqlite::{SqliteCategoryStore, SqliteTransactionStore};

use crate::db::now;
use crate::error::Result;
use crate::models::{Balance, Category, NewTransaction, Transaction};

/// Finds and creates transaction categories, keyed by title.
pub trait CategoryStore {
    /// Get the stored categories whose title is in `titles`.
    fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>>;

    /// Store a category for every title in one batch and return them in the
    /// same order as `titles`.
    ///
    /// A title that is already stored resolves to the existing category.
    fn save(&self, titles: &[String]) -> Result<Vec<Category>>;

    /// All categories with the number of transactions that reference them.
    fn list(&self) -> Result<Vec<(Category, usize)>>;
}

/// Creates, saves and queries transactions.
pub trait TransactionStore {
    /// Build unsaved transaction records. Nothing is written.
    fn create(&self, inputs: Vec<NewTransaction>) -> Vec<Transaction> {
        let created_at = now();
        inputs
            .into_iter()
            .map(|input| Transaction {
                id: None,
                title: input.title,
                kind: input.kind,
                value: input.value,
                category: input.category,
                created_at: created_at.clone(),
            })
            .collect()
    }

    /// Write `transactions` in one batch. Records without an id are inserted
    /// and get their id assigned; records with one are updated in place.
    fn save(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>>;

    /// All stored transactions in insertion order.
    fn list(&self) -> Result<Vec<Transaction>>;

    fn balance(&self) -> Result<Balance>;
}
