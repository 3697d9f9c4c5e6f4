use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TallyError};
use crate::models::{Category, CsvRow, NewTransaction, Transaction, TransactionKind};
use crate::stores::{CategoryStore, TransactionStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money value, tolerating a `$` sign and thousands separators.
///
/// Commas are only accepted between groups of three digits in the whole
/// part, so a decimal comma (`1,5`) is rejected rather than read as `15`.
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let s = s.strip_prefix('$').unwrap_or(s);
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };
    if whole.contains(',') {
        let mut groups = whole.split(',');
        let lead = groups.next().unwrap_or("");
        if lead.is_empty() || lead.len() > 3 || !groups.all(|g| g.len() == 3) {
            return None;
        }
    }
    let digits = whole.replace(',', "");
    let normalized = match frac {
        Some(frac) => format!("{sign}{digits}.{frac}"),
        None => format!("{sign}{digits}"),
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read the positional `title,type,value,category` rows of a CSV file.
///
/// The record on the first physical line is always treated as the header and
/// skipped. Blank lines are not records, so a header preceded by a blank line
/// is read as data. Rows with any of the four fields blank are dropped.
///
/// A complete row whose type is not `income`/`outcome` or whose value is not
/// a number fails the whole read with [`TallyError::InvalidKind`] or
/// [`TallyError::InvalidValue`].
pub fn read_rows(file_path: &Path) -> Result<Vec<CsvRow>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if line < 2 {
            continue;
        }
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
        let (title, kind, value, category) = (field(0), field(1), field(2), field(3));
        if title.is_empty() || kind.is_empty() || value.is_empty() || category.is_empty() {
            debug!(line = line, "dropping incomplete row");
            continue;
        }
        let kind = kind.parse::<TransactionKind>().map_err(|_| TallyError::InvalidKind {
            line,
            value: kind.to_string(),
        })?;
        let value = parse_value(value).ok_or_else(|| TallyError::InvalidValue {
            line,
            value: value.to_string(),
        })?;
        rows.push(CsvRow {
            title: title.to_string(),
            kind,
            value,
            category: category.to_string(),
        });
    }
    Ok(rows)
}

/// Category titles of `rows`, deduplicated in first-seen order.
pub fn unique_categories(rows: &[CsvRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.category.as_str()))
        .map(|row| row.category.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// ImportTransactionsService
// ---------------------------------------------------------------------------

/// Imports a CSV file of transactions, creating the categories it names.
pub struct ImportTransactionsService<C, T> {
    categories: C,
    transactions: T,
}

impl<C: CategoryStore, T: TransactionStore> ImportTransactionsService<C, T> {
    pub fn new(categories: C, transactions: T) -> Self {
        Self {
            categories,
            transactions,
        }
    }

    /// Import every complete row of `file_path`, delete the file and return
    /// the saved transactions.
    ///
    /// On error the file is left in place. Categories saved before the
    /// failure stay saved.
    pub fn execute(&self, file_path: &Path) -> Result<Vec<Transaction>> {
        info!(file = %file_path.display(), "importing transactions");

        // Every row is buffered before anything touches the stores.
        let rows = read_rows(file_path)?;
        let titles = unique_categories(&rows);

        let existing = self.categories.find_by_titles(&titles)?;
        let missing: Vec<String> = {
            let known: HashSet<&str> = existing.iter().map(|c| c.title.as_str()).collect();
            titles
                .into_iter()
                .filter(|title| !known.contains(title.as_str()))
                .collect()
        };
        let created = self.categories.save(&missing)?;
        if !created.is_empty() {
            info!(count = created.len(), "created categories");
        }

        // First match wins, existing before created.
        let mut working: HashMap<String, Category> = HashMap::new();
        for category in existing.into_iter().chain(created) {
            working.entry(category.title.clone()).or_insert(category);
        }
        let inputs = rows
            .into_iter()
            .map(|row| {
                let category = working
                    .get(&row.category)
                    .cloned()
                    .ok_or_else(|| TallyError::UnresolvedCategory(row.category.clone()))?;
                Ok(NewTransaction {
                    title: row.title,
                    kind: row.kind,
                    value: row.value,
                    category,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let saved = self.transactions.save(self.transactions.create(inputs))?;
        info!(count = saved.len(), "imported transactions");

        std::fs::remove_file(file_path)?;
        debug!(file = %file_path.display(), "removed import file");

        Ok(saved)
    }
}
