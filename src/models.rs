use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Outcome,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "outcome" => Ok(Self::Outcome),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// `None` until the record has been saved.
    pub id: Option<i64>,
    pub title: String,
    pub kind: TransactionKind,
    pub value: f64,
    pub category: Category,
    pub created_at: String,
}

/// Input for [`TransactionStore::create`](crate::stores::TransactionStore::create).
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub title: String,
    pub kind: TransactionKind,
    pub value: f64,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Balance {
    pub income: f64,
    pub outcome: f64,
    pub total: f64,
}

/// One CSV record that survived the presence check, before DB insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub title: String,
    pub kind: TransactionKind,
    pub value: f64,
    pub category: String,
}
