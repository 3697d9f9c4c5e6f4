use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid transaction type on line {line}: {value} (expected income or outcome)")]
    InvalidKind { line: u64, value: String },

    #[error("Invalid value on line {line}: {value}")]
    InvalidValue { line: u64, value: String },

    #[error("Category could not be resolved: {0}")]
    UnresolvedCategory(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
