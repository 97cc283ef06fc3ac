use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure classes. Every one of them is fatal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input file unreadable or a row could not be parsed.
    Io,
    /// A derived value (calendar date) is invalid.
    Validation,
    /// The warehouse rejected a batch; the batch was rolled back.
    BatchInsert,
    /// Column-set mismatch or bad settings.
    Configuration,
    /// Warehouse access outside of a batch insert (schema, reads).
    Database,
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path} is missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Cannot parse column {column} at line {line}: {value:?}")]
    Parse {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Batch {batch_index} into {table} rolled back: {source}")]
    BatchInsert {
        table: &'static str,
        batch_index: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtlError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            EtlError::Io { .. } | EtlError::Csv(_) | EtlError::Parse { .. } => FailureKind::Io,
            EtlError::InvalidDate { .. } => FailureKind::Validation,
            EtlError::BatchInsert { .. } => FailureKind::BatchInsert,
            EtlError::MissingColumns { .. } | EtlError::Config(_) => FailureKind::Configuration,
            EtlError::Database(_) => FailureKind::Database,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
