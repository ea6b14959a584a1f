use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Duplicate key error: {0}")]
    DuplicateKey(#[from] DuplicateKeyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A source table does not match the canonical column schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("table '{table}' maps more than one column to '{column}'")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("table '{table}' row {row}: expected {expected} cells, found {found}")]
    RaggedRow {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// More than one record shares a key that must be unique.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("table '{table}' has more than one record for key {key}")]
pub struct DuplicateKeyError {
    pub table: String,
    pub key: String,
}

impl SchemaError {
    pub fn missing(table: &str, column: &str) -> Self {
        Self::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl DuplicateKeyError {
    pub fn new(table: &str, key: impl std::fmt::Display) -> Self {
        Self {
            table: table.to_string(),
            key: key.to_string(),
        }
    }
}
