use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Invalid record '{id}': {details}")]
    InvalidRecord { id: String, details: String },

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid fiscal year end month {0}: must be between 1 and 12")]
    InvalidFiscalYearEndMonth(u32),

    #[error("Record '{id}' uses unknown category '{category}'")]
    UnknownCategory { id: String, category: String },

    #[error("A record with id '{0}' already exists")]
    DuplicateRecord(String),

    #[error("No record with id '{0}'")]
    RecordNotFound(String),

    #[error("Configuration error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SummaryError>;
