use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Invalid closing day {0}: must be between 1 and 31")]
    InvalidClosingDay(u32),

    #[error("Invalid installment count {0}: must be at least 1")]
    InvalidInstallmentCount(u32),

    #[error("Invalid projection window: end {end} is before start {start}")]
    InvalidWindow { start: String, end: String },

    #[error("Validation failed for obligation '{obligation}': {details}")]
    ValidationError { obligation: String, details: String },

    #[error("Storage error for owner '{owner}': {details}")]
    Storage { owner: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
