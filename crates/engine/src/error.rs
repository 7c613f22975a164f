//! The module contains the errors the engine can throw.
//!
//! Aggregation never fails; errors come from validating user input
//! ([`InvalidPeriod`], [`InvalidAmount`], [`InvalidEntry`]), from looking up
//! entries that do not exist ([`KeyNotFound`]) and from the storage
//! collaborators.
//!
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidEntry`]: EngineError::InvalidEntry
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid period: \"{0}\"")]
    InvalidPeriod(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("a persistence provider is required")]
    MissingProvider,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidEntry(a), Self::InvalidEntry(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::MissingProvider, Self::MissingProvider) => true,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
