// storefront-common/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::record_store::RecordId;

/// Errors raised by a [`RecordStore`](crate::record_store::RecordStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read table '{table}' from {path}")]
    Read {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write table '{table}' to {path}")]
    Write {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Table '{table}' does not contain valid JSON")]
    Malformed {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table '{0}' is not a JSON array of records")]
    NotATable(String),

    #[error("Record written to '{0}' has no integer Id")]
    MissingId(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Input that falls outside the domain the services accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Rating {rating} is outside 1-5{}", review_suffix(.review_id))]
    RatingOutOfRange {
        review_id: Option<RecordId>,
        rating: i64,
    },

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Quantity must be at least 1")]
    ZeroQuantity,
}

fn review_suffix(review_id: &Option<RecordId>) -> String {
    match review_id {
        Some(id) => format!(" (review {})", id),
        None => String::new(),
    }
}

/// Error type for the data-access services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed record in '{table}': {reason}")]
    MalformedRecord { table: String, reason: String },

    #[error("Store rejected write to '{table}': {message}")]
    Rejected { table: String, message: String },
}

impl ServiceError {
    pub fn malformed(table: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub fn rejected(table: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
