use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur while building or parsing order-guard domain values
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid error kind: {0}")]
    InvalidErrorKind(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, CoreError>;
