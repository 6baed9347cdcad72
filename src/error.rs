// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger core.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures a ledger operation can report to its caller.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction {id} not found or already deleted")]
    NotFound { id: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not determine platform-specific data dir")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
