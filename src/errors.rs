// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the ledger, registries and statistics.
#[derive(Debug, Error)]
pub enum TabunganError {
    /// A transaction or record does not satisfy its shape contract.
    /// Raised before anything is written.
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),
    /// Only produced by quote sources; the gold oracle absorbs it.
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TabunganError>;

impl TabunganError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TabunganError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        TabunganError::NotFound { entity, id }
    }
}

impl From<reqwest::Error> for TabunganError {
    fn from(err: reqwest::Error) -> Self {
        TabunganError::ExternalService(err.to_string())
    }
}
