// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core error definitions for the schema qualifier.
//!
//! This module provides a centralized `QualifierError` enum and a `Result` type
//! used throughout the application to handle configuration, I/O, Oracle and
//! reporting errors. The rewriter itself never produces one of these: only the
//! code around it (loading scripts, talking to the database) can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Error types encountered while qualifying, verifying or auditing scripts.
#[derive(Error, Debug)]
pub enum QualifierError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cannot read {}: {reason}", path.display())]
    InputError { path: PathBuf, reason: String },

    #[error("Invalid schema name '{0}': expected an unquoted Oracle identifier")]
    InvalidSchema(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Oracle error: {0}")]
    OracleError(String),

    #[error("Connection pool error: {0}")]
    PoolError(String),

    #[error("Report generation failed: {0}")]
    ReportError(String),
}

impl From<oracle::Error> for QualifierError {
    fn from(e: oracle::Error) -> Self {
        QualifierError::OracleError(e.to_string())
    }
}

impl From<r2d2::Error> for QualifierError {
    fn from(e: r2d2::Error) -> Self {
        QualifierError::PoolError(e.to_string())
    }
}

impl From<serde_json::Error> for QualifierError {
    fn from(e: serde_json::Error) -> Self {
        QualifierError::ReportError(e.to_string())
    }
}

impl From<csv::Error> for QualifierError {
    fn from(e: csv::Error) -> Self {
        QualifierError::ReportError(e.to_string())
    }
}

/// A specialized Result type for the schema qualifier.
pub type Result<T> = std::result::Result<T, QualifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_mentions_path() {
        let err = QualifierError::InputError {
            path: PathBuf::from("sqls/nota.sql"),
            reason: "stream did not contain valid UTF-8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sqls/nota.sql"));
        assert!(msg.contains("UTF-8"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: QualifierError = io.into();
        assert!(matches!(err, QualifierError::IoError(_)));
    }
}
