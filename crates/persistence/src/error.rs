// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use handisup::StoreError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// An update targeted an identifier that is not stored.
    UnknownId {
        /// Kind of entity.
        kind: &'static str,
        /// The identifier.
        id: i64,
    },
    /// Reference data declared the same key twice.
    DuplicateKey {
        /// Kind of entity.
        kind: &'static str,
        /// The repeated key.
        key: String,
    },
    /// Reference data points at an entity that does not exist.
    DanglingReference {
        /// The referring entity.
        from: String,
        /// The missing target.
        to: String,
    },
    /// Reference data violates a business rule.
    InvalidReferenceData(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Database error.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Migration failed.
    MigrationFailed(String),
    /// Query failed.
    QueryFailed(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId { kind, id } => write!(f, "{kind} {id} does not exist"),
            Self::DuplicateKey { kind, key } => {
                write!(f, "Duplicate {kind} '{key}' in reference data")
            }
            Self::DanglingReference { from, to } => {
                write!(f, "{from} refers to missing {to}")
            }
            Self::InvalidReferenceData(msg) => write!(f, "Invalid reference data: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::UnknownId { kind, id } => Self::UnknownId { kind, id },
            other => Self::Backend(other.to_string()),
        }
    }
}
