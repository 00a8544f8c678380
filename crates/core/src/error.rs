// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::store::StoreError;
use handisup_domain::DomainError;

/// Errors that can occur while running a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A referenced entity does not exist.
    NotFound {
        /// Kind of entity looked up.
        kind: &'static str,
        /// The identifier that was not found.
        id: String,
    },
    /// Several profiles could apply to a request and none was chosen.
    AmbiguousProfile {
        /// The request.
        demande_id: i64,
        /// Candidate profile ids.
        candidates: Vec<i64>,
    },
    /// No profile could be resolved for a request.
    MissingProfile {
        /// The request.
        demande_id: i64,
    },
    /// An external service needed by the operation is unreachable.
    ServiceUnavailable(String),
    /// The storage backend failed.
    Store(StoreError),
}

impl CoreError {
    /// Builds a `NotFound` error for a numerically identified entity.
    #[must_use]
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} '{id}' not found"),
            Self::AmbiguousProfile {
                demande_id,
                candidates,
            } => write!(
                f,
                "Request {demande_id} matches several profiles {candidates:?}; one must be chosen"
            ),
            Self::MissingProfile { demande_id } => {
                write!(f, "No beneficiary profile can be resolved for request {demande_id}")
            }
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {msg}"),
            Self::Store(err) => write!(f, "Storage error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
