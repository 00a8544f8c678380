// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use handisup::{CoreError, StoreError};
use handisup_domain::DomainError;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Reference data cannot support the operation, e.g. a request type
    /// offering several profiles when none was chosen.
    InconsistentReferenceData {
        /// A human-readable description of the gap.
        message: String,
    },
    /// An external service the operation depends on is unreachable.
    ServiceUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InconsistentReferenceData { message } => {
                write!(f, "Inconsistent reference data: {message}")
            }
            Self::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
        }
    }
}

fn rule_violation(err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: err.rule().to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTransition { .. }
        | DomainError::DemandeIncomplete { .. }
        | DomainError::EvenementOverlap { .. }
        | DomainError::PeriodeOverlap { .. }
        | DomainError::PeriodeLocked { .. }
        | DomainError::BeneficiaireRequired
        | DomainError::BeneficiaireWithoutValidProfile { .. }
        | DomainError::DuplicateDemande { .. }
        | DomainError::DuplicateNumeroAnonyme { .. }
        | DomainError::DemandeVerrouillee { .. } => rule_violation(&err),
        DomainError::UnknownEtatDemande(id) => ApiError::InvalidInput {
            field: String::from("etat"),
            message: format!("Unknown request state id {id}"),
        },
        DomainError::InvalidEtatDemande(label) => ApiError::InvalidInput {
            field: String::from("etat"),
            message: format!("Unknown request state '{label}'"),
        },
        DomainError::InvalidEvenementWindow { debut, fin } => ApiError::InvalidInput {
            field: String::from("fin"),
            message: format!("Event ends ({fin}) before it starts ({debut})"),
        },
        DomainError::InvalidPeriode { reason } => ApiError::InvalidInput {
            field: String::from("periode"),
            message: reason,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::NotFound { kind, id } => ApiError::ResourceNotFound {
            resource_type: kind.to_string(),
            message: format!("{kind} '{id}' does not exist"),
        },
        CoreError::AmbiguousProfile { .. } | CoreError::MissingProfile { .. } => {
            ApiError::InconsistentReferenceData {
                message: err.to_string(),
            }
        }
        CoreError::ServiceUnavailable(msg) => ApiError::ServiceUnavailable { message: msg },
        CoreError::Store(StoreError::UnknownId { kind, id }) => ApiError::ResourceNotFound {
            resource_type: kind.to_string(),
            message: format!("{kind} {id} does not exist"),
        },
        CoreError::Store(store_err) => ApiError::Internal {
            message: format!("Storage failure: {store_err}"),
        },
    }
}
