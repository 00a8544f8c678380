// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::etat_demande::EtatDemande;
use time::{Date, PrimitiveDateTime};

/// Identifies the person whose schedule collides with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlapSubject {
    /// The staff member delivering the event.
    Intervenant(String),
    /// One of the beneficiaries attending the event.
    Beneficiaire(String),
}

impl OverlapSubject {
    /// The user identifier of the conflicting person.
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            Self::Intervenant(uid) | Self::Beneficiaire(uid) => uid,
        }
    }
}

impl std::fmt::Display for OverlapSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intervenant(uid) => write!(f, "intervenant '{uid}'"),
            Self::Beneficiaire(uid) => write!(f, "beneficiaire '{uid}'"),
        }
    }
}

/// Business-rule violations raised before a mutation is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The requested state is not reachable from the current one.
    InvalidTransition {
        /// The current state, `None` for a request that does not exist yet.
        from: Option<EtatDemande>,
        /// The requested state.
        to: EtatDemande,
    },
    /// The requested state needs every required question to be answered.
    DemandeIncomplete {
        /// The requested state.
        to: EtatDemande,
    },
    /// A state identifier does not match any known state.
    UnknownEtatDemande(u8),
    /// A state label does not match any known state.
    InvalidEtatDemande(String),
    /// The padded window of an event collides with another event.
    EvenementOverlap {
        /// Who is double-booked.
        subject: OverlapSubject,
        /// The colliding event.
        conflicting_id: i64,
    },
    /// An event ends before it starts.
    InvalidEvenementWindow {
        /// Event start.
        debut: PrimitiveDateTime,
        /// Event end.
        fin: PrimitiveDateTime,
    },
    /// Two HR periods share days.
    PeriodeOverlap {
        /// The colliding period, `None` when it has not been stored yet.
        conflicting_id: Option<i64>,
    },
    /// An HR period has an inverted window or a deadline before its start.
    InvalidPeriode {
        /// Description of the inconsistency.
        reason: String,
    },
    /// The HR period the event belongs to is closed for submissions.
    PeriodeLocked {
        /// Deadline of the locked period, `None` when the date falls before
        /// any existing period.
        butoir: Option<Date>,
    },
    /// Only lump-sum and reinforcement events may have no beneficiary.
    BeneficiaireRequired,
    /// A beneficiary has no profile covering the observed date.
    BeneficiaireWithoutValidProfile {
        /// The beneficiary's user identifier.
        uid: String,
        /// The date that must be covered.
        date: Date,
    },
    /// The applicant already has an active request for the campaign.
    DuplicateDemande {
        /// The applicant.
        demandeur: String,
        /// The campaign.
        campagne_id: i64,
    },
    /// Another user already holds the anonymized number.
    DuplicateNumeroAnonyme {
        /// The number in conflict.
        numero: i64,
        /// The user holding it.
        detenteur: String,
    },
    /// Answers may only change while the applicant still owns the request.
    DemandeVerrouillee {
        /// The current state.
        etat: EtatDemande,
    },
}

impl DomainError {
    /// Returns the name of the rule this error reports.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "demande_transition",
            Self::DemandeIncomplete { .. } => "demande_complete",
            Self::UnknownEtatDemande(_) | Self::InvalidEtatDemande(_) => "etat_demande",
            Self::EvenementOverlap { .. } => "evenement_chevauchement",
            Self::InvalidEvenementWindow { .. } => "evenement_horaires",
            Self::PeriodeOverlap { .. } => "periode_chevauchement",
            Self::InvalidPeriode { .. } => "periode_invalide",
            Self::PeriodeLocked { .. } => "periode_verrouillee",
            Self::BeneficiaireRequired => "beneficiaire_requis",
            Self::BeneficiaireWithoutValidProfile { .. } => "profil_beneficiaire_valide",
            Self::DuplicateDemande { .. } => "demande_unique_campagne",
            Self::DuplicateNumeroAnonyme { .. } => "numero_anonyme_unique",
            Self::DemandeVerrouillee { .. } => "demande_modifiable",
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from: Some(from), to } => {
                write!(f, "Transition from '{from}' to '{to}' is not allowed")
            }
            Self::InvalidTransition { from: None, to } => {
                write!(f, "A new request cannot start in state '{to}'")
            }
            Self::DemandeIncomplete { to } => {
                write!(
                    f,
                    "Request cannot move to '{to}': some required questions are unanswered"
                )
            }
            Self::UnknownEtatDemande(id) => write!(f, "Unknown request state id {id}"),
            Self::InvalidEtatDemande(label) => write!(f, "Unknown request state '{label}'"),
            Self::EvenementOverlap {
                subject,
                conflicting_id,
            } => {
                write!(
                    f,
                    "The {subject} is already booked on event {conflicting_id} during this slot"
                )
            }
            Self::InvalidEvenementWindow { debut, fin } => {
                write!(f, "Event ends ({fin}) before it starts ({debut})")
            }
            Self::PeriodeOverlap {
                conflicting_id: Some(conflicting_id),
            } => {
                write!(f, "HR period overlaps existing period {conflicting_id}")
            }
            Self::PeriodeOverlap {
                conflicting_id: None,
            } => write!(f, "HR period overlaps another period of the same batch"),
            Self::InvalidPeriode { reason } => write!(f, "Invalid HR period: {reason}"),
            Self::PeriodeLocked { butoir: Some(butoir) } => {
                write!(f, "HR period is locked since its deadline {butoir}")
            }
            Self::PeriodeLocked { butoir: None } => {
                write!(f, "Date falls before the first open HR period")
            }
            Self::BeneficiaireRequired => {
                write!(f, "At least one beneficiary is required for this event type")
            }
            Self::BeneficiaireWithoutValidProfile { uid, date } => {
                write!(f, "Beneficiary '{uid}' has no valid profile on {date}")
            }
            Self::DuplicateDemande {
                demandeur,
                campagne_id,
            } => {
                write!(
                    f,
                    "Applicant '{demandeur}' already has an active request for campaign {campagne_id}"
                )
            }
            Self::DuplicateNumeroAnonyme { numero, detenteur } => {
                write!(
                    f,
                    "Anonymous number {numero} is already held by user '{detenteur}'"
                )
            }
            Self::DemandeVerrouillee { etat } => {
                write!(f, "Answers cannot be changed while the request is '{etat}'")
            }
        }
    }
}

impl std::error::Error for DomainError {}
