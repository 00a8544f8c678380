// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request workflow states and the transition graph.
//!
//! The graph is defined once here and consulted by the transition validator
//! before any write. The manager applying transitions never re-checks it.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workflow state of an accommodation request.
///
/// Identifiers are fixed reference data and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtatDemande {
    /// Draft, still being filled in by the applicant.
    EnCours,
    /// Submitted and received by the service.
    Receptionnee,
    /// Checked and compliant.
    Conforme,
    /// Checked and sent back to the applicant.
    NonConforme,
    /// Waiting for the committee.
    AttenteCommission,
    /// A beneficiary profile has been validated.
    ProfilValide,
    /// Refused. Terminal.
    Refusee,
    /// Validated. Terminal.
    Validee,
    /// Waiting for the applicant to accept the profile charters.
    AttenteValidationCharte,
    /// Waiting for the applicant to confirm the accompaniment.
    AttenteValidationAccompagnement,
}

impl EtatDemande {
    /// Every state, ordered by identifier.
    pub const ALL: [Self; 10] = [
        Self::EnCours,
        Self::Receptionnee,
        Self::Conforme,
        Self::NonConforme,
        Self::AttenteCommission,
        Self::ProfilValide,
        Self::Refusee,
        Self::Validee,
        Self::AttenteValidationCharte,
        Self::AttenteValidationAccompagnement,
    ];

    /// Reference-data identifier of this state.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::EnCours => 1,
            Self::Receptionnee => 2,
            Self::Conforme => 3,
            Self::NonConforme => 4,
            Self::AttenteCommission => 5,
            Self::ProfilValide => 6,
            Self::Refusee => 7,
            Self::Validee => 8,
            Self::AttenteValidationCharte => 9,
            Self::AttenteValidationAccompagnement => 10,
        }
    }

    /// Resolves a state from its reference-data identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownEtatDemande` if no state carries this id.
    pub fn from_id(id: u8) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|etat| etat.id() == id)
            .ok_or(DomainError::UnknownEtatDemande(id))
    }

    /// Returns the string representation used for serialization and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnCours => "EN_COURS",
            Self::Receptionnee => "RECEPTIONNEE",
            Self::Conforme => "CONFORME",
            Self::NonConforme => "NON_CONFORME",
            Self::AttenteCommission => "ATTENTE_COMMISSION",
            Self::ProfilValide => "PROFIL_VALIDE",
            Self::Refusee => "REFUSEE",
            Self::Validee => "VALIDEE",
            Self::AttenteValidationCharte => "ATTENTE_VALIDATION_CHARTE",
            Self::AttenteValidationAccompagnement => "ATTENTE_VALIDATION_ACCOMPAGNEMENT",
        }
    }

    /// Returns true for states that only loop onto themselves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Refusee | Self::Validee)
    }

    /// Returns true while the request is still being processed.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        !self.is_terminal()
    }

    /// Returns true when entering this state requires a complete questionnaire.
    #[must_use]
    pub const fn requires_complete_demande(self) -> bool {
        matches!(self, Self::Receptionnee | Self::Conforme)
    }

    /// States reachable from this one, including self-loops.
    ///
    /// ```text
    /// EN_COURS                          -> EN_COURS, RECEPTIONNEE, REFUSEE
    /// RECEPTIONNEE                      -> RECEPTIONNEE, CONFORME, NON_CONFORME
    /// CONFORME                          -> CONFORME, ATTENTE_COMMISSION, PROFIL_VALIDE, REFUSEE
    /// NON_CONFORME                      -> RECEPTIONNEE
    /// ATTENTE_COMMISSION                -> ATTENTE_COMMISSION, PROFIL_VALIDE, REFUSEE
    /// REFUSEE                           -> REFUSEE
    /// VALIDEE                           -> VALIDEE
    /// ATTENTE_VALIDATION_CHARTE         -> ATTENTE_VALIDATION_CHARTE, VALIDEE
    /// ATTENTE_VALIDATION_ACCOMPAGNEMENT -> VALIDEE, REFUSEE
    /// ```
    ///
    /// `PROFIL_VALIDE` has no outgoing edge: the follow-up state is chosen by
    /// the workflow itself once the beneficiary has been derived.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::EnCours => &[Self::EnCours, Self::Receptionnee, Self::Refusee],
            Self::Receptionnee => &[Self::Receptionnee, Self::Conforme, Self::NonConforme],
            Self::Conforme => &[
                Self::Conforme,
                Self::AttenteCommission,
                Self::ProfilValide,
                Self::Refusee,
            ],
            Self::NonConforme => &[Self::Receptionnee],
            Self::AttenteCommission => &[
                Self::AttenteCommission,
                Self::ProfilValide,
                Self::Refusee,
            ],
            Self::ProfilValide => &[],
            Self::Refusee => &[Self::Refusee],
            Self::Validee => &[Self::Validee],
            Self::AttenteValidationCharte => &[Self::AttenteValidationCharte, Self::Validee],
            Self::AttenteValidationAccompagnement => &[Self::Validee, Self::Refusee],
        }
    }

    /// Checks the transition graph, `from == None` standing for a request
    /// that does not exist yet.
    #[must_use]
    pub fn can_transition(from: Option<Self>, to: Self) -> bool {
        match from {
            None => to == Self::EnCours,
            Some(from) => from.successors().contains(&to),
        }
    }
}

impl FromStr for EtatDemande {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|etat| etat.as_str() == s)
            .ok_or_else(|| DomainError::InvalidEtatDemande(s.to_string()))
    }
}

impl std::fmt::Display for EtatDemande {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
