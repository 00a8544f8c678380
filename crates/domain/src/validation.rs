// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Business-rule checks run before a request, event or period is written.
//!
//! Every validator is pure: it receives the candidate and the existing rows
//! it must be compared against, and never mutates anything. Validators are
//! independent and can be composed in any order.

use crate::beneficiaire::Beneficiaire;
use crate::demande::Demande;
use crate::error::{DomainError, OverlapSubject};
use crate::etat_demande::EtatDemande;
use crate::evenement::{Evenement, TypeEvenement};
use crate::periode::PeriodeRh;
use crate::types::Utilisateur;
use time::Date;

/// Validates a request state change.
///
/// The transition must be an edge of the state graph, and entering
/// `RECEPTIONNEE` or `CONFORME` additionally requires a complete request.
/// Completeness is computed by the caller.
///
/// # Arguments
///
/// * `from` - The current state, `None` for a request being created
/// * `to` - The requested state
/// * `complete` - Whether every required question has been answered
///
/// # Errors
///
/// Returns an error if:
/// - The transition is not an edge of the graph
/// - The target state requires a complete request and `complete` is false
pub fn validate_demande_transition(
    from: Option<EtatDemande>,
    to: EtatDemande,
    complete: bool,
) -> Result<(), DomainError> {
    // Rule: only edges of the graph are allowed
    if !EtatDemande::can_transition(from, to) {
        return Err(DomainError::InvalidTransition { from, to });
    }

    // Rule: a request is checked only once fully answered
    if to.requires_complete_demande() && !complete {
        return Err(DomainError::DemandeIncomplete { to });
    }

    Ok(())
}

/// Validates that an event does not end before it starts.
///
/// # Errors
///
/// Returns `DomainError::InvalidEvenementWindow` if `fin < debut`.
pub fn validate_evenement_window(evenement: &Evenement) -> Result<(), DomainError> {
    if evenement.fin < evenement.debut {
        return Err(DomainError::InvalidEvenementWindow {
            debut: evenement.debut,
            fin: evenement.fin,
        });
    }
    Ok(())
}

/// Validates that nobody involved in an event is double-booked.
///
/// The candidate window is padded by its preparation time before the start
/// and its extra time after the end. An existing event of the same person
/// conflicts when `padded_start < existing.fin && existing.debut < padded_end`:
/// touching boundaries do not conflict. Cancelled events on either side are
/// ignored, as is the candidate's own stored version.
///
/// # Arguments
///
/// * `evenement` - The event being written
/// * `existing` - Stored events that may involve the same people
///
/// # Errors
///
/// Returns `DomainError::EvenementOverlap` naming the first person found
/// double-booked, intervenant first.
pub fn validate_evenement_no_overlap(
    evenement: &Evenement,
    existing: &[Evenement],
) -> Result<(), DomainError> {
    if evenement.is_annule() {
        return Ok(());
    }

    let debut = evenement.debut_avec_preparation();
    let fin = evenement.fin_avec_supplement();

    let subjects = evenement
        .intervenant
        .iter()
        .cloned()
        .map(OverlapSubject::Intervenant)
        .chain(
            evenement
                .beneficiaires
                .iter()
                .cloned()
                .map(OverlapSubject::Beneficiaire),
        );

    for subject in subjects {
        let conflict = existing.iter().find(|other| {
            other.id.is_some()
                && other.id != evenement.id
                && !other.is_annule()
                && other.concerne(subject.uid())
                && debut < other.fin
                && other.debut < fin
        });

        if let Some(Evenement {
            id: Some(conflicting_id),
            ..
        }) = conflict
        {
            return Err(DomainError::EvenementOverlap {
                subject,
                conflicting_id: *conflicting_id,
            });
        }
    }

    Ok(())
}

/// Validates that an HR period does not overlap any other period.
///
/// # Errors
///
/// Returns `DomainError::PeriodeOverlap` with the first overlapping period.
pub fn validate_periode_no_overlap(
    periode: &PeriodeRh,
    existing: &[PeriodeRh],
) -> Result<(), DomainError> {
    periode.validate()?;

    match existing
        .iter()
        .filter(|other| other.id.is_none() || other.id != periode.id)
        .find(|other| periode.overlaps(other))
    {
        Some(conflict) => Err(DomainError::PeriodeOverlap {
            conflicting_id: conflict.id,
        }),
        None => Ok(()),
    }
}

/// What an entry is attributed to when checking period locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodeCible {
    /// A dated event, attributed to the period containing the day.
    Date(Date),
    /// A lump-sum intervention, attributed to its own period.
    Periode(i64),
}

/// Validates that entries may still be submitted for the targeted period.
///
/// A period is locked once its deadline is strictly before `today`, days
/// only. A date outside every period is locked if a later period exists,
/// since it then falls into the past. Admins bypass the check entirely.
///
/// # Arguments
///
/// * `cible` - The date or period the entry is attributed to
/// * `periodes` - Every HR period
/// * `today` - The current day
/// * `is_admin` - Whether the acting user is an administrator
///
/// # Errors
///
/// Returns `DomainError::PeriodeLocked` if the entry targets a locked period.
pub fn validate_periode_not_locked(
    cible: PeriodeCible,
    periodes: &[PeriodeRh],
    today: Date,
    is_admin: bool,
) -> Result<(), DomainError> {
    if is_admin {
        return Ok(());
    }

    let periode: Option<&PeriodeRh> = match cible {
        PeriodeCible::Date(date) => periodes.iter().find(|p| p.contains(date)),
        PeriodeCible::Periode(id) => periodes.iter().find(|p| p.id == Some(id)),
    };

    match (periode, cible) {
        (Some(periode), _) if periode.is_locked(today) => Err(DomainError::PeriodeLocked {
            butoir: Some(periode.butoir),
        }),
        (Some(_), _) | (None, PeriodeCible::Periode(_)) => Ok(()),
        (None, PeriodeCible::Date(date)) => {
            if periodes.iter().any(|p| p.debut > date) {
                Err(DomainError::PeriodeLocked { butoir: None })
            } else {
                Ok(())
            }
        }
    }
}

/// Validates that an event has beneficiaries unless its type allows none.
///
/// Lump-sum and reinforcement events may have no beneficiary.
///
/// # Errors
///
/// Returns `DomainError::BeneficiaireRequired` otherwise.
pub fn validate_beneficiaires_present(
    evenement: &Evenement,
    type_evenement: &TypeEvenement,
) -> Result<(), DomainError> {
    if evenement.beneficiaires.is_empty()
        && !type_evenement.forfait
        && !type_evenement.is_renfort()
    {
        return Err(DomainError::BeneficiaireRequired);
    }
    Ok(())
}

/// Validates that every listed user holds a beneficiary grant on a date.
///
/// # Arguments
///
/// * `uids` - The users to check
/// * `date` - The observed date
/// * `beneficiaires` - Grants of those users
///
/// # Errors
///
/// Returns `DomainError::BeneficiaireWithoutValidProfile` for the first user
/// with no grant covering the date.
pub fn validate_beneficiaires_profil<'a>(
    uids: impl IntoIterator<Item = &'a str>,
    date: Date,
    beneficiaires: &[Beneficiaire],
) -> Result<(), DomainError> {
    for uid in uids {
        let covered: bool = beneficiaires
            .iter()
            .any(|b| b.utilisateur == uid && b.is_active_on(date));
        if !covered {
            return Err(DomainError::BeneficiaireWithoutValidProfile {
                uid: uid.to_string(),
                date,
            });
        }
    }
    Ok(())
}

/// Validates that an applicant has a single active request per campaign.
///
/// Refused requests are not active. The request being edited is excluded.
///
/// # Arguments
///
/// * `demandeur` - The applicant
/// * `campagne_id` - The campaign
/// * `editing` - Id of the request being edited, if any
/// * `existing` - Stored requests
///
/// # Errors
///
/// Returns `DomainError::DuplicateDemande` if another active request exists.
pub fn validate_demande_unique(
    demandeur: &str,
    campagne_id: i64,
    editing: Option<i64>,
    existing: &[Demande],
) -> Result<(), DomainError> {
    let duplicate: bool = existing.iter().any(|demande| {
        demande.demandeur == demandeur
            && demande.campagne_id == campagne_id
            && demande.etat != EtatDemande::Refusee
            && (editing.is_none() || demande.id != editing)
    });

    if duplicate {
        return Err(DomainError::DuplicateDemande {
            demandeur: demandeur.to_string(),
            campagne_id,
        });
    }
    Ok(())
}

/// Validates that no other user holds the same anonymized number.
///
/// # Errors
///
/// Returns `DomainError::DuplicateNumeroAnonyme` naming the current holder.
pub fn validate_numero_anonyme_unique(
    uid: &str,
    numero: i64,
    utilisateurs: &[Utilisateur],
) -> Result<(), DomainError> {
    match utilisateurs
        .iter()
        .find(|u| u.uid != uid && u.numero_anonyme == Some(numero))
    {
        Some(holder) => Err(DomainError::DuplicateNumeroAnonyme {
            numero,
            detenteur: holder.uid.clone(),
        }),
        None => Ok(()),
    }
}
