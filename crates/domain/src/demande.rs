// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::etat_demande::EtatDemande;
use crate::questionnaire::Reponse;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// An accommodation request submitted by a student for a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demande {
    /// Identifier, `None` until persisted.
    pub id: Option<i64>,
    /// The applicant's user identifier.
    pub demandeur: String,
    /// The campaign the request belongs to.
    pub campagne_id: i64,
    /// Current workflow state.
    pub etat: EtatDemande,
    /// Profile assigned by staff.
    pub profil_attribue: Option<i64>,
    /// Free-text staff comment.
    pub commentaire: Option<String>,
    /// Submission date, stamped when the request is received.
    pub date_depot: Option<PrimitiveDateTime>,
    /// Answers, one per question.
    pub reponses: Vec<Reponse>,
    /// Charter snapshots attached from the assigned profile.
    pub chartes: Vec<CharteDemandeur>,
}

impl Demande {
    /// Creates a draft request with no answers.
    #[must_use]
    pub fn new(demandeur: &str, campagne_id: i64) -> Self {
        Self {
            id: None,
            demandeur: demandeur.to_string(),
            campagne_id,
            etat: EtatDemande::EnCours,
            profil_attribue: None,
            commentaire: None,
            date_depot: None,
            reponses: Vec::new(),
            chartes: Vec::new(),
        }
    }

    /// Returns the answer to a question, if any.
    #[must_use]
    pub fn reponse(&self, question_id: i64) -> Option<&Reponse> {
        self.reponses.iter().find(|r| r.question_id == question_id)
    }

    /// Replaces the answer to the same question, or appends it.
    pub fn upsert_reponse(&mut self, reponse: Reponse) {
        match self
            .reponses
            .iter_mut()
            .find(|existing| existing.question_id == reponse.question_id)
        {
            Some(existing) => *existing = reponse,
            None => self.reponses.push(reponse),
        }
    }

    /// Returns true once every attached charter has been accepted.
    #[must_use]
    pub fn chartes_validees(&self) -> bool {
        self.chartes.iter().all(|c| c.date_validation.is_some())
    }

    /// Returns true while answers may still be edited by the applicant.
    #[must_use]
    pub const fn reponses_modifiables(&self) -> bool {
        matches!(self.etat, EtatDemande::EnCours | EtatDemande::NonConforme)
    }
}

/// A charter as it read when attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharteDemandeur {
    /// The template it was copied from.
    pub charte_id: i64,
    /// Title at attachment time.
    pub libelle: String,
    /// Text at attachment time.
    pub contenu: String,
    /// Acceptance date.
    pub date_validation: Option<PrimitiveDateTime>,
}

/// Append-only record of an accepted state change.
///
/// Exactly one record is produced per transition that actually changes the
/// state. Records are never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEtatDemande {
    /// The request.
    pub demande_id: i64,
    /// State before the transition.
    pub etat_precedent: EtatDemande,
    /// State after the transition.
    pub etat: EtatDemande,
    /// Acting user, `None` for system-driven changes.
    pub modifie_par: Option<String>,
    /// Profile assigned with the transition.
    pub profil_id: Option<i64>,
    /// Comment given with the transition.
    pub commentaire: Option<String>,
    /// When the transition was applied.
    pub date: PrimitiveDateTime,
}
