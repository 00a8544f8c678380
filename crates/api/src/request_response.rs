// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use handisup_domain::{
    Beneficiaire, Demande, EtatDemande, Evenement, InterventionForfait, ModificationEtatDemande,
    PeriodeRh, Reponse, Role, Utilisateur,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, PrimitiveDateTime};

/// API request to answer one question of a campaign questionnaire.
///
/// The first answer of an applicant for a campaign creates the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReponseRequest {
    /// The campaign answered.
    pub campagne_id: i64,
    /// The answer.
    pub reponse: Reponse,
}

/// API response after an answer was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReponseResponse {
    /// The request the answer belongs to.
    pub demande_id: i64,
    /// Whether this answer created the request.
    pub created: bool,
    /// Whether every required question is now answered.
    pub complete: bool,
    /// The request state.
    pub etat: EtatDemande,
}

/// API request to move a request to another state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDemandeRequest {
    /// The request.
    pub demande_id: i64,
    /// The requested state.
    pub etat: EtatDemande,
    /// Staff comment attached to the change.
    #[serde(default)]
    pub commentaire: Option<String>,
    /// Profile assigned with the change.
    #[serde(default)]
    pub profil_id: Option<i64>,
}

/// API response after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDemandeResponse {
    /// The request.
    pub demande_id: i64,
    /// State before the change.
    pub etat_precedent: EtatDemande,
    /// State after the change and any follow-up.
    pub etat: EtatDemande,
    /// Grant derived when the profile was validated.
    pub beneficiaire_id: Option<i64>,
    /// Charters attached when the profile was validated.
    pub chartes_ajoutees: usize,
    /// A success message.
    pub message: String,
}

/// API request to accept a charter attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValiderCharteRequest {
    /// The request.
    pub demande_id: i64,
    /// The charter template accepted.
    pub charte_id: i64,
}

/// API request to create or update a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEvenementRequest {
    /// Event to update, `None` to create one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Event type.
    pub type_id: i64,
    /// Start.
    pub debut: PrimitiveDateTime,
    /// End.
    pub fin: PrimitiveDateTime,
    /// Preparation minutes.
    #[serde(default)]
    pub temps_preparation: u32,
    /// Extra minutes.
    #[serde(default)]
    pub temps_supplementaire: u32,
    /// Campus.
    #[serde(default)]
    pub campus_id: Option<i64>,
    /// Room.
    #[serde(default)]
    pub salle: Option<String>,
    /// Staff member delivering the event.
    #[serde(default)]
    pub intervenant: Option<String>,
    /// Beneficiaries.
    #[serde(default)]
    pub beneficiaires: BTreeSet<String>,
    /// Substitutes.
    #[serde(default)]
    pub suppleants: BTreeSet<String>,
    /// Teachers.
    #[serde(default)]
    pub enseignants: BTreeSet<String>,
    /// Equipment.
    #[serde(default)]
    pub equipements: BTreeSet<i64>,
    /// Whether the event is cancelled.
    #[serde(default)]
    pub annule: bool,
    /// Reinforcement validation flag.
    #[serde(default)]
    pub valide: Option<bool>,
}

/// API request to create or update a lump-sum intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInterventionForfaitRequest {
    /// Intervention to update, `None` to create one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Event type.
    pub type_id: i64,
    /// Staff member.
    pub intervenant: String,
    /// HR period the hours are declared in.
    pub periode_id: i64,
    /// Declared hours.
    pub heures: u32,
    /// Beneficiaries.
    #[serde(default)]
    pub beneficiaires: BTreeSet<String>,
}

/// API request to create or update an HR period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePeriodeRequest {
    /// Period to update, `None` to create one.
    #[serde(default)]
    pub id: Option<i64>,
    /// First day.
    pub debut: Date,
    /// Last day.
    pub fin: Date,
    /// Submission deadline.
    pub butoir: Date,
    /// Whether the period was sent to HR.
    #[serde(default)]
    pub envoyee: bool,
}

/// API response after an HR period was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePeriodeResponse {
    /// The stored period.
    pub periode: PeriodeRh,
    /// Events moved to another period.
    pub evenements_reattribues: usize,
}

/// API request to create or update a beneficiary grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveBeneficiaireRequest {
    /// Grant to update, `None` to create one.
    #[serde(default)]
    pub id: Option<i64>,
    /// The beneficiary.
    pub utilisateur: String,
    /// Assigned profile.
    pub profil_id: i64,
    /// Staff member in charge, the acting user when absent.
    #[serde(default)]
    pub gestionnaire: Option<String>,
    /// First day of validity.
    pub debut: Date,
    /// First day after validity.
    #[serde(default)]
    pub fin: Option<Date>,
    /// Whether a staff accompaniment is provided.
    #[serde(default)]
    pub avec_accompagnement: bool,
    /// Disability typologies.
    #[serde(default)]
    pub typologies: BTreeSet<i64>,
}

/// API request to set a user's anonymized number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNumeroAnonymeRequest {
    /// The user.
    pub uid: String,
    /// The number.
    pub numero: i64,
}

/// API request to promote a user to intervenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteIntervenantRequest {
    /// The user.
    pub uid: String,
}

/// Charter acceptance as shown to the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharteInfo {
    /// Charter template.
    pub charte_id: i64,
    /// Title at attachment time.
    pub libelle: String,
    /// Acceptance time.
    pub date_validation: Option<PrimitiveDateTime>,
}

/// A request as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandeInfo {
    /// Identifier.
    pub id: i64,
    /// Applicant.
    pub demandeur: String,
    /// Campaign.
    pub campagne_id: i64,
    /// Current state.
    pub etat: EtatDemande,
    /// Assigned profile.
    pub profil_attribue: Option<i64>,
    /// Staff comment.
    pub commentaire: Option<String>,
    /// Submission time.
    pub date_depot: Option<PrimitiveDateTime>,
    /// Whether every required question is answered.
    pub complete: bool,
    /// Answers.
    pub reponses: Vec<Reponse>,
    /// Charter acceptances.
    pub chartes: Vec<CharteInfo>,
}

impl DemandeInfo {
    /// Builds the API view of a stored request.
    #[must_use]
    pub fn from_demande(demande: Demande, complete: bool) -> Self {
        Self {
            id: demande.id.unwrap_or_default(),
            demandeur: demande.demandeur,
            campagne_id: demande.campagne_id,
            etat: demande.etat,
            profil_attribue: demande.profil_attribue,
            commentaire: demande.commentaire,
            date_depot: demande.date_depot,
            complete,
            reponses: demande.reponses,
            chartes: demande
                .chartes
                .into_iter()
                .map(|charte| CharteInfo {
                    charte_id: charte.charte_id,
                    libelle: charte.libelle,
                    date_validation: charte.date_validation,
                })
                .collect(),
        }
    }
}

/// API response with a request's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoriqueResponse {
    /// The request.
    pub demande_id: i64,
    /// Transitions, oldest first.
    pub modifications: Vec<ModificationEtatDemande>,
}

/// API response with in-progress request counts per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardDemandesResponse {
    /// Count per state.
    pub par_etat: BTreeMap<EtatDemande, usize>,
    /// Sum of every count.
    pub total: usize,
}

/// An event as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvenementInfo {
    /// Identifier.
    pub id: i64,
    /// Event type.
    pub type_id: i64,
    /// Start.
    pub debut: PrimitiveDateTime,
    /// End.
    pub fin: PrimitiveDateTime,
    /// Staff member delivering the event.
    pub intervenant: Option<String>,
    /// Beneficiaries.
    pub beneficiaires: BTreeSet<String>,
    /// HR period the event is attributed to.
    pub periode_id: Option<i64>,
    /// Cancellation time.
    pub date_annulation: Option<PrimitiveDateTime>,
    /// Reinforcement validation time.
    pub date_validation: Option<PrimitiveDateTime>,
}

impl From<Evenement> for EvenementInfo {
    fn from(evenement: Evenement) -> Self {
        Self {
            id: evenement.id.unwrap_or_default(),
            type_id: evenement.type_id,
            debut: evenement.debut,
            fin: evenement.fin,
            intervenant: evenement.intervenant,
            beneficiaires: evenement.beneficiaires,
            periode_id: evenement.periode_id,
            date_annulation: evenement.date_annulation,
            date_validation: evenement.date_validation,
        }
    }
}

/// A lump-sum intervention as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionForfaitInfo {
    /// Identifier.
    pub id: i64,
    /// HR period.
    pub periode_id: i64,
    /// Staff member.
    pub intervenant: String,
    /// Declared hours.
    pub heures: u32,
}

impl From<InterventionForfait> for InterventionForfaitInfo {
    fn from(intervention: InterventionForfait) -> Self {
        Self {
            id: intervention.id.unwrap_or_default(),
            periode_id: intervention.periode_id,
            intervenant: intervention.intervenant,
            heures: intervention.heures,
        }
    }
}

/// A beneficiary grant as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaireInfo {
    /// Identifier.
    pub id: i64,
    /// The beneficiary.
    pub utilisateur: String,
    /// Assigned profile.
    pub profil_id: i64,
    /// Staff member in charge.
    pub gestionnaire: String,
    /// First day of validity.
    pub debut: Date,
    /// First day after validity.
    pub fin: Option<Date>,
    /// Whether a staff accompaniment is provided.
    pub avec_accompagnement: bool,
    /// Disability typologies.
    pub typologies: BTreeSet<i64>,
}

impl From<Beneficiaire> for BeneficiaireInfo {
    fn from(beneficiaire: Beneficiaire) -> Self {
        Self {
            id: beneficiaire.id.unwrap_or_default(),
            utilisateur: beneficiaire.utilisateur,
            profil_id: beneficiaire.profil_id,
            gestionnaire: beneficiaire.gestionnaire,
            debut: beneficiaire.debut,
            fin: beneficiaire.fin,
            avec_accompagnement: beneficiaire.avec_accompagnement,
            typologies: beneficiaire.typologies,
        }
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilisateurInfo {
    /// Handle.
    pub uid: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Institutional e-mail.
    pub email: String,
    /// Roles.
    pub roles: BTreeSet<Role>,
    /// Anonymized number.
    pub numero_anonyme: Option<i64>,
}

impl From<Utilisateur> for UtilisateurInfo {
    fn from(utilisateur: Utilisateur) -> Self {
        Self {
            uid: utilisateur.uid,
            nom: utilisateur.nom,
            prenom: utilisateur.prenom,
            email: utilisateur.email,
            roles: utilisateur.roles,
            numero_anonyme: utilisateur.numero_anonyme,
        }
    }
}

/// API response for a user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    /// Matches, local users first.
    pub utilisateurs: Vec<UtilisateurInfo>,
}
