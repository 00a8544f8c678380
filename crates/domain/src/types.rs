// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::questionnaire::Etape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::{Date, PrimitiveDateTime};

/// Application roles carried by a user.
///
/// Roles are fixed domain constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative authority, bypasses period locks.
    Admin,
    /// Staff member managing beneficiaries and requests.
    Gestionnaire,
    /// Staff member planning events.
    Planificateur,
    /// Person delivering support events.
    Intervenant,
    /// Backup staff with its own validation workflow.
    Renfort,
    /// Holder of an active beneficiary grant.
    Beneficiaire,
    /// Student who submitted a request.
    Demandeur,
}

impl Role {
    /// Returns the string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Gestionnaire => "gestionnaire",
            Self::Planificateur => "planificateur",
            Self::Intervenant => "intervenant",
            Self::Renfort => "renfort",
            Self::Beneficiaire => "beneficiaire",
            Self::Demandeur => "demandeur",
        }
    }

    /// Returns true for roles held by service staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Gestionnaire | Self::Planificateur)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A local user record, bootstrapped from the directory on first sight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilisateur {
    /// Directory handle, unique.
    pub uid: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Institutional e-mail.
    pub email: String,
    /// Personal e-mail supplied by the applicant.
    #[serde(default)]
    pub email_perso: Option<String>,
    /// Personal phone supplied by the applicant.
    #[serde(default)]
    pub tel_perso: Option<String>,
    /// Emergency contact supplied by the applicant.
    #[serde(default)]
    pub contact_urgence: Option<String>,
    /// Anonymized identifier used in committee documents.
    #[serde(default)]
    pub numero_anonyme: Option<i64>,
    /// Roles granted locally.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    /// Enrollment data cached from the enrollment backend.
    #[serde(default)]
    pub inscriptions: Vec<Inscription>,
    /// Last successful enrollment refresh.
    #[serde(default)]
    pub inscriptions_maj: Option<PrimitiveDateTime>,
}

impl Utilisateur {
    /// Creates a user with no optional contact data and no roles.
    #[must_use]
    pub fn new(uid: &str, nom: &str, prenom: &str, email: &str) -> Self {
        Self {
            uid: uid.to_string(),
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            email: email.to_string(),
            email_perso: None,
            tel_perso: None,
            contact_urgence: None,
            numero_anonyme: None,
            roles: BTreeSet::new(),
            inscriptions: Vec::new(),
            inscriptions_maj: None,
        }
    }

    /// Returns true if the user holds the role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// One enrollment line returned by the enrollment backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inscription {
    /// Faculty or department code.
    pub composante: String,
    /// Degree programme.
    pub formation: String,
    /// Enrollment start.
    pub debut: Date,
    /// Enrollment end.
    pub fin: Option<Date>,
    /// Scholarship holder.
    pub boursier: bool,
    /// Student status label.
    pub statut: String,
}

/// The kind of request a campaign collects, with its questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDemande {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Whether the applicant may decline accompaniment.
    #[serde(default)]
    pub accompagnement_optionnel: bool,
    /// Beneficiary profiles a request of this type may lead to.
    #[serde(default)]
    pub profils: Vec<i64>,
    /// Ordered questionnaire steps.
    #[serde(default)]
    pub etapes: Vec<Etape>,
}

/// A time-boxed intake of a request type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campagne {
    /// Identifier.
    pub id: i64,
    /// The request type collected.
    pub type_demande_id: i64,
    /// Display label.
    pub libelle: String,
    /// Opening date.
    pub debut: Date,
    /// Closing date.
    pub fin: Date,
    /// Academic year targeted by the granted accommodations.
    #[serde(default)]
    pub annee_cible: Option<i32>,
}

/// A category describing the kind of accommodation needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilBeneficiaire {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Whether the profile expects disability typologies.
    #[serde(default)]
    pub avec_typologie: bool,
    /// Charters the beneficiary must accept.
    #[serde(default)]
    pub chartes: Vec<i64>,
}

impl ProfilBeneficiaire {
    /// Reference-data id of the placeholder profile used while the real
    /// profile has not been decided.
    pub const A_DETERMINER: i64 = 1;
}

/// A charter template.
///
/// Requests keep a copy of the text at attachment time, so later edits of the
/// template do not alter what an applicant agreed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charte {
    /// Identifier.
    pub id: i64,
    /// Title.
    pub libelle: String,
    /// Full text.
    pub contenu: String,
}
