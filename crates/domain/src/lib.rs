// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod beneficiaire;
mod demande;
mod error;
mod etat_demande;
mod evenement;
mod periode;
mod questionnaire;
mod reconcile;
mod tableau_de_bord;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use beneficiaire::{Beneficiaire, PieceJointeBeneficiaire};
pub use demande::{CharteDemandeur, Demande, ModificationEtatDemande};
pub use error::{DomainError, OverlapSubject};
pub use etat_demande::EtatDemande;
pub use evenement::{Evenement, InterventionForfait, Tracabilite, TypeEvenement};
pub use periode::{AnneeUniversitaire, PeriodeRh};
pub use questionnaire::{
    ChampCible, Etape, Fichier, OPTION_ACCOMPAGNEMENT_NON_ID, OptionReponse,
    QUESTION_ACCOMPAGNEMENT_ID, Question, Reponse, TableLiee, is_complete,
};
pub use reconcile::{SetDelta, reconcile};
pub use tableau_de_bord::{
    FenetresNonAffectes, TableauDeBordEvenements, count_demandes_by_etat,
    tableau_de_bord_evenements,
};
pub use types::{
    Campagne, Charte, Inscription, ProfilBeneficiaire, Role, TypeDemande, Utilisateur,
};
pub use validation::{
    PeriodeCible, validate_beneficiaires_present, validate_beneficiaires_profil,
    validate_demande_transition, validate_demande_unique, validate_evenement_no_overlap,
    validate_evenement_window, validate_numero_anonyme_unique, validate_periode_no_overlap,
    validate_periode_not_locked,
};
