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

//! The accommodation workflow core.
//!
//! Operations receive their storage, bus, configuration, clock and acting
//! user explicitly. Validators from `handisup_domain` are the gate; the
//! managers here are unconditional executors of what passed the gate.

mod beneficiaire;
mod config;
mod demande;
mod error;
mod evenement;
mod identity;
mod periode;
mod store;

#[cfg(test)]
mod tests;

pub use beneficiaire::{
    BeneficiaireSaisie, creer_beneficiaire_pour_demande, maj_beneficiaires, resoudre_profil,
};
pub use config::{Context, WorkflowConfig};
pub use demande::{
    ajouter_chartes, charger_demande, creer_demande, demande_active, demande_avec_accompagnement,
    enregistrer_reponse, historique, modifier_demande, tableau_de_bord_demandes,
    type_demande_de, typologies_handicap, valider_charte,
};
pub use error::CoreError;
pub use evenement::{
    EvenementSaisie, maj_evenement, maj_intervention_forfait, periode_de, tableau_de_bord,
};
pub use identity::{
    DIRECTORY_ATTRIBUTES, DirectoryError, DirectoryRecord, EnrollmentError, EnrollmentProvider,
    IdentityProvider, attribuer_numero_anonyme, attribuer_role_intervenant, escape_filter_value,
    rechercher_utilisateurs, refresh_inscriptions, resolve_utilisateur,
};
pub use periode::maj_periode;
pub use store::{Store, StoreError};
