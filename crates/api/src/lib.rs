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

//! Resource boundary of the accommodation workflow.
//!
//! Handlers accept request DTOs and an authenticated actor, run the domain
//! validators, call the core managers and translate every failure into an
//! [`ApiError`]. Nothing here knows about HTTP.

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, authenticate_stub};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    accept_charte, get_dashboard_demandes, get_dashboard_evenements, get_demande,
    get_historique, promote_intervenant, resolve_user, save_beneficiaire, save_evenement,
    save_intervention_forfait, save_periode, search_users, set_numero_anonyme, submit_reponse,
    transition_demande,
};
pub use request_response::{
    BeneficiaireInfo, CharteInfo, DashboardDemandesResponse, DemandeInfo, EvenementInfo,
    HistoriqueResponse, InterventionForfaitInfo, PromoteIntervenantRequest,
    SaveBeneficiaireRequest, SaveEvenementRequest, SaveInterventionForfaitRequest,
    SavePeriodeRequest, SavePeriodeResponse, SearchUsersResponse, SetNumeroAnonymeRequest,
    SubmitReponseRequest, SubmitReponseResponse, TransitionDemandeRequest,
    TransitionDemandeResponse, UtilisateurInfo, ValiderCharteRequest,
};
