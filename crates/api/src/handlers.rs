// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every write runs the domain validators first and only then hands the
//! mutation to a core manager. Managers never re-check what the validators
//! already decided.

use handisup::{
    BeneficiaireSaisie, Context, EvenementSaisie, IdentityProvider, Store, ajouter_chartes,
    attribuer_numero_anonyme, attribuer_role_intervenant, charger_demande,
    creer_beneficiaire_pour_demande, creer_demande, demande_active, enregistrer_reponse,
    historique, maj_beneficiaires, maj_evenement, maj_intervention_forfait, maj_periode,
    modifier_demande, rechercher_utilisateurs, resolve_utilisateur, resoudre_profil,
    tableau_de_bord, tableau_de_bord_demandes, type_demande_de, valider_charte,
};
use handisup_audit::Actor;
use handisup_domain::{
    Beneficiaire, Demande, EtatDemande, Evenement, InterventionForfait, PeriodeCible, PeriodeRh,
    ProfilBeneficiaire, TableauDeBordEvenements, TypeDemande, TypeEvenement, Utilisateur, is_complete,
    validate_beneficiaires_present, validate_beneficiaires_profil, validate_demande_transition,
    validate_demande_unique, validate_evenement_no_overlap, validate_evenement_window,
    validate_numero_anonyme_unique, validate_periode_no_overlap, validate_periode_not_locked,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    BeneficiaireInfo, DashboardDemandesResponse, DemandeInfo, EvenementInfo, HistoriqueResponse,
    InterventionForfaitInfo, PromoteIntervenantRequest, SaveBeneficiaireRequest,
    SaveEvenementRequest, SaveInterventionForfaitRequest, SavePeriodeRequest, SavePeriodeResponse,
    SearchUsersResponse, SetNumeroAnonymeRequest, SubmitReponseRequest, SubmitReponseResponse,
    TransitionDemandeRequest, TransitionDemandeResponse, UtilisateurInfo, ValiderCharteRequest,
};

/// Loads a request and computes whether its questionnaire is complete.
fn demande_et_completude(
    store: &dyn Store,
    demande_id: i64,
) -> Result<(Demande, TypeDemande, bool), ApiError> {
    let demande: Demande = charger_demande(store, demande_id).map_err(translate_core_error)?;
    let (_, type_demande) = type_demande_de(store, &demande).map_err(translate_core_error)?;
    let complete: bool = is_complete(&type_demande, &demande.reponses);
    Ok((demande, type_demande, complete))
}

/// Checks what the `PROFIL_VALIDE` follow-up needs before anything is
/// written: the profile, each of its charters and the applicant.
fn verifier_derivation(
    store: &dyn Store,
    demande: &Demande,
    profil_id: Option<i64>,
) -> Result<(), ApiError> {
    let not_found = |resource_type: &str, id: String| ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: format!("{resource_type} '{id}' does not exist"),
    };

    if let Some(profil_id) = profil_id {
        let profil: ProfilBeneficiaire = store
            .profil(profil_id)
            .map_err(store_failure)?
            .ok_or_else(|| not_found("profil", profil_id.to_string()))?;
        for charte_id in profil.chartes {
            if store.charte(charte_id).map_err(store_failure)?.is_none() {
                return Err(not_found("charte", charte_id.to_string()));
            }
        }
    }

    if store
        .utilisateur(&demande.demandeur)
        .map_err(store_failure)?
        .is_none()
    {
        return Err(not_found("utilisateur", demande.demandeur.clone()));
    }
    Ok(())
}

fn store_failure(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Storage failure: {err}"),
    }
}

/// Records an applicant's answer, creating the request on first answer.
///
/// This function:
/// - Looks up the applicant's active request for the campaign
/// - Creates it through the `(none) -> EN_COURS` transition if there is none
/// - Upserts the answer
///
/// # Arguments
///
/// * `store` - Storage
/// * `ctx` - Bus, configuration and clock
/// * `request` - The campaign and the answer
/// * `authenticated_actor` - The applicant
///
/// # Errors
///
/// Returns an error if:
/// - The campaign or the question does not exist
/// - The applicant already has an active request in a state that no longer
///   accepts answers
/// - The store fails
pub fn submit_reponse(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: SubmitReponseRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<SubmitReponseResponse, ApiError> {
    let demandeur: &str = &authenticated_actor.uid;

    let existing: Option<Demande> = demande_active(store, demandeur, request.campagne_id)
        .map_err(translate_core_error)?;
    let created: bool = existing.is_none();
    let demande_id: i64 = match existing.and_then(|demande| demande.id) {
        Some(id) => id,
        None => {
            let demandes: Vec<Demande> = store.demandes().map_err(store_failure)?;
            validate_demande_unique(demandeur, request.campagne_id, None, &demandes)
                .map_err(translate_domain_error)?;
            validate_demande_transition(None, EtatDemande::EnCours, false)
                .map_err(translate_domain_error)?;
            creer_demande(store, ctx, demandeur, request.campagne_id)
                .map_err(translate_core_error)?
                .id
                .unwrap_or_default()
        }
    };

    enregistrer_reponse(store, ctx, demande_id, request.reponse).map_err(translate_core_error)?;
    let (demande, _, complete) = demande_et_completude(store, demande_id)?;

    Ok(SubmitReponseResponse {
        demande_id,
        created,
        complete,
        etat: demande.etat,
    })
}

/// Moves a request to another state.
///
/// This function:
/// - Computes questionnaire completeness
/// - Runs the transition validator
/// - Applies the change through the request manager
/// - On `PROFIL_VALIDE`, derives the beneficiary, attaches the profile's
///   charters and moves the request on to `ATTENTE_VALIDATION_CHARTE`,
///   `ATTENTE_VALIDATION_ACCOMPAGNEMENT` or `VALIDEE`
///
/// For `PROFIL_VALIDE`, the profile, its charters and the applicant are
/// checked and the beneficiary is derived before the state is written, so
/// a failure leaves the request in its previous state.
///
/// # Arguments
///
/// * `store` - Storage
/// * `ctx` - Bus, configuration and clock
/// * `request` - The request, target state, comment and profile
/// * `authenticated_actor` - The staff member
///
/// # Errors
///
/// Returns an error if:
/// - The request does not exist
/// - The transition is not allowed, or needs a complete request
/// - No single profile can be resolved for `PROFIL_VALIDE`
/// - The store fails
pub fn transition_demande(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: TransitionDemandeRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<TransitionDemandeResponse, ApiError> {
    let (demande, type_demande, complete) = demande_et_completude(store, request.demande_id)?;
    let etat_precedent: EtatDemande = demande.etat;

    validate_demande_transition(Some(etat_precedent), request.etat, complete)
        .map_err(translate_domain_error)?;

    let profil_id: Option<i64> = if request.etat == EtatDemande::ProfilValide {
        Some(
            resoudre_profil(&demande, &type_demande, request.profil_id)
                .map_err(translate_core_error)?,
        )
    } else {
        request.profil_id
    };

    let actor: Actor = authenticated_actor.to_audit_actor();
    let mut beneficiaire_id: Option<i64> = None;
    if request.etat == EtatDemande::ProfilValide {
        verifier_derivation(store, &demande, profil_id)?;
        let beneficiaire: Beneficiaire =
            creer_beneficiaire_pour_demande(store, ctx, request.demande_id, profil_id, &actor)
                .map_err(translate_core_error)?;
        beneficiaire_id = beneficiaire.id;
    }

    let mut demande: Demande = modifier_demande(
        store,
        ctx,
        request.demande_id,
        request.etat,
        request.commentaire,
        profil_id,
        Some(&actor),
    )
    .map_err(translate_core_error)?;

    let mut chartes_ajoutees: usize = 0;
    if demande.etat == EtatDemande::ProfilValide {
        let (avec_chartes, attached) =
            ajouter_chartes(store, ctx, request.demande_id).map_err(translate_core_error)?;
        chartes_ajoutees = attached;

        let suivant: EtatDemande = if !avec_chartes.chartes_validees() {
            EtatDemande::AttenteValidationCharte
        } else if type_demande.accompagnement_optionnel {
            EtatDemande::AttenteValidationAccompagnement
        } else {
            EtatDemande::Validee
        };
        debug!(demande_id = request.demande_id, suivant = %suivant, "Profile validated, moving on");
        demande = modifier_demande(store, ctx, request.demande_id, suivant, None, None, None)
            .map_err(translate_core_error)?;
    }

    info!(
        demande_id = request.demande_id,
        from = %etat_precedent,
        to = %demande.etat,
        actor = %authenticated_actor.uid,
        "Request transition applied"
    );

    Ok(TransitionDemandeResponse {
        demande_id: request.demande_id,
        etat_precedent,
        etat: demande.etat,
        beneficiaire_id,
        chartes_ajoutees,
        message: format!(
            "Request {} moved from '{etat_precedent}' to '{}'",
            request.demande_id, demande.etat
        ),
    })
}

/// Records the acceptance of one charter.
///
/// Once every charter is accepted, a request waiting for them is validated
/// through the transition validator.
///
/// # Errors
///
/// Returns an error if the request or charter does not exist, or the store
/// fails.
pub fn accept_charte(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: &ValiderCharteRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DemandeInfo, ApiError> {
    let demande: Demande = valider_charte(store, ctx, request.demande_id, request.charte_id)
        .map_err(translate_core_error)?;

    if demande.etat == EtatDemande::AttenteValidationCharte && demande.chartes_validees() {
        let (_, _, complete) = demande_et_completude(store, request.demande_id)?;
        validate_demande_transition(Some(demande.etat), EtatDemande::Validee, complete)
            .map_err(translate_domain_error)?;
        modifier_demande(
            store,
            ctx,
            request.demande_id,
            EtatDemande::Validee,
            None,
            None,
            Some(&authenticated_actor.to_audit_actor()),
        )
        .map_err(translate_core_error)?;
    }

    get_demande(store, request.demande_id)
}

/// Returns a request with its completeness.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the request does not exist.
pub fn get_demande(store: &dyn Store, demande_id: i64) -> Result<DemandeInfo, ApiError> {
    let (demande, _, complete) = demande_et_completude(store, demande_id)?;
    Ok(DemandeInfo::from_demande(demande, complete))
}

/// Returns the transition log of a request.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the request does not exist.
pub fn get_historique(store: &dyn Store, demande_id: i64) -> Result<HistoriqueResponse, ApiError> {
    Ok(HistoriqueResponse {
        demande_id,
        modifications: historique(store, demande_id).map_err(translate_core_error)?,
    })
}

/// Counts in-progress requests per state.
///
/// Staff see every request, others only their own.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_dashboard_demandes(
    store: &dyn Store,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DashboardDemandesResponse, ApiError> {
    let par_etat: BTreeMap<EtatDemande, usize> = tableau_de_bord_demandes(
        store,
        &authenticated_actor.uid,
        authenticated_actor.is_staff(),
    )
    .map_err(translate_core_error)?;
    let total: usize = par_etat.values().sum();
    Ok(DashboardDemandesResponse { par_etat, total })
}

/// Computes the event dashboard.
///
/// Staff see every event, others only those they deliver.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn get_dashboard_evenements(
    store: &dyn Store,
    ctx: &Context<'_>,
    authenticated_actor: &AuthenticatedActor,
) -> Result<TableauDeBordEvenements, ApiError> {
    let intervenant: Option<&str> =
        (!authenticated_actor.is_staff()).then_some(authenticated_actor.uid.as_str());
    tableau_de_bord(store, ctx, intervenant).map_err(translate_core_error)
}

/// Creates or updates a scheduled event.
///
/// This function runs, in order, the window, beneficiary-required,
/// beneficiary-profile, overlap and period-lock validators, then hands the
/// submission to the event manager.
///
/// # Arguments
///
/// * `store` - Storage
/// * `ctx` - Bus, configuration and clock
/// * `request` - The event as submitted
/// * `authenticated_actor` - The planner; administrators bypass period locks
///
/// # Errors
///
/// Returns an error if a validator rejects the event, the event or its type
/// does not exist, or the store fails.
pub fn save_evenement(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: SaveEvenementRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<EvenementInfo, ApiError> {
    let type_evenement: TypeEvenement = store
        .type_evenement(request.type_id)
        .map_err(store_failure)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("type_evenement"),
            message: format!("type_evenement '{}' does not exist", request.type_id),
        })?;

    let saisie: EvenementSaisie = EvenementSaisie {
        id: request.id,
        type_id: request.type_id,
        debut: request.debut,
        fin: request.fin,
        temps_preparation: request.temps_preparation,
        temps_supplementaire: request.temps_supplementaire,
        campus_id: request.campus_id,
        salle: request.salle,
        intervenant: request.intervenant,
        beneficiaires: request.beneficiaires,
        suppleants: request.suppleants,
        enseignants: request.enseignants,
        equipements: request.equipements,
        annule: request.annule,
        valide: request.valide,
    };
    let candidat: Evenement = saisie.candidat(ctx.now);

    validate_evenement_window(&candidat).map_err(translate_domain_error)?;
    validate_beneficiaires_present(&candidat, &type_evenement).map_err(translate_domain_error)?;
    let beneficiaires: Vec<Beneficiaire> = store.beneficiaires().map_err(store_failure)?;
    validate_beneficiaires_profil(
        candidat.beneficiaires.iter().map(String::as_str),
        candidat.debut.date(),
        &beneficiaires,
    )
    .map_err(translate_domain_error)?;
    let evenements: Vec<Evenement> = store.evenements().map_err(store_failure)?;
    validate_evenement_no_overlap(&candidat, &evenements).map_err(translate_domain_error)?;
    let periodes: Vec<PeriodeRh> = store.periodes().map_err(store_failure)?;
    validate_periode_not_locked(
        PeriodeCible::Date(candidat.debut.date()),
        &periodes,
        ctx.now.date(),
        authenticated_actor.is_admin(),
    )
    .map_err(translate_domain_error)?;

    let evenement: Evenement =
        maj_evenement(store, ctx, saisie, &authenticated_actor.to_audit_actor())
            .map_err(translate_core_error)?;
    Ok(EvenementInfo::from(evenement))
}

/// Creates or updates a lump-sum intervention.
///
/// The intervention's own HR period must still accept submissions, unless
/// the actor is an administrator. Every listed beneficiary must hold a
/// grant on the first day of that period.
///
/// # Errors
///
/// Returns an error if the period is locked, a beneficiary holds no grant,
/// the type or period does not exist, or the store fails.
pub fn save_intervention_forfait(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: SaveInterventionForfaitRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<InterventionForfaitInfo, ApiError> {
    let periodes: Vec<PeriodeRh> = store.periodes().map_err(store_failure)?;
    validate_periode_not_locked(
        PeriodeCible::Periode(request.periode_id),
        &periodes,
        ctx.now.date(),
        authenticated_actor.is_admin(),
    )
    .map_err(translate_domain_error)?;
    let periode: &PeriodeRh = periodes
        .iter()
        .find(|p| p.id == Some(request.periode_id))
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("periode_rh"),
            message: format!("periode_rh '{}' does not exist", request.periode_id),
        })?;
    let beneficiaires: Vec<Beneficiaire> = store.beneficiaires().map_err(store_failure)?;
    validate_beneficiaires_profil(
        request.beneficiaires.iter().map(String::as_str),
        periode.debut,
        &beneficiaires,
    )
    .map_err(translate_domain_error)?;

    let intervention: InterventionForfait = maj_intervention_forfait(
        store,
        ctx,
        InterventionForfait {
            id: request.id,
            type_id: request.type_id,
            intervenant: request.intervenant,
            periode_id: request.periode_id,
            heures: request.heures,
            beneficiaires: request.beneficiaires,
        },
    )
    .map_err(translate_core_error)?;
    Ok(InterventionForfaitInfo::from(intervention))
}

/// Creates or updates an HR period.
///
/// The period must be ordered and must not overlap another period. Events
/// whose period changes are re-attributed.
///
/// # Errors
///
/// Returns an error if the period is invalid or overlaps, or the store fails.
pub fn save_periode(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: SavePeriodeRequest,
) -> Result<SavePeriodeResponse, ApiError> {
    let periode: PeriodeRh = PeriodeRh {
        id: request.id,
        debut: request.debut,
        fin: request.fin,
        butoir: request.butoir,
        envoyee: request.envoyee,
    };
    let existing: Vec<PeriodeRh> = store.periodes().map_err(store_failure)?;
    validate_periode_no_overlap(&periode, &existing).map_err(translate_domain_error)?;

    let (periode, evenements_reattribues) =
        maj_periode(store, ctx, periode).map_err(translate_core_error)?;
    Ok(SavePeriodeResponse {
        periode,
        evenements_reattribues,
    })
}

/// Creates or updates a beneficiary grant.
///
/// The acting staff member becomes the manager when none is given.
///
/// # Errors
///
/// Returns an error if the grant, user or profile does not exist, the window
/// is inverted, or the store fails.
pub fn save_beneficiaire(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: SaveBeneficiaireRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BeneficiaireInfo, ApiError> {
    let saisie: BeneficiaireSaisie = BeneficiaireSaisie {
        id: request.id,
        utilisateur: request.utilisateur,
        profil_id: request.profil_id,
        gestionnaire: request
            .gestionnaire
            .unwrap_or_else(|| authenticated_actor.uid.clone()),
        debut: request.debut,
        fin: request.fin,
        avec_accompagnement: request.avec_accompagnement,
        typologies: request.typologies,
    };
    let beneficiaire: Beneficiaire =
        maj_beneficiaires(store, ctx, saisie).map_err(translate_core_error)?;
    Ok(BeneficiaireInfo::from(beneficiaire))
}

/// Sets a user's anonymized number.
///
/// # Errors
///
/// Returns an error if another user holds the number, the user does not
/// exist, or the store fails.
pub fn set_numero_anonyme(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: &SetNumeroAnonymeRequest,
) -> Result<UtilisateurInfo, ApiError> {
    let utilisateurs: Vec<Utilisateur> = store.utilisateurs().map_err(store_failure)?;
    validate_numero_anonyme_unique(&request.uid, request.numero, &utilisateurs)
        .map_err(translate_domain_error)?;

    let utilisateur: Utilisateur = attribuer_numero_anonyme(store, ctx, &request.uid, request.numero)
        .map_err(translate_core_error)?;
    Ok(UtilisateurInfo::from(utilisateur))
}

/// Grants the intervenant role.
///
/// # Errors
///
/// Returns an error if the user does not exist or the store fails.
pub fn promote_intervenant(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    request: &PromoteIntervenantRequest,
) -> Result<UtilisateurInfo, ApiError> {
    let utilisateur: Utilisateur =
        attribuer_role_intervenant(store, ctx, &request.uid).map_err(translate_core_error)?;
    Ok(UtilisateurInfo::from(utilisateur))
}

/// Returns a user, bootstrapping it from the directory on first reference.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the directory does not know the handle, or
/// `ServiceUnavailable` if the directory cannot be reached.
pub fn resolve_user(
    store: &mut dyn Store,
    directory: &dyn IdentityProvider,
    ctx: &Context<'_>,
    uid: &str,
) -> Result<UtilisateurInfo, ApiError> {
    let utilisateur: Utilisateur =
        resolve_utilisateur(store, directory, ctx, uid).map_err(translate_core_error)?;
    Ok(UtilisateurInfo::from(utilisateur))
}

/// Searches users by handle or name prefix.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn search_users(
    store: &dyn Store,
    directory: &dyn IdentityProvider,
    term: &str,
) -> Result<SearchUsersResponse, ApiError> {
    let utilisateurs: Vec<Utilisateur> =
        rechercher_utilisateurs(store, directory, term).map_err(translate_core_error)?;
    Ok(SearchUsersResponse {
        utilisateurs: utilisateurs.into_iter().map(UtilisateurInfo::from).collect(),
    })
}
