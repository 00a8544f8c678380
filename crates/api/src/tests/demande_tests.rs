// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use handisup::Store;
use handisup_domain::{Beneficiaire, Demande, EtatDemande, Role};
use handisup_persistence::Persistence;

use crate::{
    ApiError, AuthenticatedActor, DashboardDemandesResponse, DemandeInfo, HistoriqueResponse,
    SubmitReponseRequest, SubmitReponseResponse, TransitionDemandeRequest,
    TransitionDemandeResponse, ValiderCharteRequest, accept_charte, get_dashboard_demandes,
    get_demande, get_historique, submit_reponse, transition_demande,
};

use super::helpers::{
    CAMPAGNE_ETUDES, CAMPAGNE_SPORT, CHARTE_AMENAGEMENTS, PROFIL_DYS, PROFIL_MOTEUR, TestEnv,
    actor, choix, create_test_persistence,
};

fn submit(
    persistence: &mut Persistence,
    env: &TestEnv,
    uid: &str,
    campagne_id: i64,
    question_id: i64,
    option: i64,
) -> SubmitReponseResponse {
    let demandeur: AuthenticatedActor = actor(persistence, uid);
    submit_reponse(
        persistence,
        &env.ctx(),
        SubmitReponseRequest {
            campagne_id,
            reponse: choix(question_id, option),
        },
        &demandeur,
    )
    .unwrap()
}

fn transition(
    persistence: &mut Persistence,
    env: &TestEnv,
    demande_id: i64,
    etat: EtatDemande,
    profil_id: Option<i64>,
) -> Result<TransitionDemandeResponse, ApiError> {
    let gestionnaire: AuthenticatedActor = actor(persistence, "gest");
    transition_demande(
        persistence,
        &env.ctx(),
        TransitionDemandeRequest {
            demande_id,
            etat,
            commentaire: None,
            profil_id,
        },
        &gestionnaire,
    )
}

/// Submits a complete request and walks it to `CONFORME`.
fn conforme(persistence: &mut Persistence, env: &TestEnv, campagne_id: i64) -> i64 {
    let (question_id, option) = if campagne_id == CAMPAGNE_SPORT {
        (12, 41)
    } else {
        (1, 11)
    };
    let demande_id: i64 = submit(persistence, env, "etu1", campagne_id, question_id, option).demande_id;
    transition(persistence, env, demande_id, EtatDemande::Receptionnee, None).unwrap();
    transition(persistence, env, demande_id, EtatDemande::Conforme, None).unwrap();
    demande_id
}

#[test]
fn test_first_answer_creates_the_request() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();

    let response: SubmitReponseResponse =
        submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 11);

    assert!(response.created);
    assert!(response.complete);
    assert_eq!(response.etat, EtatDemande::EnCours);
    assert_eq!(persistence.demandes().unwrap().len(), 1);
}

#[test]
fn test_later_answers_reuse_the_active_request() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();

    let first: SubmitReponseResponse =
        submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 11);
    let second: SubmitReponseResponse =
        submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 10);

    assert!(!second.created);
    assert_eq!(second.demande_id, first.demande_id);
    // option 10 opens a required follow-up question
    assert!(!second.complete);
    assert_eq!(persistence.demandes().unwrap().len(), 1);
}

#[test]
fn test_incomplete_request_cannot_be_received() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 10).demande_id;

    let err: ApiError =
        transition(&mut persistence, &env, demande_id, EtatDemande::Receptionnee, None)
            .unwrap_err();

    assert!(matches!(
        err,
        ApiError::DomainRuleViolation { ref rule, .. } if rule == "demande_complete"
    ));
    assert!(get_historique(&persistence, demande_id)
        .unwrap()
        .modifications
        .is_empty());
}

#[test]
fn test_transition_outside_the_graph_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 11).demande_id;

    let err: ApiError =
        transition(&mut persistence, &env, demande_id, EtatDemande::Validee, None).unwrap_err();

    assert!(matches!(
        err,
        ApiError::DomainRuleViolation { ref rule, .. } if rule == "demande_transition"
    ));
    let info: DemandeInfo = get_demande(&persistence, demande_id).unwrap();
    assert_eq!(info.etat, EtatDemande::EnCours);
}

#[test]
fn test_unknown_request_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();

    let err: ApiError =
        transition(&mut persistence, &env, 4242, EtatDemande::Receptionnee, None).unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_profile_validation_derives_beneficiary_and_waits_for_charters() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_ETUDES);

    let response: TransitionDemandeResponse =
        transition(&mut persistence, &env, demande_id, EtatDemande::ProfilValide, None).unwrap();

    assert_eq!(response.etat_precedent, EtatDemande::Conforme);
    assert_eq!(response.etat, EtatDemande::AttenteValidationCharte);
    assert_eq!(response.chartes_ajoutees, 1);

    let beneficiaires: Vec<Beneficiaire> = persistence.beneficiaires().unwrap();
    assert_eq!(beneficiaires.len(), 1);
    assert_eq!(beneficiaires[0].id, response.beneficiaire_id);
    assert_eq!(beneficiaires[0].profil_id, PROFIL_DYS);
    assert_eq!(beneficiaires[0].gestionnaire, "gest");
    assert!(
        persistence
            .utilisateur("etu1")
            .unwrap()
            .unwrap()
            .has_role(Role::Beneficiaire)
    );

    let historique: HistoriqueResponse = get_historique(&persistence, demande_id).unwrap();
    let etats: Vec<EtatDemande> = historique.modifications.iter().map(|m| m.etat).collect();
    assert_eq!(
        etats,
        vec![
            EtatDemande::Receptionnee,
            EtatDemande::Conforme,
            EtatDemande::ProfilValide,
            EtatDemande::AttenteValidationCharte,
        ]
    );
    assert_eq!(historique.modifications[3].modifie_par, None);
}

#[test]
fn test_accepting_every_charter_validates_the_request() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_ETUDES);
    transition(&mut persistence, &env, demande_id, EtatDemande::ProfilValide, None).unwrap();

    let demandeur: AuthenticatedActor = actor(&persistence, "etu1");
    let info: DemandeInfo = accept_charte(
        &mut persistence,
        &env.ctx(),
        &ValiderCharteRequest {
            demande_id,
            charte_id: CHARTE_AMENAGEMENTS,
        },
        &demandeur,
    )
    .unwrap();

    assert_eq!(info.etat, EtatDemande::Validee);
    assert!(info.chartes[0].date_validation.is_some());
}

#[test]
fn test_unknown_charter_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_ETUDES);
    let demandeur: AuthenticatedActor = actor(&persistence, "etu1");

    let err: ApiError = accept_charte(
        &mut persistence,
        &env.ctx(),
        &ValiderCharteRequest {
            demande_id,
            charte_id: 99,
        },
        &demandeur,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_ambiguous_profile_leaves_request_untouched() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_SPORT);

    let err: ApiError =
        transition(&mut persistence, &env, demande_id, EtatDemande::ProfilValide, None)
            .unwrap_err();

    assert!(matches!(err, ApiError::InconsistentReferenceData { .. }));
    assert_eq!(
        get_demande(&persistence, demande_id).unwrap().etat,
        EtatDemande::Conforme
    );
    assert!(persistence.beneficiaires().unwrap().is_empty());
}

#[test]
fn test_unknown_profile_override_leaves_request_untouched() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_ETUDES);

    let err: ApiError =
        transition(&mut persistence, &env, demande_id, EtatDemande::ProfilValide, Some(999))
            .unwrap_err();

    assert!(matches!(
        err,
        ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "profil"
    ));
    assert_eq!(
        get_demande(&persistence, demande_id).unwrap().etat,
        EtatDemande::Conforme
    );
    assert!(persistence.beneficiaires().unwrap().is_empty());

    let retry: TransitionDemandeResponse = transition(
        &mut persistence,
        &env,
        demande_id,
        EtatDemande::ProfilValide,
        Some(PROFIL_DYS),
    )
    .unwrap();
    assert_eq!(retry.etat, EtatDemande::AttenteValidationCharte);
}

#[test]
fn test_unknown_applicant_leaves_request_untouched() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let mut orpheline: Demande = Demande::new("fantome", CAMPAGNE_ETUDES);
    orpheline.etat = EtatDemande::Conforme;
    orpheline.reponses = vec![choix(1, 11)];
    let demande_id: i64 = persistence.save_demande(orpheline).unwrap().id.unwrap();

    let err: ApiError =
        transition(&mut persistence, &env, demande_id, EtatDemande::ProfilValide, None)
            .unwrap_err();

    assert!(matches!(
        err,
        ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "utilisateur"
    ));
    assert_eq!(
        get_demande(&persistence, demande_id).unwrap().etat,
        EtatDemande::Conforme
    );
    assert!(get_historique(&persistence, demande_id)
        .unwrap()
        .modifications
        .is_empty());
    assert!(persistence.beneficiaires().unwrap().is_empty());
}

#[test]
fn test_optional_accompaniment_waits_for_confirmation() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    let demande_id: i64 = conforme(&mut persistence, &env, CAMPAGNE_SPORT);

    let response: TransitionDemandeResponse = transition(
        &mut persistence,
        &env,
        demande_id,
        EtatDemande::ProfilValide,
        Some(PROFIL_MOTEUR),
    )
    .unwrap();

    assert_eq!(response.chartes_ajoutees, 0);
    assert_eq!(response.etat, EtatDemande::AttenteValidationAccompagnement);
    let info: DemandeInfo = get_demande(&persistence, demande_id).unwrap();
    assert_eq!(info.profil_attribue, Some(PROFIL_MOTEUR));
}

#[test]
fn test_dashboard_scopes_counts_to_the_actor() {
    let mut persistence: Persistence = create_test_persistence();
    let env: TestEnv = TestEnv::new();
    submit(&mut persistence, &env, "etu1", CAMPAGNE_ETUDES, 1, 11);
    submit(&mut persistence, &env, "etu2", CAMPAGNE_ETUDES, 1, 11);

    let gestionnaire: AuthenticatedActor = actor(&persistence, "gest");
    let staff_view: DashboardDemandesResponse =
        get_dashboard_demandes(&persistence, &gestionnaire).unwrap();
    assert_eq!(staff_view.total, 2);
    assert_eq!(staff_view.par_etat.get(&EtatDemande::EnCours), Some(&2));

    let etudiant: AuthenticatedActor = actor(&persistence, "etu2");
    let own_view: DashboardDemandesResponse =
        get_dashboard_demandes(&persistence, &etudiant).unwrap();
    assert_eq!(own_view.total, 1);
}
