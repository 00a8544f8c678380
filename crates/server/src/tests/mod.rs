// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end tests of the HTTP surface.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use handisup_audit::{DomainEvent, RecordingEventBus};
use handisup_domain::{EtatDemande, Reponse};
use handisup_persistence::ReferenceData;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use time::macros::{date, datetime};
use tower::ServiceExt;

const REFERENCE_JSON: &str = include_str!("../../../../fixtures/reference.json");

/// Helper to create test app state with the bundled reference data and a
/// pinned clock.
fn create_test_app_state() -> (AppState, Arc<RecordingEventBus>) {
    let data: ReferenceData =
        ReferenceData::from_json_str(REFERENCE_JSON).expect("Failed to parse fixture");
    let persistence: Persistence =
        Persistence::with_reference_data(data).expect("Failed to load fixture");
    let bus: Arc<RecordingEventBus> = Arc::new(RecordingEventBus::new());
    let mut app_state: AppState = AppState::new(persistence, WorkflowConfig::default());
    app_state.events = bus.clone();
    app_state.fixed_now = Some(datetime!(2026-10-19 10:00));
    (app_state, bus)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let request: Request<Body> = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, value)
}

fn with_actor<T: Serialize>(actor_id: &str, request: &T) -> Value {
    serde_json::to_value(ActorRequest {
        actor_id: actor_id.to_string(),
        request,
    })
    .unwrap()
}

fn answer(campagne_id: i64, question_id: i64, option: i64) -> SubmitReponseRequest {
    let mut reponse: Reponse = Reponse::new(question_id);
    reponse.options = vec![option];
    SubmitReponseRequest {
        campagne_id,
        reponse,
    }
}

fn transition(demande_id: i64, etat: EtatDemande) -> TransitionDemandeRequest {
    TransitionDemandeRequest {
        demande_id,
        etat,
        commentaire: None,
        profil_id: None,
    }
}

async fn submit_complete_request(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/demandes/reponses",
        Some(with_actor("etu1", &answer(1, 1, 11))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    body["demande_id"].as_i64().unwrap()
}

#[test]
fn test_cli_defaults() {
    let args: Args = Args::try_parse_from(["handisup-server"]).unwrap();
    assert_eq!(args.host, "127.0.0.1");
    assert_eq!(args.port, 3000);
    assert_eq!(args.log_level, "info");
    assert_eq!(args.inscription_refresh_hours, 24);
    assert!(args.fixtures.is_none());
    assert!(args.database.is_none());
}

#[test]
fn test_cli_overrides() {
    let args: Args = Args::try_parse_from([
        "handisup-server",
        "--host",
        "0.0.0.0",
        "--port",
        "8080",
        "--database",
        "/var/lib/handisup/handisup.db",
        "--fixtures",
        "fixtures/reference.json",
        "--inscription-refresh-hours",
        "6",
    ])
    .unwrap();
    assert_eq!(args.host, "0.0.0.0");
    assert_eq!(args.port, 8080);
    assert_eq!(args.database.as_deref(), Some("/var/lib/handisup/handisup.db"));
    assert_eq!(args.fixtures.as_deref(), Some("fixtures/reference.json"));
    assert_eq!(args.inscription_refresh_hours, 6);
}

#[tokio::test]
async fn test_submit_reponse_creates_request() {
    let (app_state, bus) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(
        &app,
        "POST",
        "/demandes/reponses",
        Some(with_actor("etu1", &answer(1, 1, 11))),
    )
    .await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["created"], json!(true));
    assert_eq!(body["complete"], json!(true));
    assert_eq!(body["etat"], json!("EN_COURS"));
    assert!(
        bus.events()
            .iter()
            .any(|e| matches!(e, DomainEvent::ResourceModified { .. }))
    );
}

#[tokio::test]
async fn test_unknown_actor_is_unauthorized() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(
        &app,
        "POST",
        "/demandes/reponses",
        Some(with_actor("intrus", &answer(1, 1, 11))),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_incomplete_request_transition_is_unprocessable() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let (_, body) = send(
        &app,
        "POST",
        "/demandes/reponses",
        Some(with_actor("etu1", &answer(1, 1, 10))),
    )
    .await;
    let demande_id: i64 = body["demande_id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/demandes/transitions",
        Some(with_actor(
            "gest",
            &transition(demande_id, EtatDemande::Receptionnee),
        )),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["rule"], json!("demande_complete"));
}

#[tokio::test]
async fn test_request_reaches_validee_after_charter_acceptance() {
    let (app_state, bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let demande_id: i64 = submit_complete_request(&app).await;

    for etat in [EtatDemande::Receptionnee, EtatDemande::Conforme] {
        let (status, _) = send(
            &app,
            "POST",
            "/demandes/transitions",
            Some(with_actor("gest", &transition(demande_id, etat))),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/demandes/transitions",
        Some(with_actor(
            "gest",
            &transition(demande_id, EtatDemande::ProfilValide),
        )),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["etat"], json!("ATTENTE_VALIDATION_CHARTE"));
    assert_eq!(body["chartes_ajoutees"], json!(1));
    assert!(bus.events().iter().any(|e| matches!(
        e,
        DomainEvent::RoleSetChanged { uid, .. } if uid == "etu1"
    )));

    let (status, body) = send(
        &app,
        "POST",
        "/demandes/chartes",
        Some(with_actor(
            "etu1",
            &ValiderCharteRequest {
                demande_id,
                charte_id: 1,
            },
        )),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["etat"], json!("VALIDEE"));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/demandes/{demande_id}/historique?actor_id=gest"),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["modifications"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_ambiguous_profile_is_a_conflict() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let (_, body) = send(
        &app,
        "POST",
        "/demandes/reponses",
        Some(with_actor("etu2", &answer(2, 12, 41))),
    )
    .await;
    let demande_id: i64 = body["demande_id"].as_i64().unwrap();
    for etat in [EtatDemande::Receptionnee, EtatDemande::Conforme] {
        send(
            &app,
            "POST",
            "/demandes/transitions",
            Some(with_actor("gest", &transition(demande_id, etat))),
        )
        .await;
    }

    let (status, _) = send(
        &app,
        "POST",
        "/demandes/transitions",
        Some(with_actor(
            "gest",
            &transition(demande_id, EtatDemande::ProfilValide),
        )),
    )
    .await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
    let (_, body) = send(
        &app,
        "GET",
        &format!("/demandes/{demande_id}?actor_id=gest"),
        None,
    )
    .await;
    assert_eq!(body["etat"], json!("CONFORME"));
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, _) = send(&app, "GET", "/demandes/999?actor_id=gest", None).await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_requires_a_beneficiary_grant() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let evenement: SaveEvenementRequest = SaveEvenementRequest {
        id: None,
        type_id: 10,
        debut: datetime!(2026-10-20 10:00),
        fin: datetime!(2026-10-20 12:00),
        temps_preparation: 0,
        temps_supplementaire: 0,
        campus_id: None,
        salle: Some(String::from("B204")),
        intervenant: Some(String::from("interv")),
        beneficiaires: BTreeSet::from([String::from("etu1")]),
        suppleants: BTreeSet::new(),
        enseignants: BTreeSet::new(),
        equipements: BTreeSet::new(),
        annule: false,
        valide: None,
    };

    let (status, body) = send(
        &app,
        "POST",
        "/evenements",
        Some(with_actor("plan", &evenement)),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["rule"], json!("profil_beneficiaire_valide"));

    let grant: SaveBeneficiaireRequest = SaveBeneficiaireRequest {
        id: None,
        utilisateur: String::from("etu1"),
        profil_id: 2,
        gestionnaire: None,
        debut: date!(2026 - 09 - 01),
        fin: Some(date!(2027 - 09 - 01)),
        avec_accompagnement: true,
        typologies: BTreeSet::new(),
    };
    let (status, body) = send(
        &app,
        "POST",
        "/beneficiaires",
        Some(with_actor("gest", &grant)),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["gestionnaire"], json!("gest"));

    let (status, body) = send(
        &app,
        "POST",
        "/evenements",
        Some(with_actor("plan", &evenement)),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["periode_id"], json!(2));

    let (status, body) = send(
        &app,
        "GET",
        "/tableau_de_bord/evenements?actor_id=plan",
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["ce_mois"], json!(1));
}

#[tokio::test]
async fn test_dashboard_counts_requests_by_state() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    submit_complete_request(&app).await;

    let (status, body) = send(&app, "GET", "/tableau_de_bord/demandes?actor_id=gest", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["par_etat"]["EN_COURS"], json!(1));
}

#[tokio::test]
async fn test_unknown_user_needs_the_directory() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, _) = send(&app, "GET", "/utilisateurs/etu9?actor_id=gest", None).await;
    assert_eq!(status, HttpStatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(&app, "GET", "/utilisateurs/etu1?actor_id=gest", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["nom"], json!("Martin"));
}

#[tokio::test]
async fn test_search_falls_back_to_local_users() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(&app, "GET", "/utilisateurs?actor_id=gest&q=mar", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    let uids: Vec<&str> = body["utilisateurs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["uid"].as_str().unwrap())
        .collect();
    assert_eq!(uids, vec!["etu1", "plan"]);
}

#[tokio::test]
async fn test_duplicate_anonymous_number_is_unprocessable() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let request = |uid: &str| SetNumeroAnonymeRequest {
        uid: uid.to_string(),
        numero: 77,
    };

    let (status, _) = send(
        &app,
        "POST",
        "/utilisateurs/numero_anonyme",
        Some(with_actor("gest", &request("etu1"))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/utilisateurs/numero_anonyme",
        Some(with_actor("gest", &request("etu2"))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["rule"], json!("numero_anonyme_unique"));
}

#[tokio::test]
async fn test_overlapping_period_is_unprocessable() {
    let (app_state, _bus) = create_test_app_state();
    let app: Router = build_router(app_state);
    let periode: SavePeriodeRequest = SavePeriodeRequest {
        id: None,
        debut: date!(2026 - 10 - 15),
        fin: date!(2026 - 11 - 15),
        butoir: date!(2026 - 12 - 01),
        envoyee: false,
    };

    let (status, body) = send(&app, "POST", "/periodes", Some(with_actor("admin", &periode))).await;

    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["rule"], json!("periode_chevauchement"));
}
