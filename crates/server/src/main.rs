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
#![allow(clippy::multiple_crate_versions)]

mod providers;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use handisup::{Context, EnrollmentProvider, IdentityProvider, WorkflowConfig};
use handisup_api::{
    ApiError, AuthenticatedActor, BeneficiaireInfo, DashboardDemandesResponse, DemandeInfo,
    EvenementInfo, HistoriqueResponse, InterventionForfaitInfo, PromoteIntervenantRequest,
    SaveBeneficiaireRequest, SaveEvenementRequest, SaveInterventionForfaitRequest,
    SavePeriodeRequest, SavePeriodeResponse, SearchUsersResponse, SetNumeroAnonymeRequest,
    SubmitReponseRequest, SubmitReponseResponse, TransitionDemandeRequest,
    TransitionDemandeResponse, UtilisateurInfo, ValiderCharteRequest, accept_charte,
    authenticate_stub, get_dashboard_demandes, get_dashboard_evenements, get_demande,
    get_historique, promote_intervenant, resolve_user, save_beneficiaire, save_evenement,
    save_intervention_forfait, save_periode, search_users, set_numero_anonyme, submit_reponse,
    transition_demande,
};
use handisup_audit::{EventBus, TracingEventBus};
use handisup_domain::TableauDeBordEvenements;
use handisup_persistence::{Persistence, ReferenceData};
use providers::{OfflineDirectory, OfflineEnrollments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Handisup Server - HTTP server for the accommodation workflow
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// JSON reference-data fixture, loaded into the database at startup.
    #[arg(short, long)]
    fixtures: Option<String>,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Minimum delay, in hours, between two enrollment refreshes of a user
    #[arg(long, default_value_t = 24)]
    inscription_refresh_hours: i64,
}

/// Application state shared across handlers.
///
/// The store is wrapped in a Mutex so every request sees a consistent view
/// from validation to write.
#[derive(Clone)]
struct AppState {
    /// The storage adapter.
    persistence: Arc<Mutex<Persistence>>,
    /// Outbound bus.
    events: Arc<dyn EventBus>,
    /// Identity directory.
    directory: Arc<dyn IdentityProvider>,
    /// Enrollment backend.
    enrollments: Arc<dyn EnrollmentProvider>,
    /// Workflow tunables.
    config: WorkflowConfig,
    /// Pinned clock, used by tests.
    fixed_now: Option<PrimitiveDateTime>,
}

impl AppState {
    fn new(persistence: Persistence, config: WorkflowConfig) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            events: Arc::new(TracingEventBus),
            directory: Arc::new(OfflineDirectory),
            enrollments: Arc::new(OfflineEnrollments),
            config,
            fixed_now: None,
        }
    }

    fn now(&self) -> PrimitiveDateTime {
        self.fixed_now.unwrap_or_else(|| {
            let now: OffsetDateTime = OffsetDateTime::now_utc();
            PrimitiveDateTime::new(now.date(), now.time())
        })
    }

    fn context(&self) -> Context<'_> {
        Context::new(
            self.events.as_ref(),
            self.enrollments.as_ref(),
            &self.config,
            self.now(),
        )
    }
}

/// A request body carrying the acting user next to the operation payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest<T> {
    /// The user performing this action.
    actor_id: String,
    /// The operation payload.
    #[serde(flatten)]
    request: T,
}

/// Query string of read endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorQuery {
    /// The user performing this action.
    actor_id: String,
}

/// Query string of the user search endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SearchQuery {
    /// The user performing this action.
    actor_id: String,
    /// Handle or name prefix.
    q: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Violated rule, for domain rule violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The violated rule, if any.
    rule: Option<String>,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            rule: self.rule,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.to_string();
        let (status, rule): (StatusCode, Option<String>) = match err {
            ApiError::AuthenticationFailed { .. } => (StatusCode::UNAUTHORIZED, None),
            ApiError::DomainRuleViolation { rule, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(rule))
            }
            ApiError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, None),
            ApiError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, None),
            ApiError::InconsistentReferenceData { .. } => (StatusCode::CONFLICT, None),
            ApiError::ServiceUnavailable { .. } => {
                warn!(error = %message, "Upstream service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, None)
            }
            ApiError::Internal { .. } => {
                error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        Self {
            status,
            rule,
            message,
        }
    }
}

/// Resolves the acting user against the local store.
fn authenticate(
    persistence: &Persistence,
    actor_id: &str,
) -> Result<AuthenticatedActor, HttpError> {
    authenticate_stub(persistence, actor_id).map_err(|e| HttpError::from(ApiError::from(e)))
}

/// Handler for POST `/demandes/reponses` endpoint.
///
/// Records an answer, creating the request on first answer.
async fn handle_submit_reponse(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SubmitReponseRequest>>,
) -> Result<Json<SubmitReponseResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        campagne_id = req.request.campagne_id,
        question_id = req.request.reponse.question_id,
        "Handling submit_reponse request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: SubmitReponseResponse =
        submit_reponse(&mut *persistence, &app_state.context(), req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/demandes/transitions` endpoint.
///
/// Moves a request to another state.
async fn handle_transition_demande(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<TransitionDemandeRequest>>,
) -> Result<Json<TransitionDemandeResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        demande_id = req.request.demande_id,
        etat = %req.request.etat,
        "Handling transition_demande request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: TransitionDemandeResponse =
        transition_demande(&mut *persistence, &app_state.context(), req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/demandes/chartes` endpoint.
///
/// Records the acceptance of a charter.
async fn handle_accept_charte(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<ValiderCharteRequest>>,
) -> Result<Json<DemandeInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        demande_id = req.request.demande_id,
        charte_id = req.request.charte_id,
        "Handling accept_charte request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: DemandeInfo =
        accept_charte(&mut *persistence, &app_state.context(), &req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/demandes/{demande_id}` endpoint.
async fn handle_get_demande(
    AxumState(app_state): AxumState<AppState>,
    Path(demande_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<DemandeInfo>, HttpError> {
    info!(actor_id = %query.actor_id, demande_id, "Handling get_demande request");

    let persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &query.actor_id)?;
    let response: DemandeInfo = get_demande(&*persistence, demande_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/demandes/{demande_id}/historique` endpoint.
async fn handle_get_historique(
    AxumState(app_state): AxumState<AppState>,
    Path(demande_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<HistoriqueResponse>, HttpError> {
    info!(actor_id = %query.actor_id, demande_id, "Handling get_historique request");

    let persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &query.actor_id)?;
    let response: HistoriqueResponse = get_historique(&*persistence, demande_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/tableau_de_bord/demandes` endpoint.
async fn handle_dashboard_demandes(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<DashboardDemandesResponse>, HttpError> {
    info!(actor_id = %query.actor_id, "Handling dashboard_demandes request");

    let persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &query.actor_id)?;
    let response: DashboardDemandesResponse = get_dashboard_demandes(&*persistence, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/tableau_de_bord/evenements` endpoint.
async fn handle_dashboard_evenements(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<TableauDeBordEvenements>, HttpError> {
    info!(actor_id = %query.actor_id, "Handling dashboard_evenements request");

    let persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &query.actor_id)?;
    let response: TableauDeBordEvenements =
        get_dashboard_evenements(&*persistence, &app_state.context(), &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/evenements` endpoint.
///
/// Creates or updates a scheduled event.
async fn handle_save_evenement(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SaveEvenementRequest>>,
) -> Result<Json<EvenementInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        evenement_id = req.request.id,
        type_id = req.request.type_id,
        "Handling save_evenement request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: EvenementInfo =
        save_evenement(&mut *persistence, &app_state.context(), req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/interventions_forfait` endpoint.
async fn handle_save_intervention_forfait(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SaveInterventionForfaitRequest>>,
) -> Result<Json<InterventionForfaitInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        periode_id = req.request.periode_id,
        "Handling save_intervention_forfait request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: InterventionForfaitInfo =
        save_intervention_forfait(&mut *persistence, &app_state.context(), req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/periodes` endpoint.
async fn handle_save_periode(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SavePeriodeRequest>>,
) -> Result<Json<SavePeriodeResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        periode_id = req.request.id,
        "Handling save_periode request"
    );

    let mut persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &req.actor_id)?;
    let response: SavePeriodeResponse =
        save_periode(&mut *persistence, &app_state.context(), req.request)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/beneficiaires` endpoint.
async fn handle_save_beneficiaire(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SaveBeneficiaireRequest>>,
) -> Result<Json<BeneficiaireInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        utilisateur = %req.request.utilisateur,
        "Handling save_beneficiaire request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let actor: AuthenticatedActor = authenticate(&persistence, &req.actor_id)?;
    let response: BeneficiaireInfo =
        save_beneficiaire(&mut *persistence, &app_state.context(), req.request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/utilisateurs/numero_anonyme` endpoint.
async fn handle_set_numero_anonyme(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<SetNumeroAnonymeRequest>>,
) -> Result<Json<UtilisateurInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        uid = %req.request.uid,
        "Handling set_numero_anonyme request"
    );

    let mut persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &req.actor_id)?;
    let response: UtilisateurInfo =
        set_numero_anonyme(&mut *persistence, &app_state.context(), &req.request)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/utilisateurs/intervenant` endpoint.
async fn handle_promote_intervenant(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<PromoteIntervenantRequest>>,
) -> Result<Json<UtilisateurInfo>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        uid = %req.request.uid,
        "Handling promote_intervenant request"
    );

    let mut persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &req.actor_id)?;
    let response: UtilisateurInfo =
        promote_intervenant(&mut *persistence, &app_state.context(), &req.request)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/utilisateurs/{uid}` endpoint.
///
/// Bootstraps the user from the directory on first reference.
async fn handle_resolve_user(
    AxumState(app_state): AxumState<AppState>,
    Path(uid): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<UtilisateurInfo>, HttpError> {
    info!(actor_id = %query.actor_id, uid = %uid, "Handling resolve_user request");

    let mut persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &query.actor_id)?;
    let response: UtilisateurInfo = resolve_user(
        &mut *persistence,
        app_state.directory.as_ref(),
        &app_state.context(),
        &uid,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/utilisateurs` endpoint.
async fn handle_search_users(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchUsersResponse>, HttpError> {
    info!(actor_id = %query.actor_id, term = %query.q, "Handling search_users request");

    let persistence = app_state.persistence.lock().await;
    authenticate(&persistence, &query.actor_id)?;
    let response: SearchUsersResponse =
        search_users(&*persistence, app_state.directory.as_ref(), &query.q)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/demandes/reponses", post(handle_submit_reponse))
        .route("/demandes/transitions", post(handle_transition_demande))
        .route("/demandes/chartes", post(handle_accept_charte))
        .route("/demandes/{demande_id}", get(handle_get_demande))
        .route(
            "/demandes/{demande_id}/historique",
            get(handle_get_historique),
        )
        .route("/tableau_de_bord/demandes", get(handle_dashboard_demandes))
        .route(
            "/tableau_de_bord/evenements",
            get(handle_dashboard_evenements),
        )
        .route("/evenements", post(handle_save_evenement))
        .route(
            "/interventions_forfait",
            post(handle_save_intervention_forfait),
        )
        .route("/periodes", post(handle_save_periode))
        .route("/beneficiaires", post(handle_save_beneficiaire))
        .route(
            "/utilisateurs/numero_anonyme",
            post(handle_set_numero_anonyme),
        )
        .route("/utilisateurs/intervenant", post(handle_promote_intervenant))
        .route("/utilisateurs", get(handle_search_users))
        .route("/utilisateurs/{uid}", get(handle_resolve_user))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Initializing Handisup Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let Some(path) = &args.fixtures {
        info!("Loading reference data from: {}", path);
        let data: ReferenceData = ReferenceData::from_path(std::path::Path::new(path))?;
        persistence.load_reference_data(data)?;
    } else if args.database.is_none() {
        warn!("No database or fixtures given, starting with an empty store");
    }

    let config: WorkflowConfig =
        WorkflowConfig::default().with_inscription_refresh_hours(args.inscription_refresh_hours);
    let app_state: AppState = AppState::new(persistence, config);

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
