//! REST endpoints for the admin UI and bracket pages, mounted under `/api`.
//!
//! Handlers hand the work to the blocking pool: repository I/O may touch disk.

use crate::models::{TournamentError, TournamentId};
use crate::service::{CreateTournament, ServiceError, TournamentCommand, TournamentService};
use crate::store::{StoreError, TournamentFilter};
use actix_web::{
    delete, get,
    http::StatusCode,
    patch, post,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder, ResponseError,
};
use serde::Deserialize;
use thiserror::Error;

/// Shared state: one service for all tournaments (locks are per tournament inside it).
pub type AppState = Data<TournamentService>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<TournamentError> for ApiError {
    fn from(e: TournamentError) -> Self {
        ApiError::Service(e.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Service(e.into())
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Service(ServiceError::Tournament(e)) => e.code(),
            ApiError::Service(ServiceError::Store(StoreError::NotFound(_))) => "not_found",
            ApiError::Service(ServiceError::Store(StoreError::VersionConflict { .. })) => "version_conflict",
            ApiError::Service(ServiceError::Store(_)) => "storage_error",
            ApiError::Service(ServiceError::InvalidRequest(_)) => "invalid_request",
            ApiError::Join(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        use TournamentError as T;
        match self {
            ApiError::Service(ServiceError::Tournament(e)) => match e {
                T::MatchNotFound(_) => StatusCode::NOT_FOUND,
                T::MatchAlreadyCompleted(_)
                | T::TournamentCompleted
                | T::InvalidTransition { .. }
                | T::InvalidStatusTransition { .. }
                | T::NotDraft(_) => StatusCode::CONFLICT,
                T::BrokenBracket(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Service(ServiceError::Store(e)) => match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::VersionConflict { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Service(ServiceError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string(), "code": self.code() }))
    }
}

/// Run a service call on the blocking pool.
async fn run<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TournamentService) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.clone();
    Ok(tokio::task::spawn_blocking(move || f(service.get_ref())).await??)
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "cobblemon-bracket",
    })
}

/// Create a tournament and its bracket (status draft).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournament>) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let tournament = run(&state, move |s| s.create(request)).await?;
    Ok(HttpResponse::Created().json(tournament))
}

/// List tournaments, newest first, optionally filtered by `status` / `bracketType`.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, filter: Query<TournamentFilter>) -> Result<HttpResponse, ApiError> {
    let filter = filter.into_inner();
    let tournaments = run(&state, move |s| Ok(s.queries().list(&filter)?)).await?;
    Ok(HttpResponse::Ok().json(tournaments))
}

/// Full aggregate with every round and match.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> Result<HttpResponse, ApiError> {
    let id = path.id;
    let tournament = run(&state, move |s| Ok(s.queries().tournament(id)?)).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// Admin actions: updateStatus, setMatchResult, startMatch.
#[patch("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentCommand>,
) -> Result<HttpResponse, ApiError> {
    let id = path.id;
    let command = body.into_inner();
    let tournament = run(&state, move |s| s.execute(id, command)).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// Discard a draft tournament.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> Result<HttpResponse, ApiError> {
    let id = path.id;
    run(&state, move |s| s.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> Result<HttpResponse, ApiError> {
    let id = path.id;
    let view = run(&state, move |s| Ok(s.queries().bracket(id)?)).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_get_standings(state: AppState, path: Path<TournamentPath>) -> Result<HttpResponse, ApiError> {
    let id = path.id;
    let standings = run(&state, move |s| Ok(s.queries().standings(id)?)).await?;
    Ok(HttpResponse::Ok().json(standings))
}

/// Roster entries loaded at startup (empty when none is configured).
#[get("/api/roster")]
async fn api_roster(state: AppState) -> HttpResponse {
    let entries = state.roster().map(|r| r.entries().to_vec()).unwrap_or_default();
    HttpResponse::Ok().json(entries)
}

fn invalid_request(message: String) -> actix_web::Error {
    ApiError::Service(ServiceError::InvalidRequest(message)).into()
}

/// Register every endpoint on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| invalid_request(err.to_string())))
        .app_data(web::QueryConfig::default().error_handler(|err, _| invalid_request(err.to_string())))
        .service(api_health)
        .service(api_create_tournament)
        .service(api_list_tournaments)
        .service(api_get_tournament)
        .service(api_update_tournament)
        .service(api_delete_tournament)
        .service(api_get_bracket)
        .service(api_get_standings)
        .service(api_roster);
}
