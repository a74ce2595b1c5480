//! HTTP surface for the game server.
//!
//! Routes mirror the polling protocol: clients create or join a session,
//! submit moves, and poll `GET /api/game/{code}` on a fixed interval.
//! Every response carries the full session snapshot; errors are JSON
//! bodies of the form `{"error": "..."}`.

use crate::config::ServerConfig;
use crate::directory::{DirectoryError, UserDirectory};
use crate::manager::SessionManager;
use crate::session::{SessionError, SessionSnapshot};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle manager.
    pub sessions: SessionManager,
    /// Auth collaborator.
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Creates state over the given collaborators.
    pub fn new(sessions: SessionManager, users: Arc<dyn UserDirectory>) -> Self {
        Self { sessions, users }
    }
}

/// Signup and login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Successful signup/login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The authenticated identifier.
    pub email: String,
}

/// Session creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Creator email.
    pub email: String,
}

/// Join payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameRequest {
    /// Join code.
    pub code: String,
    /// Joiner email.
    pub email: String,
}

/// Move payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Join code.
    pub code: String,
    /// Requester email.
    pub email: String,
    /// Board position (0-8).
    pub position: u8,
}

/// An error response: HTTP status plus a JSON `error` body.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A plain 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let status = match err {
            SessionError::NotFound => StatusCode::NOT_FOUND,
            SessionError::NotAPlayer => StatusCode::FORBIDDEN,
            SessionError::CodesExhausted => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::AlreadyFull
            | SessionError::NotYourTurn
            | SessionError::GameOver
            | SessionError::InvalidPosition => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        let status = match err {
            DirectoryError::AlreadyExists => StatusCode::BAD_REQUEST,
            DirectoryError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/game/create", post(create_game))
        .route("/api/game/join", post(join_game))
        .route("/api/game/move", post(submit_move))
        .route("/api/game/{code}", get(get_game))
        .with_state(state)
}

fn require_credentials(req: &CredentialsRequest) -> Result<(), ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password required"));
    }
    Ok(())
}

#[instrument(skip_all, fields(email = %req.email))]
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    require_credentials(&req)?;
    let email = state.users.create_account(&req.email, &req.password).await?;
    info!("User created");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created".to_string(),
            email,
        }),
    ))
}

#[instrument(skip_all, fields(email = %req.email))]
async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    require_credentials(&req)?;
    let email = state
        .users
        .verify_credentials(&req.email, &req.password)
        .await?;
    debug!("Login successful");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        email,
    }))
}

#[instrument(skip_all, fields(email = %req.email))]
async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let snapshot = state.sessions.create_session(&req.email)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[instrument(skip_all, fields(code = %req.code, email = %req.email))]
async fn join_game(
    State(state): State<AppState>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.sessions.join_session(&req.code, &req.email)?;
    Ok(Json(snapshot))
}

#[instrument(skip_all, fields(code = %req.code, email = %req.email, position = req.position))]
async fn submit_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state
        .sessions
        .submit_move(&req.code, &req.email, req.position)?;
    Ok(Json(snapshot))
}

#[instrument(skip_all, fields(code = %code))]
async fn get_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.sessions.get_session(&code)?;
    Ok(Json(snapshot))
}

/// Binds the listener and serves the API until shutdown.
#[instrument(skip_all, fields(host = %config.host(), port = *config.port()))]
pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener =
        tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app).await?;
    Ok(())
}
