//! HTTP forwarding service: the engine verbs over JSON.
//!
//! Each game lives in a registry keyed by a random session id. A session sits
//! behind its own async mutex, so requests for one game are served in order
//! while different games proceed independently.

use crate::transport::HttpTransportFactory;
use akin_engine::{EngineError, GameState, Session, Transport};
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// A session as kept by the service.
pub type SharedSession = Arc<tokio::sync::Mutex<Session<Box<dyn Transport>>>>;

/// Produces the transport for each new session.
pub trait TransportFactory: Send + Sync + 'static {
    /// A transport for a session that has not started yet.
    fn transport(&self) -> Box<dyn Transport>;
}

impl TransportFactory for HttpTransportFactory {
    fn transport(&self) -> Box<dyn Transport> {
        Box::new(self.create())
    }
}

impl<F> TransportFactory for F
where
    F: Fn() -> Box<dyn Transport> + Send + Sync + 'static,
{
    fn transport(&self) -> Box<dyn Transport> {
        self()
    }
}

/// Body of `POST /games`.
#[derive(Debug, Clone, PartialEq, Eq, new, Serialize, Deserialize)]
pub struct StartRequest {
    /// Language code or English name.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Body of `POST /games/{id}/answer`.
#[derive(Debug, Clone, PartialEq, Eq, new, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Any accepted answer spelling.
    pub key: String,
}

/// Response of `POST /games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    /// Identifier for later requests.
    pub session_id: String,
    /// Snapshot after start.
    pub state: GameState,
}

/// Response of every other verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Snapshot after the verb.
    pub state: GameState,
}

/// Live sessions by id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, SharedSession>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session under a fresh id.
    #[instrument(skip(self, session))]
    pub fn insert(&self, session: Session<Box<dyn Transport>>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.lock()
            .insert(id.clone(), Arc::new(tokio::sync::Mutex::new(session)));
        info!(session_id = %id, "Registered session");
        id
    }

    /// Looks a session up.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<SharedSession, EngineError> {
        self.lock().get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            EngineError::session_not_found(format!("no session with id {}", id))
        })
    }

    /// Drops a session.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Result<(), EngineError> {
        match self.lock().remove(id) {
            Some(_) => {
                info!(session_id = id, "Discarded session");
                Ok(())
            }
            None => Err(EngineError::session_not_found(format!("no session with id {}", id))),
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no session is live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared state of the router.
#[derive(Clone)]
pub struct AppState {
    registry: SessionRegistry,
    transports: Arc<dyn TransportFactory>,
}

impl AppState {
    /// Creates router state around a transport factory.
    pub fn new(transports: impl TransportFactory) -> Self {
        Self {
            registry: SessionRegistry::new(),
            transports: Arc::new(transports),
        }
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

/// An [`EngineError`] rendered as `{"detail": {"error", "message"}}`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.0.to_wire();
        warn!(kind = %self.0.kind(), status, message = self.0.message(), "Verb failed");
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", post(create_game))
        .route("/games/{id}", get(game_state).delete(discard_game))
        .route("/games/{id}/answer", post(answer))
        .route("/games/{id}/back", post(back))
        .route("/games/{id}/choose", post(choose))
        .route("/games/{id}/exclude", post(exclude))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

/// Binds and serves until the process is stopped.
#[instrument(skip(state))]
pub async fn serve(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "Forwarding service ready");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> ApiResult<(StatusCode, Json<StartResponse>)> {
    let mut session = Session::new(state.transports.transport());
    let game = session.start(&request.language).await?;
    let session_id = state.registry.insert(session);
    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            session_id,
            state: game,
        }),
    ))
}

#[instrument(skip(state))]
async fn game_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StateResponse>> {
    let session = state.registry.get(&id)?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(StateResponse { state: snapshot }))
}

#[instrument(skip(state))]
async fn answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<Json<StateResponse>> {
    let session = state.registry.get(&id)?;
    let snapshot = session.lock().await.answer(&request.key).await?;
    Ok(Json(StateResponse { state: snapshot }))
}

#[instrument(skip(state))]
async fn back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StateResponse>> {
    let session = state.registry.get(&id)?;
    let snapshot = session.lock().await.back().await?;
    Ok(Json(StateResponse { state: snapshot }))
}

#[instrument(skip(state))]
async fn choose(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StateResponse>> {
    let session = state.registry.get(&id)?;
    let snapshot = session.lock().await.choose()?;
    Ok(Json(StateResponse { state: snapshot }))
}

#[instrument(skip(state))]
async fn exclude(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StateResponse>> {
    let session = state.registry.get(&id)?;
    let snapshot = session.lock().await.exclude().await?;
    Ok(Json(StateResponse { state: snapshot }))
}

#[instrument(skip(state))]
async fn discard_game(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.registry.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
