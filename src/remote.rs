//! Client for the forwarding service.
//!
//! [`RemoteEngine`] exposes the same verbs as a local session. Error responses
//! are decoded through the wire bridge, so callers see the same
//! [`ErrorKind`](akin_engine::ErrorKind) they would see locally.

use crate::server::{AnswerRequest, StartRequest, StartResponse, StateResponse};
use akin_engine::{EngineError, ErrorBody, GameEngine, GameState};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// A game played through the forwarding service.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    client: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl RemoteEngine {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client sharing an existing connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    /// Server-side id of the current game.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Deletes the game on the server.
    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    pub async fn discard(&mut self) -> Result<(), EngineError> {
        let id = self.require_session()?;
        let url = format!("{}/games/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(request_failure)?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(decode_error(response).await);
        }
        self.session_id = None;
        info!("Remote game discarded");
        Ok(())
    }

    fn require_session(&self) -> Result<String, EngineError> {
        self.session_id
            .clone()
            .ok_or_else(|| EngineError::invalid_answer("no game in progress"))
    }

    async fn verb<B: Serialize + ?Sized>(
        &self,
        method: Method,
        verb: &str,
        body: Option<&B>,
    ) -> Result<GameState, EngineError> {
        let id = self.require_session()?;
        let url = if verb.is_empty() {
            format!("{}/games/{}", self.base_url, id)
        } else {
            format!("{}/games/{}/{}", self.base_url, id, verb)
        };
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(request_failure)?;
        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }
        let parsed: StateResponse = response.json().await.map_err(|e| {
            EngineError::network(format!("malformed state response: {}", e))
        })?;
        debug!(step = parsed.state.step, "Remote verb succeeded");
        Ok(parsed.state)
    }
}

#[async_trait]
impl GameEngine for RemoteEngine {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn start(&mut self, language: &str) -> Result<GameState, EngineError> {
        if self.session_id.is_some() {
            return Err(EngineError::invalid_answer("game already started"));
        }
        let response = self
            .client
            .post(format!("{}/games", self.base_url))
            .json(&StartRequest::new(language.to_string()))
            .send()
            .await
            .map_err(request_failure)?;
        if response.status() != StatusCode::CREATED {
            return Err(decode_error(response).await);
        }
        let started: StartResponse = response.json().await.map_err(|e| {
            EngineError::network(format!("malformed start response: {}", e))
        })?;
        info!(session_id = %started.session_id, "Remote game started");
        self.session_id = Some(started.session_id);
        Ok(started.state)
    }

    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    async fn answer(&mut self, code: &str) -> Result<GameState, EngineError> {
        let body = AnswerRequest::new(code.to_string());
        self.verb(Method::POST, "answer", Some(&body)).await
    }

    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    async fn back(&mut self) -> Result<GameState, EngineError> {
        self.verb::<()>(Method::POST, "back", None).await
    }

    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    async fn choose(&mut self) -> Result<GameState, EngineError> {
        self.verb::<()>(Method::POST, "choose", None).await
    }

    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    async fn exclude(&mut self) -> Result<GameState, EngineError> {
        self.verb::<()>(Method::POST, "exclude", None).await
    }

    #[instrument(skip(self), fields(session_id = ?self.session_id))]
    async fn state(&mut self) -> Result<GameState, EngineError> {
        self.verb::<()>(Method::GET, "", None).await
    }
}

fn request_failure(err: reqwest::Error) -> EngineError {
    warn!(error = %err, "Request to forwarding service failed");
    if err.is_timeout() {
        EngineError::timeout(err.to_string())
    } else {
        EngineError::network(err.to_string())
    }
}

async fn decode_error(response: reqwest::Response) -> EngineError {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&raw).ok();
    EngineError::from_wire(status, body, &raw)
}
