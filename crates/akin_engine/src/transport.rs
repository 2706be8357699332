//! Transport seam between the state machine and the remote service.
//!
//! A [`Transport`] performs exactly one request per protocol step and returns
//! the raw response body. Everything about URLs, query encoding and timeouts
//! lives behind this trait.

use crate::answer::Answer;
use crate::decoder::SessionTokens;
use crate::language::Language;
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// One protocol step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open a new session.
    Start {
        /// Game language.
        language: Language,
    },
    /// Answer the pending question.
    Answer {
        /// Session identity.
        tokens: SessionTokens,
        /// Step counter before this request.
        step: u32,
        /// The answer.
        answer: Answer,
    },
    /// Rewind one question.
    Undo {
        /// Session identity.
        tokens: SessionTokens,
        /// Step counter before this request.
        step: u32,
    },
    /// Reject the pending guess and continue.
    Exclude {
        /// Session identity.
        tokens: SessionTokens,
        /// Step counter before this request.
        step: u32,
    },
}

impl Request {
    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Request::Start { .. } => "start",
            Request::Answer { .. } => "answer",
            Request::Undo { .. } => "undo",
            Request::Exclude { .. } => "exclude",
        }
    }
}

/// Connection-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[display("request timed out: {}", _0)]
    Timeout(#[error(not(source))] String),
    /// Connection refused, reset, DNS failure and the like.
    #[display("connection failed: {}", _0)]
    Connection(#[error(not(source))] String),
    /// The service answered with a non-success status.
    #[display("remote service returned HTTP {}", _0)]
    Status(#[error(not(source))] u16),
}

/// Performs protocol steps against the remote service.
#[async_trait]
pub trait Transport: Send {
    /// Sends one request and returns the raw response body.
    async fn send(&mut self, request: Request) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, request: Request) -> Result<String, TransportError> {
        (**self).send(request).await
    }
}

/// In-memory transport that replays canned bodies in order.
///
/// Every request is recorded so callers can check what was sent. Once the
/// script runs out, requests fail with a connection error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: VecDeque<Result<String, TransportError>>,
    sent: Vec<Request>,
}

impl ScriptedTransport {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful body.
    pub fn respond(mut self, body: impl Into<String>) -> Self {
        self.responses.push_back(Ok(body.into()));
        self
    }

    /// Queues a failure.
    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    /// Requests sent so far.
    pub fn sent(&self) -> &[Request] {
        &self.sent
    }

    /// Bodies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    #[instrument(skip(self), fields(request = request.tag()))]
    async fn send(&mut self, request: Request) -> Result<String, TransportError> {
        self.sent.push(request);
        let next = self
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".to_string())));
        debug!(ok = next.is_ok(), remaining = self.responses.len(), "Replayed scripted response");
        next
    }
}
