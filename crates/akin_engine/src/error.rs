//! Error taxonomy shared by every engine front end.
//!
//! Every failure the engine reports carries exactly one [`ErrorKind`] and a
//! human-readable detail. The kind set is closed so that the wire mapping in
//! [`crate::bridge`] can be checked exhaustively.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use tracing::instrument;

/// Closed set of failure kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, EnumIter,
)]
pub enum ErrorKind {
    /// The requested language is not served by the remote service.
    #[display("invalid language")]
    InvalidLanguage,
    /// The bootstrap step failed (transport or token decoding).
    #[display("startup failure")]
    StartupFailure,
    /// The answer code is unknown, or the verb is not legal in the current phase.
    #[display("invalid answer")]
    InvalidAnswer,
    /// Undo requested with an empty history.
    #[display("cannot go back")]
    CannotGoBack,
    /// The remote service did not answer in time.
    #[display("session timeout")]
    SessionTimeout,
    /// Unknown session identifier at a process boundary.
    #[display("session not found")]
    SessionNotFound,
    /// Catch-all transport or protocol failure.
    #[display("network error")]
    Network,
}

/// A failure raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}: {}", kind, message)]
pub struct EngineError {
    kind: ErrorKind,
    message: String,
}

impl EngineError {
    /// Creates an error of the given kind.
    #[instrument(skip(message))]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::InvalidLanguage`].
    pub fn invalid_language(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidLanguage, message)
    }

    /// Shorthand for [`ErrorKind::StartupFailure`].
    pub fn startup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StartupFailure, message)
    }

    /// Shorthand for [`ErrorKind::InvalidAnswer`].
    pub fn invalid_answer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAnswer, message)
    }

    /// Shorthand for [`ErrorKind::CannotGoBack`].
    pub fn cannot_go_back(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CannotGoBack, message)
    }

    /// Shorthand for [`ErrorKind::SessionTimeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionTimeout, message)
    }

    /// Shorthand for [`ErrorKind::SessionNotFound`].
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionNotFound, message)
    }

    /// Shorthand for [`ErrorKind::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable detail.
    pub fn message(&self) -> &str {
        &self.message
    }
}
