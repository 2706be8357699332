//! Wire mapping for [`EngineError`] across a process boundary.
//!
//! Each [`ErrorKind`] owns exactly one HTTP status and one wire name. Both
//! directions are plain `match` tables over the closed enum, so adding a kind
//! without a wire row does not compile. Decoding only trusts a marker when the
//! name and status agree on the same row; everything else is [`ErrorKind::Network`].

use crate::error::{EngineError, ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

impl ErrorKind {
    /// HTTP status used for this kind at the boundary.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidLanguage => 422,
            ErrorKind::StartupFailure => 503,
            ErrorKind::InvalidAnswer => 400,
            ErrorKind::CannotGoBack => 409,
            ErrorKind::SessionTimeout => 408,
            ErrorKind::SessionNotFound => 404,
            ErrorKind::Network => 502,
        }
    }

    /// Error name carried in the response body.
    pub fn wire_name(self) -> &'static str {
        match self {
            ErrorKind::InvalidLanguage => "InvalidLanguageError",
            ErrorKind::StartupFailure => "StartupError",
            ErrorKind::InvalidAnswer => "InvalidAnswerError",
            ErrorKind::CannotGoBack => "CantGoBackError",
            ErrorKind::SessionTimeout => "SessionTimeoutError",
            ErrorKind::SessionNotFound => "SessionNotFound",
            ErrorKind::Network => "NetworkError",
        }
    }

    /// Reverse lookup of [`ErrorKind::wire_name`].
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "InvalidLanguageError" => Some(ErrorKind::InvalidLanguage),
            "StartupError" => Some(ErrorKind::StartupFailure),
            "InvalidAnswerError" => Some(ErrorKind::InvalidAnswer),
            "CantGoBackError" => Some(ErrorKind::CannotGoBack),
            "SessionTimeoutError" => Some(ErrorKind::SessionTimeout),
            "SessionNotFound" => Some(ErrorKind::SessionNotFound),
            "NetworkError" => Some(ErrorKind::Network),
            _ => None,
        }
    }

    /// Decodes a `(status, name)` marker. Mismatched or unknown markers are `Network`.
    pub fn from_wire(status: u16, name: &str) -> Self {
        match Self::from_wire_name(name) {
            Some(kind) if kind.status_code() == status => kind,
            Some(kind) => {
                warn!(status, name, expected = kind.status_code(), "Status disagrees with error name");
                ErrorKind::Network
            }
            None => {
                warn!(status, name, "Unknown error name on the wire");
                ErrorKind::Network
            }
        }
    }
}

/// Error detail in a boundary response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Wire name of the kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Body of every error response: `{"detail": {"error": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error detail.
    pub detail: ErrorDetail,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            detail: ErrorDetail {
                error: err.kind().wire_name().to_string(),
                message: err.message().to_string(),
            },
        }
    }
}

impl EngineError {
    /// Encodes this error as `(status, body)` for the boundary.
    pub fn to_wire(&self) -> (u16, ErrorBody) {
        (self.kind().status_code(), ErrorBody::from(self))
    }

    /// Rebuilds an error from a boundary response.
    ///
    /// `body` is `None` when the response body could not be parsed; `raw` is
    /// then used as the message and the kind is [`ErrorKind::Network`].
    #[instrument(skip(body, raw))]
    pub fn from_wire(status: u16, body: Option<ErrorBody>, raw: &str) -> Self {
        match body {
            Some(body) => {
                let kind = ErrorKind::from_wire(status, &body.detail.error);
                debug!(?kind, "Decoded boundary error");
                EngineError::new(kind, body.detail.message)
            }
            None => {
                warn!(status, "Unparseable error body");
                EngineError::network(format!("HTTP {}: {}", status, raw))
            }
        }
    }
}
