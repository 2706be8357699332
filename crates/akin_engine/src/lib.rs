//! Akin engine - session protocol for the character guessing game
//!
//! The remote service asks yes/no questions until it can name the character
//! the player is thinking of. This crate owns everything between a front end
//! and that service.
//!
//! # Architecture
//!
//! - **Decoder**: classifies the service's markup into question, guess or undecodable
//! - **Transport**: one request per protocol step, behind an async trait
//! - **Session**: the phase state machine and its history stack
//! - **Errors**: a closed [`ErrorKind`] taxonomy and its HTTP wire mapping
//!
//! # Example
//!
//! ```no_run
//! use akin_engine::{Phase, ScriptedTransport, Session};
//!
//! # async fn example() -> Result<(), akin_engine::EngineError> {
//! let transport = ScriptedTransport::new().respond(
//!     r#"<div class="question"><script>x(123,456)</script><span class="n_question">1</span> Is your character real?</div>"#,
//! );
//! let mut session = Session::new(transport);
//! let state = session.start("en").await?;
//! assert_eq!(state.phase(), Phase::Asking);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod answer;
mod bridge;
mod decoder;
mod engine;
mod error;
mod language;
mod session;
mod state;
mod transport;

// Crate-level exports - Answers and languages
pub use answer::{Answer, AnswerCode};
pub use language::Language;

// Crate-level exports - Errors and the wire bridge
pub use bridge::{ErrorBody, ErrorDetail};
pub use error::{EngineError, ErrorKind};

// Crate-level exports - Decoding
pub use decoder::{Bootstrap, DecodedResponse, Proposition, SessionTokens, decode, decode_bootstrap};

// Crate-level exports - Session
pub use engine::GameEngine;
pub use session::Session;
pub use state::{GameState, HistoryEntry, Outcome, Phase};
pub use transport::{Request, ScriptedTransport, Transport, TransportError};
