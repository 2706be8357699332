//! Akin - play the character guessing game from a terminal or over HTTP
//!
//! The session protocol lives in [`akin_engine`]. This crate wires it to the
//! real remote service and puts front ends around it.
//!
//! # Architecture
//!
//! - **Transport**: reqwest GETs against the remote service
//! - **Server**: axum forwarding service exposing the engine verbs as JSON
//! - **Remote**: client for that service, interchangeable with a local session
//! - **Config**: `akin.toml` with remote, player, server and client sections
//!
//! # Example
//!
//! ```no_run
//! use akin::{AkinConfig, Backend, GameEngine};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AkinConfig::load_or_default("akin.toml")?;
//! let mut engine = Backend::from_config(&config, None).engine();
//! let state = engine.start("en").await?;
//! println!("{}", state.question);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod backend;
mod config;
mod remote;
mod server;
mod transport;

// Crate-level exports - Configuration
pub use config::{
    AkinConfig, ClientSettings, ConfigError, Gender, LANGUAGE_PLACEHOLDER, PlayerProfile,
    RemoteSettings, ServerSettings,
};

// Crate-level exports - Remote service transport
pub use transport::{HttpTransport, HttpTransportFactory};

// Crate-level exports - Forwarding service
pub use server::{
    AnswerRequest, ApiError, AppState, SessionRegistry, SharedSession, StartRequest,
    StartResponse, StateResponse, TransportFactory, router, serve,
};

// Crate-level exports - Clients
pub use backend::Backend;
pub use remote::RemoteEngine;

// Engine re-exports for front ends
pub use akin_engine::{
    Answer, AnswerCode, EngineError, ErrorKind, GameEngine, GameState, Language, Outcome, Phase,
};
