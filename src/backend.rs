//! Chooses between the local engine and the forwarding service.

use crate::config::AkinConfig;
use crate::remote::RemoteEngine;
use crate::transport::HttpTransportFactory;
use akin_engine::{GameEngine, Session};
use tracing::{debug, instrument};

/// Where front ends get a fresh engine for each game.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Talk to the remote guessing service from this process.
    Local(HttpTransportFactory),
    /// Play through a forwarding service.
    Remote {
        /// Base URL of the forwarding service.
        engine_url: String,
        /// Shared connection pool.
        client: reqwest::Client,
    },
}

impl Backend {
    /// Picks a backend: an explicit URL wins, then the config file, then local play.
    #[instrument(skip(config))]
    pub fn from_config(config: &AkinConfig, engine_url: Option<String>) -> Self {
        match engine_url.or_else(|| config.client().engine_url().clone()) {
            Some(engine_url) => {
                debug!(%engine_url, "Using forwarding service");
                Backend::Remote {
                    engine_url,
                    client: reqwest::Client::new(),
                }
            }
            None => {
                debug!("Using local engine");
                Backend::Local(HttpTransportFactory::new(
                    config.remote().clone(),
                    config.player().clone(),
                ))
            }
        }
    }

    /// A new engine that has not started a game.
    pub fn engine(&self) -> Box<dyn GameEngine> {
        match self {
            Backend::Local(transports) => Box::new(Session::new(transports.create())),
            Backend::Remote { engine_url, client } => {
                Box::new(RemoteEngine::with_client(client.clone(), engine_url.clone()))
            }
        }
    }
}
