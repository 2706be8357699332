//! The verb surface every front end drives.
//!
//! Local play drives a [`Session`] directly; remote play drives an HTTP client
//! that speaks to the session server. Both implement [`GameEngine`], so the
//! line and terminal front ends never know which one they have.

use crate::error::EngineError;
use crate::session::Session;
use crate::state::{GameState, Phase};
use crate::transport::Transport;
use async_trait::async_trait;

/// Verbs of one game, local or remote.
#[async_trait]
pub trait GameEngine: Send {
    /// Opens a game in `language` (code or English name).
    async fn start(&mut self, language: &str) -> Result<GameState, EngineError>;

    /// Answers the pending question with any accepted spelling.
    async fn answer(&mut self, code: &str) -> Result<GameState, EngineError>;

    /// Undoes the last answer.
    async fn back(&mut self) -> Result<GameState, EngineError>;

    /// Accepts the pending guess.
    async fn choose(&mut self) -> Result<GameState, EngineError>;

    /// Rejects the pending guess.
    async fn exclude(&mut self) -> Result<GameState, EngineError>;

    /// Current snapshot. Fails with `InvalidAnswer` before a game started.
    async fn state(&mut self) -> Result<GameState, EngineError>;
}

#[async_trait]
impl<T: Transport> GameEngine for Session<T> {
    async fn start(&mut self, language: &str) -> Result<GameState, EngineError> {
        Session::start(self, language).await
    }

    async fn answer(&mut self, code: &str) -> Result<GameState, EngineError> {
        Session::answer(self, code).await
    }

    async fn back(&mut self) -> Result<GameState, EngineError> {
        Session::back(self).await
    }

    async fn choose(&mut self) -> Result<GameState, EngineError> {
        Session::choose(self)
    }

    async fn exclude(&mut self) -> Result<GameState, EngineError> {
        Session::exclude(self).await
    }

    async fn state(&mut self) -> Result<GameState, EngineError> {
        if self.phase() == Phase::NotStarted {
            return Err(EngineError::invalid_answer("no game in progress"));
        }
        Ok(self.snapshot())
    }
}

#[async_trait]
impl<E: GameEngine + ?Sized> GameEngine for Box<E> {
    async fn start(&mut self, language: &str) -> Result<GameState, EngineError> {
        (**self).start(language).await
    }

    async fn answer(&mut self, code: &str) -> Result<GameState, EngineError> {
        (**self).answer(code).await
    }

    async fn back(&mut self) -> Result<GameState, EngineError> {
        (**self).back().await
    }

    async fn choose(&mut self) -> Result<GameState, EngineError> {
        (**self).choose().await
    }

    async fn exclude(&mut self) -> Result<GameState, EngineError> {
        (**self).exclude().await
    }

    async fn state(&mut self) -> Result<GameState, EngineError> {
        (**self).state().await
    }
}
