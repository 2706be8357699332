//! Snapshots and phases of a game session.

use crate::answer::Answer;
use derive_getters::Getters;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Outcome {
    /// The guess was confirmed.
    #[display("win")]
    Win,
    /// The service gave up.
    #[display("no win")]
    NoWin,
}

/// Phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Phase {
    /// `start` has not succeeded yet.
    #[display("not started")]
    NotStarted,
    /// A question is pending.
    #[display("asking")]
    Asking,
    /// A guess is pending confirmation.
    #[display("awaiting win confirmation")]
    AwaitingWinConfirmation,
    /// Terminal.
    #[display("finished ({})", _0)]
    Finished(Outcome),
}

impl Phase {
    /// True once the game is over.
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Finished(_))
    }
}

/// Immutable snapshot returned after every transition.
///
/// Front ends only ever see this type, locally or across the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current question, guess prompt or final message.
    pub question: String,
    /// Requests issued since start.
    pub step: u32,
    /// Progress in `[0, 100]`.
    pub progression: f64,
    /// A guess is pending or was confirmed.
    pub win: bool,
    /// The game is over.
    pub finished: bool,
    /// Proposed character name.
    pub name_proposition: Option<String>,
    /// Proposed character descriptor.
    pub description_proposition: Option<String>,
}

impl GameState {
    /// Phase implied by the snapshot flags.
    ///
    /// Snapshots are only handed out after a successful start, so this never
    /// returns [`Phase::NotStarted`].
    pub fn phase(&self) -> Phase {
        match (self.win, self.finished) {
            (true, true) => Phase::Finished(Outcome::Win),
            (false, true) => Phase::Finished(Outcome::NoWin),
            (true, false) => Phase::AwaitingWinConfirmation,
            (false, false) => Phase::Asking,
        }
    }
}

/// One answered question, kept so that `back` can undo it.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Question text at the time of answering.
    question: String,
    /// Step counter at the time of answering.
    step: u32,
    /// The answer given.
    answer: Answer,
}

impl HistoryEntry {
    /// Creates a history entry.
    pub fn new(question: impl Into<String>, step: u32, answer: Answer) -> Self {
        Self {
            question: question.into(),
            step,
            answer,
        }
    }
}
