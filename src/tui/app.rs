//! Application state and key handling.

use akin::{Answer, EngineError, ErrorKind, GameState, Outcome, Phase};
use crossterm::event::KeyCode;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a flash message stays in the status bar.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

/// A verb the worker runs against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Open a fresh game in this language.
    Start(String),
    /// Answer the pending question.
    Answer(Answer),
    /// Undo the last answer.
    Back,
    /// Accept the guess.
    Choose,
    /// Reject the guess.
    Exclude,
}

/// Worker result for one verb.
#[derive(Debug)]
pub struct Reply {
    /// The verb that ran.
    pub verb: Verb,
    /// Its outcome.
    pub result: Result<GameState, EngineError>,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hand a verb to the worker.
    Send(Verb),
    /// Leave the UI.
    Quit,
}

#[derive(Debug, Clone)]
struct Flash {
    text: String,
    expires: Instant,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    language: String,
    debug: bool,
    state: Option<GameState>,
    history: Vec<String>,
    number: u32,
    pending: Option<Verb>,
    flash: Option<Flash>,
    fatal: Option<String>,
}

impl App {
    /// Creates the application for a game in `language`.
    pub fn new(language: impl Into<String>, debug: bool) -> Self {
        Self {
            language: language.into(),
            debug,
            state: None,
            history: Vec::new(),
            number: 1,
            pending: None,
            flash: None,
            fatal: None,
        }
    }

    /// The verb that opens the first game.
    pub fn initial_verb(&self) -> Verb {
        Verb::Start(self.language.clone())
    }

    /// Latest snapshot, once a game started.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Question history, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of the pending question.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// A verb is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Show step and progression.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Message that ended the game early, if any.
    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    /// Current flash message, if it has not expired at `now`.
    pub fn flash(&self, now: Instant) -> Option<&str> {
        self.flash
            .as_ref()
            .filter(|flash| flash.expires > now)
            .map(|flash| flash.text.as_str())
    }

    /// True once the game is over, either finished or ended by an error.
    pub fn is_over(&self) -> bool {
        self.fatal.is_some() || self.state.as_ref().is_some_and(|s| s.phase().is_finished())
    }

    /// Maps a key press to an action.
    pub fn handle_key(&self, key: KeyCode) -> Option<Action> {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
            return Some(Action::Quit);
        }
        if self.pending.is_some() {
            debug!(?key, "Ignoring key while a verb is in flight");
            return None;
        }
        if self.is_over() {
            return match key {
                KeyCode::Char('r') => Some(Action::Send(Verb::Start(self.language.clone()))),
                _ => None,
            };
        }
        let KeyCode::Char(c) = key else {
            return None;
        };
        match self.state.as_ref().map(GameState::phase) {
            Some(Phase::Asking) => match c {
                'b' => Some(Action::Send(Verb::Back)),
                _ => c.to_string().parse::<Answer>().ok().map(|a| Action::Send(Verb::Answer(a))),
            },
            Some(Phase::AwaitingWinConfirmation) => match c {
                'y' => Some(Action::Send(Verb::Choose)),
                'n' => Some(Action::Send(Verb::Exclude)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Marks `verb` as in flight.
    pub fn begin(&mut self, verb: &Verb) {
        debug!(?verb, "Verb dispatched");
        self.pending = Some(verb.clone());
    }

    /// Applies a worker reply. Returns a follow-up verb to dispatch, if any.
    pub fn apply(&mut self, reply: Reply, now: Instant) -> Option<Verb> {
        self.pending = None;
        match reply.result {
            Ok(state) => {
                self.record(&reply.verb, &state);
                self.state = Some(state);
                None
            }
            Err(err) => self.fail(&reply.verb, err, now),
        }
    }

    fn record(&mut self, verb: &Verb, next: &GameState) {
        let previous = self.state.as_ref();
        match verb {
            Verb::Start(_) => {
                info!(language = %self.language, "Game started");
                self.history.clear();
                self.number = 1;
                self.fatal = None;
                self.flash = None;
            }
            Verb::Answer(answer) => {
                let question = previous.map(|s| s.question.as_str()).unwrap_or_default();
                self.history
                    .push(format!("{}. {} → {}", self.number, question, answer));
                self.number += 1;
            }
            Verb::Back => {
                self.number = self.number.saturating_sub(1).max(1);
                self.history.push(format!("↶ back to question {}", self.number));
            }
            Verb::Choose => {
                let name = next.name_proposition.as_deref().unwrap_or("?");
                self.history.push(format!("✔ It was {}", name));
            }
            Verb::Exclude => {
                let name = previous
                    .and_then(|s| s.name_proposition.as_deref())
                    .unwrap_or("?");
                self.history.push(format!("✘ Not {}", name));
            }
        }
        if next.phase() == Phase::Finished(Outcome::NoWin) {
            self.history.push("I give up!".to_string());
        }
    }

    fn fail(&mut self, verb: &Verb, err: EngineError, now: Instant) -> Option<Verb> {
        warn!(?verb, kind = %err.kind(), message = err.message(), "Verb failed");
        match err.kind() {
            ErrorKind::InvalidLanguage => {
                self.set_flash(format!("{}; restarting in English", err.message()), now);
                self.language = "en".to_string();
                Some(Verb::Start(self.language.clone()))
            }
            ErrorKind::CannotGoBack | ErrorKind::InvalidAnswer => {
                self.set_flash(err.message().to_string(), now);
                None
            }
            ErrorKind::SessionNotFound | ErrorKind::SessionTimeout => {
                self.fatal = Some(format!("Game over: {}. Press r to restart.", err.message()));
                None
            }
            ErrorKind::Network | ErrorKind::StartupFailure if matches!(verb, Verb::Start(_)) => {
                self.fatal = Some(format!(
                    "Could not start a game: {}. Press r to retry.",
                    err.message()
                ));
                None
            }
            ErrorKind::Network | ErrorKind::StartupFailure => {
                self.set_flash(format!("{}: {}", err.kind(), err.message()), now);
                None
            }
        }
    }

    fn set_flash(&mut self, text: String, now: Instant) {
        self.flash = Some(Flash {
            text,
            expires: now + FLASH_DURATION,
        });
    }
}
