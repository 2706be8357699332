//! Session state machine.
//!
//! ```text
//! NotStarted ──start──▶ Asking ◀──exclude── AwaitingWinConfirmation
//!                       │  ▲ answer/back          │ ▲        │ choose
//!                       │  └──────────────────────┘ │        ▼
//!                       └──answer (guess)───────────┘   Finished(Win)
//!         any undecodable response ─────────────────▶  Finished(NoWin)
//! ```
//!
//! Every verb either returns a fresh [`GameState`] or an [`EngineError`]. On
//! error nothing about the session changes: the transport call and decoding
//! happen first, and the session is only mutated once a response was decoded
//! into a legal transition.

use crate::answer::{Answer, AnswerCode};
use crate::decoder::{self, DecodedResponse, Proposition, SessionTokens};
use crate::error::EngineError;
use crate::language::Language;
use crate::state::{GameState, HistoryEntry, Outcome, Phase};
use crate::transport::{Request, Transport, TransportError};
use tracing::{debug, info, instrument, warn};

/// Progress reported once the service commits to a guess.
const GUESS_PROGRESSION: f64 = 100.0;

/// One conversation with the remote service.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    language: Option<Language>,
    tokens: Option<SessionTokens>,
    phase: Phase,
    step: u32,
    question: String,
    progression: f64,
    proposition: Option<Proposition>,
    history: Vec<HistoryEntry>,
}

impl<T: Transport> Session<T> {
    /// Creates a session that has not contacted the service yet.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            language: None,
            tokens: None,
            phase: Phase::NotStarted,
            step: 0,
            question: String::new(),
            progression: 0.0,
            proposition: None,
            history: Vec::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Session language, once started.
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Session identity, once started.
    pub fn tokens(&self) -> Option<&SessionTokens> {
        self.tokens.as_ref()
    }

    /// Answered questions, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of the current state.
    ///
    /// Before a successful start this is an empty placeholder; front ends
    /// should go through [`crate::GameEngine::state`] instead.
    pub fn snapshot(&self) -> GameState {
        let (win, finished) = match self.phase {
            Phase::NotStarted | Phase::Asking => (false, false),
            Phase::AwaitingWinConfirmation => (true, false),
            Phase::Finished(Outcome::Win) => (true, true),
            Phase::Finished(Outcome::NoWin) => (false, true),
        };
        GameState {
            question: self.question.clone(),
            step: self.step,
            progression: self.progression,
            win,
            finished,
            name_proposition: self.proposition.as_ref().map(|p| p.name().clone()),
            description_proposition: self
                .proposition
                .as_ref()
                .and_then(|p| p.description().clone()),
        }
    }

    /// Opens the session with the remote service.
    #[instrument(skip(self))]
    pub async fn start(&mut self, language: &str) -> Result<GameState, EngineError> {
        if self.phase != Phase::NotStarted {
            warn!(phase = %self.phase, "Start on a running session");
            return Err(EngineError::invalid_answer(format!(
                "cannot start: game is {}",
                self.phase
            )));
        }
        let language: Language = language.parse()?;
        info!(%language, "Starting session");

        let body = self
            .transport
            .send(Request::Start { language })
            .await
            .map_err(|e| EngineError::startup(e.to_string()))?;
        let bootstrap = decoder::decode_bootstrap(&body)?;

        self.language = Some(language);
        self.tokens = Some(bootstrap.tokens().clone());
        self.apply(bootstrap.response().clone());
        info!(phase = %self.phase, "Session started");
        Ok(self.snapshot())
    }

    /// Answers the pending question.
    ///
    /// `code` goes through [`AnswerCode`] normalization first; unknown codes
    /// are rejected without touching the network. `back` spelled as an answer
    /// code is forwarded to [`Session::back`].
    #[instrument(skip(self), fields(step = self.step))]
    pub async fn answer(&mut self, code: &str) -> Result<GameState, EngineError> {
        let answer = match code.parse::<AnswerCode>()? {
            AnswerCode::Answer(answer) => answer,
            AnswerCode::Back => return self.back().await,
            AnswerCode::Start => {
                let message = if self.phase == Phase::NotStarted {
                    "use start() to open a game".to_string()
                } else {
                    format!("cannot restart while the game is {}", self.phase)
                };
                return Err(EngineError::invalid_answer(message));
            }
        };
        self.require(Phase::Asking, "answer")?;
        let tokens = self.require_tokens()?;

        let body = self
            .transport
            .send(Request::Answer {
                tokens,
                step: self.step,
                answer,
            })
            .await
            .map_err(step_failure)?;
        let decoded = decoder::decode(&body);

        self.record(answer);
        self.step += 1;
        self.apply(decoded);
        debug!(step = self.step, phase = %self.phase, "Answer applied");
        Ok(self.snapshot())
    }

    /// Undoes the last answer.
    #[instrument(skip(self), fields(step = self.step, depth = self.history.len()))]
    pub async fn back(&mut self) -> Result<GameState, EngineError> {
        self.require(Phase::Asking, "go back")?;
        if self.history.is_empty() {
            return Err(EngineError::cannot_go_back("already at the first question"));
        }
        let tokens = self.require_tokens()?;

        let body = self
            .transport
            .send(Request::Undo {
                tokens,
                step: self.step,
            })
            .await
            .map_err(step_failure)?;
        let question = match decoder::decode(&body) {
            DecodedResponse::Question(question) => question,
            other => {
                warn!(outcome = other.tag(), "Undo did not return a question");
                return Err(EngineError::network(format!(
                    "protocol violation: undo returned a {}",
                    other.tag()
                )));
            }
        };

        if let Some(entry) = self.history.pop() {
            debug!(restored_step = entry.step(), "Popped history entry");
        }
        self.step += 1;
        self.question = question;
        Ok(self.snapshot())
    }

    /// Accepts the pending guess. Local bookkeeping only.
    #[instrument(skip(self))]
    pub fn choose(&mut self) -> Result<GameState, EngineError> {
        self.require(Phase::AwaitingWinConfirmation, "confirm a guess")?;
        self.phase = Phase::Finished(Outcome::Win);
        info!(name = ?self.proposition.as_ref().map(|p| p.name()), "Guess confirmed");
        Ok(self.snapshot())
    }

    /// Rejects the pending guess and asks the service to continue.
    #[instrument(skip(self), fields(step = self.step))]
    pub async fn exclude(&mut self) -> Result<GameState, EngineError> {
        self.require(Phase::AwaitingWinConfirmation, "reject a guess")?;
        let tokens = self.require_tokens()?;

        let body = self
            .transport
            .send(Request::Exclude {
                tokens,
                step: self.step,
            })
            .await
            .map_err(step_failure)?;
        let decoded = decoder::decode(&body);

        self.step += 1;
        self.apply(decoded);
        debug!(step = self.step, phase = %self.phase, "Guess excluded");
        Ok(self.snapshot())
    }

    fn require(&self, expected: Phase, verb: &str) -> Result<(), EngineError> {
        if self.phase == expected {
            return Ok(());
        }
        warn!(phase = %self.phase, %expected, verb, "Verb not legal in this phase");
        Err(EngineError::invalid_answer(format!(
            "cannot {} while the game is {}",
            verb, self.phase
        )))
    }

    fn require_tokens(&self) -> Result<SessionTokens, EngineError> {
        self.tokens
            .clone()
            .ok_or_else(|| EngineError::invalid_answer("no game in progress"))
    }

    fn record(&mut self, answer: Answer) {
        self.history
            .push(HistoryEntry::new(self.question.clone(), self.step, answer));
    }

    fn apply(&mut self, decoded: DecodedResponse) {
        match decoded {
            DecodedResponse::Question(question) => {
                self.question = question;
                self.progression = 0.0;
                self.proposition = None;
                self.phase = Phase::Asking;
            }
            DecodedResponse::Guess(proposition) => {
                info!(name = %proposition.name(), definitive = proposition.is_definitive(), "Service proposed a guess");
                self.question = proposition.prompt().clone();
                self.progression = GUESS_PROGRESSION;
                self.phase = if proposition.is_definitive() {
                    Phase::Finished(Outcome::Win)
                } else {
                    Phase::AwaitingWinConfirmation
                };
                self.proposition = Some(proposition);
            }
            DecodedResponse::Undecodable(text) => {
                info!("Service gave up");
                self.question = text;
                self.proposition = None;
                self.phase = Phase::Finished(Outcome::NoWin);
            }
        }
    }
}

fn step_failure(err: TransportError) -> EngineError {
    match err {
        TransportError::Timeout(detail) => EngineError::timeout(detail),
        other => EngineError::network(other.to_string()),
    }
}
