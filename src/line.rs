//! Line-oriented front end: one prompt per question.

use crate::cli::GameArgs;
use akin::{Answer, AnswerCode, Backend, ErrorKind, GameEngine, GameState, Outcome, Phase};
use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

const CONFIRM_PROMPT: &str = "Am I right? [y]es / [n]o: ";

/// Plays one game on stdin/stdout.
#[instrument(skip(backend))]
pub async fn run(backend: &Backend, args: &GameArgs) -> Result<()> {
    println!("Think of a real or fictional character. I will try to guess who it is.");
    println!("{}", legend());
    println!();

    let (mut engine, mut state) = start(backend, &args.language).await?;
    let mut editor = DefaultEditor::new()?;
    let mut number = 1u32;

    loop {
        match state.phase() {
            Phase::Asking => {
                let Some(line) = read(&mut editor, &question_prompt(number, &state.question))? else {
                    return Ok(());
                };
                let going_back = matches!(line.parse::<AnswerCode>(), Ok(AnswerCode::Back));
                match engine.answer(&line).await {
                    Ok(next) => {
                        number = if going_back { number.saturating_sub(1).max(1) } else { number + 1 };
                        state = next;
                        if args.debug {
                            println!("{}", debug_line(&state));
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::CannotGoBack => {
                        println!("You are already at the first question.");
                    }
                    Err(e) if e.kind() == ErrorKind::InvalidAnswer => {
                        println!("{}", e.message());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Phase::AwaitingWinConfirmation => {
                println!("{}", guess_line(&state));
                let Some(line) = read(&mut editor, CONFIRM_PROMPT)? else {
                    return Ok(());
                };
                state = match confirmation(&line) {
                    Some(true) => engine.choose().await?,
                    Some(false) => engine.exclude().await?,
                    None => {
                        println!("Please answer y or n.");
                        continue;
                    }
                };
            }
            Phase::Finished(Outcome::Win) => {
                println!("Great, guessed right one more time!");
                if let Some(name) = &state.name_proposition {
                    println!("You were thinking of {}.", name);
                }
                return Ok(());
            }
            Phase::Finished(Outcome::NoWin) => {
                println!("I give up! Good game.");
                return Ok(());
            }
            Phase::NotStarted => return Err(anyhow!("engine reported a game that never started")),
        }
    }
}

/// Starts a game, retrying in English when the language is not served.
async fn start(backend: &Backend, language: &str) -> Result<(Box<dyn GameEngine>, GameState)> {
    let mut engine = backend.engine();
    match engine.start(language).await {
        Ok(state) => Ok((engine, state)),
        Err(e) if e.kind() == ErrorKind::InvalidLanguage => {
            warn!(language, "Language not served, falling back to English");
            println!("{}. Playing in English instead.", e.message());
            let mut engine = backend.engine();
            let state = engine.start("en").await?;
            Ok((engine, state))
        }
        Err(e) => Err(e.into()),
    }
}

/// `None` when the player pressed Ctrl-C or Ctrl-D.
fn read(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => {
            let _ = editor.add_history_entry(line.as_str());
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            info!("Player left the game");
            println!();
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// `Some(true)` for yes, `Some(false)` for no, `None` for anything else.
fn confirmation(line: &str) -> Option<bool> {
    match line.parse::<AnswerCode>() {
        Ok(AnswerCode::Answer(Answer::Yes)) => Some(true),
        Ok(AnswerCode::Answer(Answer::No)) => Some(false),
        _ => None,
    }
}

fn legend() -> String {
    let answers: Vec<String> = Answer::iter()
        .map(|answer| format!("{} = {}", answer.key(), answer))
        .collect();
    format!("Answers: {}, b = Back", answers.join(", "))
}

fn question_prompt(number: u32, question: &str) -> String {
    format!("{}. {} ", number, question)
}

fn guess_line(state: &GameState) -> String {
    let name = state.name_proposition.as_deref().unwrap_or("someone");
    match &state.description_proposition {
        Some(description) => format!("It's {} ({})!", name, description),
        None => format!("It's {}!", name),
    }
}

fn debug_line(state: &GameState) -> String {
    format!("[step {}, progression {:.1}]", state.step, state.progression)
}
