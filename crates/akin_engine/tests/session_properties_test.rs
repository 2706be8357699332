//! Generated verb sequences against a scripted service.
//!
//! Whatever the service replies and whatever the player types, the step
//! counter never goes down, a finished game stays finished, and a failed verb
//! leaves the snapshot exactly as it was.

use akin_engine::{ScriptedTransport, Session, TransportError};
use proptest::prelude::*;

const BOOTSTRAP: &str = r#"<div class="question"><script>akinator.init(123,456);</script><span class="n_question">1</span> Is your character real?</div>"#;

/// What the scripted service answers to the next request.
#[derive(Debug, Clone)]
enum Reply {
    Question,
    Guess,
    FinalGuess,
    GiveUp,
    Timeout,
    Refused,
}

/// What the player does next.
#[derive(Debug, Clone)]
enum Move {
    Answer(&'static str),
    Unknown(&'static str),
    Back,
    Choose,
    Exclude,
    Restart,
}

fn reply_strategy() -> impl Strategy<Value = Reply> {
    prop_oneof![
        4 => Just(Reply::Question),
        2 => Just(Reply::Guess),
        1 => Just(Reply::FinalGuess),
        1 => Just(Reply::GiveUp),
        1 => Just(Reply::Timeout),
        1 => Just(Reply::Refused),
    ]
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop_oneof![
        4 => prop::sample::select(vec!["y", "n", "?", "+", "-", "yes", "probably not"]).prop_map(Move::Answer),
        2 => prop::sample::select(vec!["maybe", "yse", "", "5", "x", "nope"]).prop_map(Move::Unknown),
        2 => Just(Move::Back),
        1 => Just(Move::Choose),
        2 => Just(Move::Exclude),
        1 => Just(Move::Restart),
    ]
}

fn script(replies: &[Reply]) -> ScriptedTransport {
    replies
        .iter()
        .enumerate()
        .fold(ScriptedTransport::new().respond(BOOTSTRAP), |transport, (n, reply)| match reply {
            Reply::Question => transport.respond(format!(
                r#"<div class="question"><span class="n_question">{}</span> Question {}?</div>"#,
                n + 2,
                n + 2
            )),
            Reply::Guess => transport.respond(
                r#"<div class="question">I think of <script>p("a","b","Zorro/hero","Hero")</script></div>"#,
            ),
            Reply::FinalGuess => transport.respond(
                r#"<div class="result">Found it! <script>p("a","b","Ada Lovelace","Mathematician")</script></div>"#,
            ),
            Reply::GiveUp => transport.respond("<p>I give up</p>"),
            Reply::Timeout => transport.fail(TransportError::Timeout("30s elapsed".to_string())),
            Reply::Refused => transport.fail(TransportError::Connection("refused".to_string())),
        })
}

async fn play(replies: Vec<Reply>, moves: Vec<Move>) -> Result<(), TestCaseError> {
    let mut session = Session::new(script(&replies));
    let mut before = session
        .start("en")
        .await
        .map_err(|e| TestCaseError::fail(format!("start failed: {}", e)))?;

    for step in &moves {
        let sent = session.transport().sent().len();
        let result = match step {
            Move::Answer(code) | Move::Unknown(code) => session.answer(code).await,
            Move::Back => session.back().await,
            Move::Choose => session.choose(),
            Move::Exclude => session.exclude().await,
            Move::Restart => session.start("en").await,
        };
        let after = session.snapshot();

        prop_assert!(after.step >= before.step, "step went from {} to {} on {:?}", before.step, after.step, step);
        if before.finished {
            prop_assert!(after.finished, "{:?} reopened a finished game", step);
            prop_assert!(result.is_err());
        }
        if let Move::Unknown(code) = step {
            prop_assert!(result.is_err(), "{:?} was accepted", code);
            prop_assert_eq!(session.transport().sent().len(), sent);
        }
        if result.is_err() {
            prop_assert_eq!(&after, &before);
        }
        before = after;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_invariants_hold_for_any_verb_sequence(
        replies in prop::collection::vec(reply_strategy(), 0..24),
        moves in prop::collection::vec(move_strategy(), 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime");
        runtime.block_on(play(replies, moves))?;
    }
}
