//! Background task that owns the engine.
//!
//! The UI never awaits the engine itself. It sends a [`Verb`] and picks the
//! [`Reply`] up on a later frame, so the screen keeps redrawing while the
//! remote service thinks.

use super::app::{Reply, Verb};
use akin::GameEngine;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Spawns the worker. `make_engine` supplies a fresh engine for every `Start`.
pub fn spawn<F>(make_engine: F) -> (mpsc::UnboundedSender<Verb>, mpsc::UnboundedReceiver<Reply>)
where
    F: Fn() -> Box<dyn GameEngine> + Send + 'static,
{
    let (verb_tx, verb_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    tokio::spawn(run(make_engine, verb_rx, reply_tx));
    (verb_tx, reply_rx)
}

#[instrument(skip_all)]
async fn run<F>(
    make_engine: F,
    mut verbs: mpsc::UnboundedReceiver<Verb>,
    replies: mpsc::UnboundedSender<Reply>,
) where
    F: Fn() -> Box<dyn GameEngine> + Send + 'static,
{
    let mut engine = make_engine();
    while let Some(verb) = verbs.recv().await {
        debug!(?verb, "Running verb");
        let result = match &verb {
            Verb::Start(language) => {
                engine = make_engine();
                engine.start(language).await
            }
            Verb::Answer(answer) => engine.answer(&answer.key().to_string()).await,
            Verb::Back => engine.back().await,
            Verb::Choose => engine.choose().await,
            Verb::Exclude => engine.exclude().await,
        };
        if replies.send(Reply { verb, result }).is_err() {
            break;
        }
    }
    info!("Engine worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use akin::{Answer, Phase};
    use akin_engine::{ScriptedTransport, Session};

    fn scripted() -> Box<dyn GameEngine> {
        let transport = ScriptedTransport::new()
            .respond(
                r#"<div class="question"><script>init(7,8)</script><span class="n_question">1</span> Q1</div>"#,
            )
            .respond(r#"<div class="question"><span class="n_question">2</span> Q2</div>"#);
        Box::new(Session::new(transport))
    }

    #[tokio::test]
    async fn test_worker_runs_verbs_in_order() {
        let (verbs, mut replies) = spawn(scripted);
        verbs.send(Verb::Start("en".to_string())).unwrap();
        verbs.send(Verb::Answer(Answer::Probably)).unwrap();

        let first = replies.recv().await.unwrap();
        assert_eq!(first.verb, Verb::Start("en".to_string()));
        assert_eq!(first.result.unwrap().question, "Q1");

        let second = replies.recv().await.unwrap();
        let state = second.result.unwrap();
        assert_eq!(state.question, "Q2");
        assert_eq!(state.phase(), Phase::Asking);
    }

    #[tokio::test]
    async fn test_restart_uses_a_fresh_engine() {
        let (verbs, mut replies) = spawn(scripted);
        verbs.send(Verb::Start("en".to_string())).unwrap();
        verbs.send(Verb::Start("en".to_string())).unwrap();

        for _ in 0..2 {
            let reply = replies.recv().await.unwrap();
            assert_eq!(reply.result.unwrap().step, 0);
        }
    }
}
