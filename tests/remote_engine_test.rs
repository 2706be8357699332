//! Tests for the remote client against a live forwarding service.

use akin::{AppState, ErrorKind, GameEngine, Phase, RemoteEngine, router};
use akin_engine::{ScriptedTransport, Session, Transport};
use tokio::net::TcpListener;

const BOOTSTRAP: &str = r#"<div class="question"><script>init(123,456)</script><span class="n_question">1</span> Is your character real?</div>"#;
const QUESTION: &str = r#"<div class="question"><span class="n_question">2</span> Is your character a man?</div>"#;
const GUESS: &str = r#"<div class="question">I think of <script>p("url","x","Sherlock Holmes/detective","Detective")</script></div>"#;

fn script() -> ScriptedTransport {
    ScriptedTransport::new()
        .respond(BOOTSTRAP)
        .respond(QUESTION)
        .respond(GUESS)
}

/// Serves a scripted router on an ephemeral port.
async fn spawn_server() -> (String, AppState) {
    let state = AppState::new(|| -> Box<dyn Transport> { Box::new(script()) });
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn test_remote_game_matches_local_game() {
    let (url, _state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    let mut local = Session::new(script());

    let engines: [&mut dyn GameEngine; 2] = [&mut remote, &mut local];
    let mut finals = Vec::new();
    for engine in engines {
        engine.start("en").await.expect("Start failed");
        engine.answer("y").await.expect("Answer failed");
        let guess = engine.answer("n").await.expect("Answer failed");
        assert_eq!(guess.phase(), Phase::AwaitingWinConfirmation);
        assert_eq!(guess.name_proposition.as_deref(), Some("Sherlock Holmes"));
        finals.push(engine.choose().await.expect("Choose failed"));
    }
    assert_eq!(finals[0], finals[1]);
}

#[tokio::test]
async fn test_remote_errors_keep_kind_and_message() {
    let (url, _state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    let mut local = Session::new(script());

    remote.start("en").await.expect("Start failed");
    local.start("en").await.expect("Start failed");

    let remote_err = remote.back().await.expect_err("Back should fail");
    let local_err = local.back().await.expect_err("Back should fail");
    assert_eq!(remote_err.kind(), ErrorKind::CannotGoBack);
    assert_eq!(remote_err, local_err);

    let remote_err = remote.answer("perhaps").await.expect_err("Answer should fail");
    let local_err = local.answer("perhaps").await.expect_err("Answer should fail");
    assert_eq!(remote_err, local_err);
}

#[tokio::test]
async fn test_remote_invalid_language() {
    let (url, state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    let err = remote.start("klingon").await.expect_err("Start should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidLanguage);
    assert!(remote.session_id().is_none());
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn test_remote_session_not_found_after_server_drops_it() {
    let (url, state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    remote.start("en").await.expect("Start failed");
    let id = remote.session_id().expect("No session id").to_string();
    state.registry().remove(&id).expect("Remove failed");

    let err = remote.answer("y").await.expect_err("Answer should fail");
    assert_eq!(err.kind(), ErrorKind::SessionNotFound);
}

#[tokio::test]
async fn test_remote_discard() {
    let (url, state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    remote.start("en").await.expect("Start failed");
    assert_eq!(state.registry().len(), 1);

    remote.discard().await.expect("Discard failed");
    assert!(remote.session_id().is_none());
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn test_remote_state_reflects_last_verb() {
    let (url, _state) = spawn_server().await;
    let mut remote = RemoteEngine::new(url);
    remote.start("en").await.expect("Start failed");
    let answered = remote.answer("+").await.expect("Answer failed");
    assert_eq!(remote.state().await.expect("State failed"), answered);
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);

    let mut remote = RemoteEngine::new(format!("http://{}", addr));
    let err = remote.start("en").await.expect_err("Start should fail");
    assert_eq!(err.kind(), ErrorKind::Network);
}
