//! Tests for the forwarding service router.

use akin::{AppState, router};
use akin_engine::{ScriptedTransport, Transport, TransportError};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOOTSTRAP: &str = r#"<div class="question"><script>init(123,456)</script><span class="n_question">1</span> Is your character real?</div>"#;
const GUESS: &str = r#"<div class="question">I think of <script>p("url","x","Sherlock Holmes/detective","Detective")</script></div>"#;

fn scripted_state() -> AppState {
    AppState::new(|| -> Box<dyn Transport> {
        Box::new(ScriptedTransport::new().respond(BOOTSTRAP).respond(GUESS))
    })
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .expect("Failed to build request");
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router call failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn start(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/games", Some(json!({"language": "en"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"]
        .as_str()
        .expect("Missing session id")
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let app = router(scripted_state());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_full_game_over_http() {
    let state = scripted_state();
    let app = router(state.clone());

    let (status, body) = call(&app, "POST", "/games", Some(json!({"language": "en"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"]["question"], "Is your character real?");
    assert_eq!(body["state"]["step"], 0);
    let id = body["session_id"].as_str().expect("Missing session id").to_string();
    assert_eq!(state.registry().len(), 1);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/games/{}/answer", id),
        Some(json!({"key": "yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["win"], true);
    assert_eq!(body["state"]["name_proposition"], "Sherlock Holmes");
    assert_eq!(body["state"]["description_proposition"], "Detective");

    let (status, body) = call(&app, "POST", &format!("/games/{}/choose", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["finished"], true);

    let (status, body) = call(&app, "GET", &format!("/games/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["finished"], true);
    assert_eq!(body["state"]["step"], 1);

    let (status, _) = call(&app, "DELETE", &format!("/games/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.registry().is_empty());

    let (status, body) = call(&app, "GET", &format!("/games/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"]["error"], "SessionNotFound");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = router(scripted_state());
    let (status, body) = call(&app, "POST", "/games/nope/back", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"]["error"], "SessionNotFound");
    assert!(body["detail"]["message"].as_str().is_some_and(|m| m.contains("nope")));
}

#[tokio::test]
async fn test_invalid_language_registers_nothing() {
    let state = scripted_state();
    let app = router(state.clone());
    let (status, body) = call(&app, "POST", "/games", Some(json!({"language": "klingon"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["error"], "InvalidLanguageError");
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn test_back_after_start_is_conflict() {
    let app = router(scripted_state());
    let id = start(&app).await;
    let (status, body) = call(&app, "POST", &format!("/games/{}/back", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"]["error"], "CantGoBackError");
}

#[tokio::test]
async fn test_unrecognized_answer_is_bad_request() {
    let app = router(scripted_state());
    let id = start(&app).await;
    let (status, body) = call(
        &app,
        "POST",
        &format!("/games/{}/answer", id),
        Some(json!({"key": "perhaps"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"]["error"], "InvalidAnswerError");

    let (_, body) = call(&app, "GET", &format!("/games/{}", id), None).await;
    assert_eq!(body["state"]["step"], 0);
}

#[tokio::test]
async fn test_startup_failure_is_service_unavailable() {
    let app = router(AppState::new(|| -> Box<dyn Transport> {
        Box::new(ScriptedTransport::new().fail(TransportError::Connection("refused".to_string())))
    }));
    let (status, body) = call(&app, "POST", "/games", Some(json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"]["error"], "StartupError");
}
