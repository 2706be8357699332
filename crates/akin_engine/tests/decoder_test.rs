//! Tests for response decoding.

use akin_engine::{DecodedResponse, ErrorKind, decode, decode_bootstrap};

const BOOTSTRAP: &str = r#"<html><body>
<div class="question">
  <script>akinator.init(123,456);</script>
  <span class="n_question">1</span>
  Is your character real?
</div>
</body></html>"#;

const QUESTION: &str = r#"<div class="question"><span class="n_question">7</span> Does your character wear a hat?</div>"#;

const GUESS: &str = r#"<div class="question">
  I think of
  <script>showProposition("https://img.example/1.jpg","x","Sherlock Holmes/detective","Detective");</script>
</div>"#;

#[test]
fn test_question_marker_yields_question() {
    assert_eq!(
        decode(QUESTION),
        DecodedResponse::Question("Does your character wear a hat?".to_string())
    );
}

#[test]
fn test_guess_literals_yield_proposition() {
    let DecodedResponse::Guess(proposition) = decode(GUESS) else {
        panic!("Expected a guess");
    };
    assert_eq!(proposition.name(), "Sherlock Holmes");
    assert_eq!(proposition.description().as_deref(), Some("Detective"));
    assert_eq!(proposition.prompt(), "I think of");
    assert!(!proposition.is_definitive());
}

#[test]
fn test_guess_without_descriptor() {
    let body = r#"<div class="question">Is it <script>p("a","b","Marie Curie")</script></div>"#;
    let DecodedResponse::Guess(proposition) = decode(body) else {
        panic!("Expected a guess");
    };
    assert_eq!(proposition.name(), "Marie Curie");
    assert_eq!(proposition.description(), &None);
}

#[test]
fn test_result_container_is_definitive() {
    let body = r#"<div class="result">Found it! <script>p("a","b","Ada Lovelace/mathematician","Mathematician")</script></div>"#;
    let DecodedResponse::Guess(proposition) = decode(body) else {
        panic!("Expected a guess");
    };
    assert_eq!(proposition.name(), "Ada Lovelace");
    assert!(proposition.is_definitive());
}

#[test]
fn test_script_with_too_few_literals_is_undecodable() {
    let body = r#"<div class="question">Hmm <script>track("a","b")</script></div>"#;
    assert_eq!(decode(body), DecodedResponse::Undecodable("Hmm".to_string()));
}

#[test]
fn test_give_up_is_undecodable() {
    let body = r#"<div class="question">I give up!</div>"#;
    assert_eq!(
        decode(body),
        DecodedResponse::Undecodable("I give up!".to_string())
    );
}

#[test]
fn test_missing_container_is_undecodable() {
    let body = "<html><body><p>Service   unavailable</p></body></html>";
    assert_eq!(
        decode(body),
        DecodedResponse::Undecodable("Service unavailable".to_string())
    );
}

#[test]
fn test_empty_body_is_undecodable() {
    assert_eq!(decode(""), DecodedResponse::Undecodable(String::new()));
}

#[test]
fn test_bootstrap_extracts_tokens() {
    let bootstrap = decode_bootstrap(BOOTSTRAP).expect("Bootstrap should decode");
    assert_eq!(bootstrap.tokens().party(), "123");
    assert_eq!(bootstrap.tokens().signature(), "456");
    assert_eq!(
        bootstrap.response(),
        &DecodedResponse::Question("Is your character real?".to_string())
    );
}

#[test]
fn test_bootstrap_marker_is_not_a_guess() {
    // The marker script sits before a guess script in the same container.
    let body = r#"<div class="question">Already? <script>init(1,2)</script><script>p("a","b","Zorro","Hero")</script></div>"#;
    let bootstrap = decode_bootstrap(body).expect("Bootstrap should decode");
    let DecodedResponse::Guess(proposition) = bootstrap.response() else {
        panic!("Expected a guess");
    };
    assert_eq!(proposition.name(), "Zorro");
}

#[test]
fn test_bootstrap_without_container_fails() {
    let err = decode_bootstrap("<p>maintenance</p>").expect_err("Should fail");
    assert_eq!(err.kind(), ErrorKind::StartupFailure);
}

#[test]
fn test_bootstrap_without_script_fails() {
    let err = decode_bootstrap(QUESTION).expect_err("Should fail");
    assert_eq!(err.kind(), ErrorKind::StartupFailure);
}

#[test]
fn test_bootstrap_malformed_marker_fails() {
    let body = r#"<div class="question"><script>init("abc")</script>Is it real?</div>"#;
    let err = decode_bootstrap(body).expect_err("Should fail");
    assert_eq!(err.kind(), ErrorKind::StartupFailure);
    assert!(err.message().contains("malformed"));
}
