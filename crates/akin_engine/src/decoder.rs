//! Response decoder for the remote service's markup.
//!
//! The remote service answers every step with an HTML fragment whose shape is
//! not a stable schema. This module is the only place that knows about that
//! shape. Decoding is total: any body yields a [`DecodedResponse`], and
//! [`DecodedResponse::Undecodable`] covers both "the service gave up" and
//! "the markup changed under us".
//!
//! Only the bootstrap response can fail, because without session tokens there
//! is no session to continue.

use crate::error::EngineError;
use derive_getters::Getters;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

static TOKEN_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+),(\d+)").expect("token pattern is valid"));

static QUOTED_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("literal pattern is valid"));

/// Opaque session identity issued by the remote service at start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
pub struct SessionTokens {
    /// The `partie` token.
    party: String,
    /// The `signature` token.
    signature: String,
}

impl SessionTokens {
    /// Creates a token pair.
    pub fn new(party: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            signature: signature.into(),
        }
    }
}

/// A candidate character proposed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Proposition {
    /// Container text shown alongside the guess.
    prompt: String,
    /// Candidate name, truncated at the first `/`.
    name: String,
    /// Candidate descriptor (occupation), when the service sent one.
    description: Option<String>,
    #[getter(skip)]
    definitive: bool,
}

impl Proposition {
    /// Creates a proposition.
    pub fn new(
        prompt: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        definitive: bool,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            name: name.into(),
            description,
            definitive,
        }
    }

    /// The service marked this guess as its final answer.
    pub fn is_definitive(&self) -> bool {
        self.definitive
    }
}

/// Classification of one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResponse {
    /// The next question.
    Question(String),
    /// A character guess.
    Guess(Proposition),
    /// Nothing recognizable; the service is lost or the markup is unexpected.
    Undecodable(String),
}

impl DecodedResponse {
    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            DecodedResponse::Question(_) => "question",
            DecodedResponse::Guess(_) => "guess",
            DecodedResponse::Undecodable(_) => "undecodable",
        }
    }
}

/// Result of decoding the bootstrap response.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Bootstrap {
    /// Session identity.
    tokens: SessionTokens,
    /// The first prompt.
    response: DecodedResponse,
}

/// Decodes a steady-state response body.
#[instrument(skip(body), fields(len = body.len()))]
pub fn decode(body: &str) -> DecodedResponse {
    let document = Html::parse_document(body);
    let decoded = match find_container(&document) {
        Some(container) => classify(container, None),
        None => {
            warn!("No question container in response");
            DecodedResponse::Undecodable(collapse_whitespace(
                &document.root_element().text().collect::<String>(),
            ))
        }
    };
    debug!(outcome = decoded.tag(), "Decoded response");
    decoded
}

/// Decodes the bootstrap response, extracting the session tokens.
///
/// Fails with [`crate::ErrorKind::StartupFailure`] when the container or the
/// token marker is missing.
#[instrument(skip(body), fields(len = body.len()))]
pub fn decode_bootstrap(body: &str) -> Result<Bootstrap, EngineError> {
    let document = Html::parse_document(body);
    let container = find_container(&document)
        .ok_or_else(|| EngineError::startup("bootstrap response has no question container"))?;

    let marker = scripts(container)
        .next()
        .ok_or_else(|| EngineError::startup("bootstrap response has no session marker"))?;
    let marker_text: String = marker.text().collect();
    let captures = TOKEN_PAIR.captures(&marker_text).ok_or_else(|| {
        EngineError::startup(format!("malformed session marker {:?}", marker_text.trim()))
    })?;
    let tokens = SessionTokens::new(&captures[1], &captures[2]);
    debug!(party = %tokens.party, "Session tokens issued");

    let response = classify(container, Some(marker));
    debug!(outcome = response.tag(), "Decoded bootstrap response");
    Ok(Bootstrap { tokens, response })
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div"
                && el.value().classes().any(|c| c == "question" || c == "result")
        })
}

fn scripts<'a>(container: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "script")
}

fn is_question_marker(el: &ElementRef<'_>) -> bool {
    el.value().name() == "span" && el.value().classes().any(|c| c == "n_question")
}

fn classify(container: ElementRef<'_>, bootstrap_marker: Option<ElementRef<'_>>) -> DecodedResponse {
    let text = container_text(container);

    if container
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| is_question_marker(&el))
    {
        return DecodedResponse::Question(text);
    }

    let definitive = container.value().classes().any(|c| c == "result");
    for script in scripts(container) {
        if bootstrap_marker.is_some_and(|marker| marker.id() == script.id()) {
            continue;
        }
        let source: String = script.text().collect();
        let literals: Vec<&str> = QUOTED_LITERAL
            .captures_iter(&source)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if literals.len() < 3 {
            continue;
        }
        let name = literals[2].split('/').next().unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }
        let description = literals
            .get(3)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        return DecodedResponse::Guess(Proposition::new(text, name, description, definitive));
    }

    DecodedResponse::Undecodable(text)
}

/// Container text without scripts or the question-index marker.
fn container_text(container: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(container, &mut raw);
    collapse_whitespace(&raw)
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if child_el.value().name() == "script" || is_question_marker(&child_el) {
                continue;
            }
            push_visible_text(child_el, out);
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
