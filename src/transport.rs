//! HTTP transport to the remote guessing service.

use crate::config::{PlayerProfile, RemoteSettings};
use akin_engine::{Request, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument, warn};

const START_ENDPOINT: &str = "new_session.php";
const ANSWER_ENDPOINT: &str = "repondre_propose.php";
const UNDO_ENDPOINT: &str = "cancel_reponse.php";
const EXCLUDE_ENDPOINT: &str = "exclusion.php";

/// Talks to the remote service with plain GET requests.
///
/// The host is chosen from the language of the `Start` request and kept for
/// every later step of the same session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    remote: RemoteSettings,
    profile: PlayerProfile,
    base_url: Option<String>,
}

impl HttpTransport {
    /// Creates a transport that opens sessions with `profile`.
    pub fn new(client: reqwest::Client, remote: RemoteSettings, profile: PlayerProfile) -> Self {
        Self {
            client,
            remote,
            profile,
            base_url: None,
        }
    }

    fn url(&mut self, request: &Request) -> Result<Url, TransportError> {
        if let Request::Start { language } = request {
            self.base_url = Some(self.remote.base_url_for(*language));
        }
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| TransportError::Connection("no session opened on this transport".to_string()))?;

        let (endpoint, params) = match request {
            Request::Start { .. } => (START_ENDPOINT, self.start_params()),
            Request::Answer {
                tokens,
                step,
                answer,
            } => (
                ANSWER_ENDPOINT,
                vec![
                    ("engine", "0".to_string()),
                    ("fq", String::new()),
                    ("nqp", step.to_string()),
                    ("partie", tokens.party().clone()),
                    ("prio", "0".to_string()),
                    ("reponse", answer.wire_value().to_string()),
                    ("signature", tokens.signature().clone()),
                    ("step_prop", "-1".to_string()),
                    ("trouvitude", "0".to_string()),
                ],
            ),
            Request::Undo { tokens, step } => (
                UNDO_ENDPOINT,
                vec![
                    ("engine", "0".to_string()),
                    ("nqp", step.to_string()),
                    ("partie", tokens.party().clone()),
                    ("signature", tokens.signature().clone()),
                ],
            ),
            Request::Exclude { tokens, step } => (
                EXCLUDE_ENDPOINT,
                vec![
                    ("engine", "0".to_string()),
                    ("nqp", step.to_string()),
                    ("partie", tokens.party().clone()),
                    ("signature", tokens.signature().clone()),
                    ("step_prop", step.to_string()),
                ],
            ),
        };

        Url::parse_with_params(&format!("{}/{}", base, endpoint), &params)
            .map_err(|e| TransportError::Connection(format!("invalid service URL {:?}: {}", base, e)))
    }

    fn start_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("age", self.profile.age().to_string()),
            ("email", String::new()),
            ("engine", "0".to_string()),
            ("joueur", self.profile.name().clone()),
            ("ms", "0".to_string()),
            ("partner_id", "0".to_string()),
            ("prio", "0".to_string()),
            ("remember", "0".to_string()),
            ("sexe", self.profile.gender().to_string()),
        ]
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(request = request.tag()))]
    async fn send(&mut self, request: Request) -> Result<String, TransportError> {
        let url = self.url(&request)?;
        debug!(url = %url.path(), "Sending request to remote service");

        let response = self
            .client
            .get(url)
            .timeout(self.remote.timeout())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Remote service returned an error status");
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;
        debug!(len = body.len(), "Received response body");
        Ok(body)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}

/// Hands out one fresh [`HttpTransport`] per session, sharing a connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    client: reqwest::Client,
    remote: RemoteSettings,
    profile: PlayerProfile,
}

impl HttpTransportFactory {
    /// Creates a factory for the given service and player.
    pub fn new(remote: RemoteSettings, profile: PlayerProfile) -> Self {
        Self {
            client: reqwest::Client::new(),
            remote,
            profile,
        }
    }

    /// A transport for a new session.
    pub fn create(&self) -> HttpTransport {
        HttpTransport::new(self.client.clone(), self.remote.clone(), self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akin_engine::{Answer, Language, SessionTokens};

    fn transport() -> HttpTransport {
        let remote = RemoteSettings::new("http://{language}.example.test/", 5).unwrap();
        HttpTransport::new(reqwest::Client::new(), remote, PlayerProfile::default())
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_start_url_uses_language_host_and_profile() {
        let mut transport = transport();
        let url = transport
            .url(&Request::Start {
                language: Language::German,
            })
            .unwrap();
        assert_eq!(url.host_str(), Some("de.example.test"));
        assert_eq!(url.path(), "/new_session.php");
        assert_eq!(query(&url, "joueur").as_deref(), Some("player"));
        assert_eq!(query(&url, "age").as_deref(), Some("18"));
        assert_eq!(query(&url, "sexe").as_deref(), Some("M"));
    }

    #[test]
    fn test_answer_url_carries_tokens_and_step() {
        let mut transport = transport();
        transport
            .url(&Request::Start {
                language: Language::English,
            })
            .unwrap();
        let url = transport
            .url(&Request::Answer {
                tokens: SessionTokens::new("123", "456"),
                step: 4,
                answer: Answer::ProbablyNot,
            })
            .unwrap();
        assert_eq!(url.path(), "/repondre_propose.php");
        assert_eq!(query(&url, "partie").as_deref(), Some("123"));
        assert_eq!(query(&url, "signature").as_deref(), Some("456"));
        assert_eq!(query(&url, "nqp").as_deref(), Some("4"));
        assert_eq!(query(&url, "reponse").as_deref(), Some("4"));
        assert_eq!(query(&url, "step_prop").as_deref(), Some("-1"));
    }

    #[test]
    fn test_exclude_url_repeats_step() {
        let mut transport = transport();
        transport
            .url(&Request::Start {
                language: Language::English,
            })
            .unwrap();
        let url = transport
            .url(&Request::Exclude {
                tokens: SessionTokens::new("1", "2"),
                step: 9,
            })
            .unwrap();
        assert_eq!(url.path(), "/exclusion.php");
        assert_eq!(query(&url, "step_prop").as_deref(), Some("9"));
    }

    #[test]
    fn test_step_before_start_fails() {
        let mut transport = transport();
        let err = transport
            .url(&Request::Undo {
                tokens: SessionTokens::new("1", "2"),
                step: 1,
            })
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
