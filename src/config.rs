//! Configuration file and player profile.

use akin_engine::Language;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Placeholder in [`RemoteSettings::base_url`] replaced by the language code.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Youngest accepted player age, exclusive.
const MIN_AGE_EXCLUSIVE: u32 = 8;

/// Top-level configuration, usually read from `akin.toml`.
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AkinConfig {
    /// Remote guessing service.
    remote: RemoteSettings,
    /// Profile sent when a session opens.
    player: PlayerProfile,
    /// Forwarding service bind address.
    server: ServerSettings,
    /// Front-end defaults.
    client: ClientSettings,
}

impl AkinConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration text.
    #[instrument(skip(content), fields(len = content.len()))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.player.validate()?;
        config.remote.validate()?;
        info!(
            player = %config.player.name,
            base_url = %config.remote.base_url,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the player profile.
    pub fn with_player(mut self, player: PlayerProfile) -> Self {
        self.player = player;
        self
    }

    /// Replaces the remote settings.
    pub fn with_remote(mut self, remote: RemoteSettings) -> Self {
        self.remote = remote;
        self
    }

    /// Overrides the server bind address where given.
    pub fn with_server_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}

/// Where the remote guessing service lives.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// URL template; `{language}` is replaced by the language code.
    base_url: String,
    /// Per-request timeout in seconds.
    timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: format!("http://{}.akinator.com", LANGUAGE_PLACEHOLDER),
            timeout_secs: 30,
        }
    }
}

impl RemoteSettings {
    /// Creates remote settings.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ConfigError> {
        let settings = Self {
            base_url: base_url.into(),
            timeout_secs,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Base URL for one language.
    pub fn base_url_for(&self, language: Language) -> String {
        self.base_url
            .replace(LANGUAGE_PLACEHOLDER, language.code())
            .trim_end_matches('/')
            .to_string()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::new("remote.timeout_secs must be positive".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::new("remote.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Player gender as the remote service expects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    #[default]
    #[serde(alias = "m")]
    M,
    /// Female.
    #[serde(alias = "f")]
    F,
}

/// Profile sent with the bootstrap request.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    /// Display name.
    name: String,
    /// Age in years; must be over 8.
    age: u32,
    /// `M` or `F`.
    gender: Gender,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: "player".to_string(),
            age: 18,
            gender: Gender::M,
        }
    }
}

impl PlayerProfile {
    /// Creates a validated profile.
    #[instrument(skip(name), fields(name = %name.as_ref()))]
    pub fn new(name: impl AsRef<str>, age: u32, gender: Gender) -> Result<Self, ConfigError> {
        let profile = Self {
            name: name.as_ref().to_string(),
            age,
            gender,
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.age <= MIN_AGE_EXCLUSIVE {
            return Err(ConfigError::new(format!(
                "player.age must be over {}, got {}",
                MIN_AGE_EXCLUSIVE, self.age
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::new("player.name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Bind address of the forwarding service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    host: String,
    /// Port to bind to.
    port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Front-end defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Forwarding service to play through instead of the local engine.
    engine_url: Option<String>,
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
