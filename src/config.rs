//! Application-level configuration loading: environment, identity header, audio and templates.

use std::{env, fmt, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::audio::VoiceProfile;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BLIND_TIMER_CONFIG_PATH";
/// Header set by the upstream identity proxy when none is configured.
pub const DEFAULT_USER_HEADER: &str = "x-authenticated-user";
const DEFAULT_PORT: u16 = 8080;

/// Deployment flavour, toggling development conveniences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: development user and template hot-reload.
    #[default]
    Development,
    /// Deployed behind the identity proxy.
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
        })
    }
}

/// Where the authenticated user id comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Trusted request header carrying the user id.
    pub user_header: String,
    /// User assumed when the header is absent, honoured only in development.
    pub dev_user: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_header: DEFAULT_USER_HEADER.into(),
            dev_user: None,
        }
    }
}

/// Speech synthesis and cue cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory holding synthesized cue clips.
    pub cache_dir: PathBuf,
    /// Text-to-speech endpoint; synthesis fails while unset.
    pub speech_endpoint: Option<String>,
    /// Voice used for every cue.
    pub voice: VoiceProfile,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("var/audio-cache"),
            speech_endpoint: None,
            voice: VoiceProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Deployment flavour.
    pub environment: Environment,
    /// Where the authenticated user comes from.
    pub identity: IdentityConfig,
    /// Speech synthesis and cue cache.
    pub audio: AudioConfig,
    /// Template directory read by the development hot-reload.
    pub templates_dir: PathBuf,
    /// Listening port, from `PORT` or `SERVER_PORT` only.
    #[serde(skip)]
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            identity: IdentityConfig::default(),
            audio: AudioConfig::default(),
            templates_dir: PathBuf::from("templates"),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk and the process environment, falling back to defaults.
    pub fn load() -> Self {
        Self::load_file().with_overrides(|var| env::var(var).ok())
    }

    /// Parse a JSON configuration document.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let mut config = serde_json::from_str::<Self>(contents)?;
        config.port = DEFAULT_PORT;
        Ok(config)
    }

    /// Whether development conveniences are enabled.
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        environment = %config.environment,
                        "loaded configuration file"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `APP_ENV` and `PORT`/`SERVER_PORT` on top of the file values.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("APP_ENV") {
            match raw.parse() {
                Ok(environment) => self.environment = environment,
                Err(err) => warn!(error = %err, "ignoring APP_ENV"),
            }
        }

        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }

        self
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config = AppConfig::parse(
            r#"{
                "environment": "production",
                "identity": { "user_header": "x-forwarded-user" },
                "audio": { "speech_endpoint": "http://tts.local/speak" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.identity.user_header, "x-forwarded-user");
        assert_eq!(config.identity.dev_user, None);
        assert_eq!(
            config.audio.speech_endpoint.as_deref(),
            Some("http://tts.local/speak")
        );
        assert_eq!(config.audio.voice, VoiceProfile::default());
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn unknown_environment_fails_to_parse() {
        assert!(AppConfig::parse(r#"{ "environment": "staging" }"#).is_err());
    }

    #[test]
    fn environment_variables_override_the_file() {
        let config = AppConfig::default().with_overrides(env_of(&[
            ("APP_ENV", "prod"),
            ("SERVER_PORT", "9090"),
        ]));
        assert!(!config.is_development());
        assert_eq!(config.port, 9090);

        let config = AppConfig::default().with_overrides(env_of(&[
            ("APP_ENV", "nonsense"),
            ("PORT", "7000"),
            ("SERVER_PORT", "9090"),
        ]));
        assert!(config.is_development());
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn invalid_port_keeps_the_default() {
        let config = AppConfig::default().with_overrides(env_of(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
