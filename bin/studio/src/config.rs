//! Studio configuration.
//!
//! Loaded via the `config` crate from `APPCANVAS_`-prefixed environment
//! variables, with `__` separating nested keys:
//!
//! ```text
//! APPCANVAS_APP_PATH=app.json
//! APPCANVAS_API__BASE_URL=https://builder.example.com/api
//! APPCANVAS_COLLAB__URL=wss://collab.example.com/rooms/42
//! ```

use appcanvas_collab::ReconnectPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Studio configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StudioConfig {
    /// Local app definition file. Takes precedence over `api`.
    pub app_path: Option<PathBuf>,

    /// Builder API to fetch the app definition from.
    pub api: Option<ApiConfig>,

    /// Interaction script to run against the preview.
    pub script_path: Option<PathBuf>,

    /// Workflow document to validate and summarize.
    pub workflow_path: Option<PathBuf>,

    /// Where the interaction export is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Simulated device; the built-in default when unset.
    pub device_id: Option<String>,

    /// Collaboration channel; disabled when unset.
    pub collab: Option<CollabConfig>,
}

/// Builder API access.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://builder.example.com/api`.
    pub base_url: String,
    /// Bearer token issued by the builder.
    pub token: String,
    /// App whose definition is fetched.
    pub app_id: String,
}

/// Collaboration channel settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CollabConfig {
    /// WebSocket URL, or NATS server URL for the NATS transport.
    pub url: String,

    /// Room to join.
    #[serde(default = "default_room")]
    pub room: String,

    #[serde(default)]
    pub transport: TransportKind,

    /// First reconnect delay; doubles per failed attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Failed attempts before the channel gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl CollabConfig {
    #[must_use]
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(Duration::from_millis(self.base_delay_ms), self.max_attempts)
    }
}

/// Which transport carries collaboration messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Websocket,
    Nats,
}

/// Where the app definition comes from.
#[derive(Debug, Clone)]
pub enum AppSource {
    File(PathBuf),
    Api(ApiConfig),
}

fn default_output_path() -> PathBuf {
    PathBuf::from("interactions.json")
}

fn default_room() -> String {
    "default".to_string()
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

impl StudioConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(None)
    }

    fn from_environment(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("APPCANVAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()
    }

    /// Resolves where the app definition is loaded from.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a file nor an API is configured.
    pub fn app_source(&self) -> Result<AppSource, config::ConfigError> {
        match (&self.app_path, &self.api) {
            (Some(path), _) => Ok(AppSource::File(path.clone())),
            (None, Some(api)) => Ok(AppSource::Api(api.clone())),
            (None, None) => Err(config::ConfigError::Message(
                "set APPCANVAS_APP_PATH or APPCANVAS_API__BASE_URL".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> StudioConfig {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StudioConfig::from_environment(Some(vars)).expect("valid config")
    }

    #[test]
    fn defaults() {
        let config = load(&[("APPCANVAS_APP_PATH", "app.json")]);
        assert_eq!(config.output_path, PathBuf::from("interactions.json"));
        assert!(config.collab.is_none());
        assert!(matches!(config.app_source(), Ok(AppSource::File(_))));
    }

    #[test]
    fn nested_collab_settings() {
        let config = load(&[
            ("APPCANVAS_APP_PATH", "app.json"),
            ("APPCANVAS_COLLAB__URL", "nats://localhost:4222"),
            ("APPCANVAS_COLLAB__TRANSPORT", "nats"),
            ("APPCANVAS_COLLAB__MAX_ATTEMPTS", "3"),
        ]);
        let collab = config.collab.expect("collab configured");
        assert_eq!(collab.transport, TransportKind::Nats);
        assert_eq!(collab.room, "default");
        let policy = collab.reconnect_policy();
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn api_source() {
        let config = load(&[
            ("APPCANVAS_API__BASE_URL", "https://builder.example.com/api"),
            ("APPCANVAS_API__TOKEN", "secret"),
            ("APPCANVAS_API__APP_ID", "app_1"),
        ]);
        match config.app_source() {
            Ok(AppSource::Api(api)) => assert_eq!(api.app_id, "app_1"),
            other => panic!("expected api source, got {other:?}"),
        }
    }

    #[test]
    fn missing_source_is_an_error() {
        let config = load(&[("APPCANVAS_OUTPUT_PATH", "out.json")]);
        assert!(config.app_source().is_err());
    }
}
