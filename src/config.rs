//! Configuration types for skritter-export

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Property holding the user's API access token
pub const BEARER_TOKEN_PROPERTY: &str = "Bearer-Token";

/// Environment variable consulted when no properties file supplies a token
pub const BEARER_TOKEN_ENV: &str = "SKRITTER_BEARER_TOKEN";

/// Properties file looked up in the working directory by default
pub const DEFAULT_PROPERTIES_FILE: &str = "skritter.properties";

/// Remote service settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API (default: "https://skritter.com/api/v0")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    ///
    /// Required: building a client without it fails before any network call.
    #[serde(default, skip_serializing)]
    pub bearer_token: Option<String>,

    /// Per-request HTTP timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
            request_timeout: default_request_timeout(),
        }
    }
}

/// How the chunks of a large request set are driven
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChunkStrategy {
    /// One full submit/poll/fetch cycle per chunk, one chunk at a time (default)
    #[default]
    Sequential,
}

/// Batch job settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Polling budget per batch job (default: 180 seconds)
    #[serde(default = "default_batch_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Fixed delay between status polls (default: 250 ms)
    #[serde(default = "default_poll_interval", with = "duration_millis_serde")]
    pub poll_interval: Duration,

    /// Maximum ids per vocab lookup job (default: 100)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk iteration strategy
    #[serde(default)]
    pub chunk_strategy: ChunkStrategy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            timeout: default_batch_timeout(),
            poll_interval: default_poll_interval(),
            chunk_size: default_chunk_size(),
            chunk_strategy: ChunkStrategy::default(),
        }
    }
}

impl BatchConfig {
    /// Number of status reads allowed before a job is declared timed out
    ///
    /// `floor(timeout / poll_interval)`, never less than one read.
    pub fn max_polls(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        let polls = self.timeout.as_millis() / interval;
        u64::try_from(polls).unwrap_or(u64::MAX).max(1)
    }
}

/// Import file flavor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStyle {
    /// Anki "Chinese-Basic" import with a header and tone-marked pinyin (default)
    #[default]
    Anki,
    /// Skritter-style list with numbered pinyin
    Skritter,
}

impl ExportStyle {
    /// File name prefix of this style's output
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ExportStyle::Anki => "anki_import",
            ExportStyle::Skritter => "skritter_export",
        }
    }
}

/// Output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Import file flavor
    #[serde(default)]
    pub style: ExportStyle,

    /// Directory the import file is written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            style: ExportStyle::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration
///
/// - [`api`](ApiConfig) - endpoint, credentials, HTTP timeout
/// - [`batch`](BatchConfig) - polling budget and chunking
/// - [`export`](ExportConfig) - output flavor and location
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Batch job settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Output settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("cannot read config file {}: {}", path.display(), e),
                "config",
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::config(
                format!("invalid config file {}: {}", path.display(), e),
                "config",
            )
        })
    }

    /// Check settings that would otherwise fail deep inside an export
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::config(
                format!("invalid base URL '{}': {}", self.api.base_url, e),
                "base_url",
            )
        })?;

        if self.batch.chunk_size == 0 {
            return Err(Error::config("chunk size must be at least 1", "chunk_size"));
        }

        if self.batch.poll_interval.is_zero() {
            return Err(Error::config(
                "poll interval must be greater than zero",
                "poll_interval",
            ));
        }

        Ok(())
    }
}

/// Parse Java-style `key=value` / `key: value` properties
///
/// Blank lines and lines starting with `#` or `!` are ignored. The key ends
/// at the first `=` or `:`.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(['=', ':'])?;
            let (key, value) = line.split_at(split);
            Some((key.trim().to_string(), value[1..].trim().to_string()))
        })
        .collect()
}

/// Read a properties file
pub fn load_properties(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(
            format!(
                "Required properties file {} cannot be read: {}",
                path.display(),
                e
            ),
            "properties",
        )
    })?;
    Ok(parse_properties(&content))
}

/// Find the bearer token
///
/// An explicitly named properties file must be readable. Otherwise the
/// default properties file is used when present, then the
/// `SKRITTER_BEARER_TOKEN` environment variable. Returns `None` when no
/// source has a token; the client rejects that at construction.
pub fn resolve_bearer_token(properties_file: Option<&Path>) -> Result<Option<String>> {
    let properties = match properties_file {
        Some(path) => Some(load_properties(path)?),
        None => {
            let default_path = Path::new(DEFAULT_PROPERTIES_FILE);
            if default_path.exists() {
                Some(load_properties(default_path)?)
            } else {
                None
            }
        }
    };

    if let Some(token) = properties
        .as_ref()
        .and_then(|p| p.get(BEARER_TOKEN_PROPERTY))
        .filter(|t| !t.is_empty())
    {
        return Ok(Some(token.clone()));
    }

    Ok(std::env::var(BEARER_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
}

fn default_base_url() -> String {
    "https://skritter.com/api/v0".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_batch_timeout() -> Duration {
    Duration::from_secs(180)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_chunk_size() -> usize {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://skritter.com/api/v0");
        assert_eq!(config.batch.timeout, Duration::from_secs(180));
        assert_eq!(config.batch.poll_interval, Duration::from_millis(250));
        assert_eq!(config.batch.chunk_size, 100);
        assert_eq!(config.batch.chunk_strategy, ChunkStrategy::Sequential);
        assert_eq!(config.export.style, ExportStyle::Anki);
        config.validate().unwrap();
    }

    #[test]
    fn test_max_polls_is_floor_of_budget_over_interval() {
        let mut batch = BatchConfig::default();
        assert_eq!(batch.max_polls(), 720);

        batch.timeout = Duration::from_secs(1);
        assert_eq!(batch.max_polls(), 4);

        batch.timeout = Duration::from_millis(1100);
        assert_eq!(batch.max_polls(), 4);

        batch.timeout = Duration::ZERO;
        assert_eq!(batch.max_polls(), 1, "at least one status read");
    }

    #[test]
    fn test_json_config_uses_defaults_for_missing_fields() {
        let config: Config = serde_json::from_str(
            r#"{"batch": {"timeout": 5, "poll_interval": 10}, "export": {"style": "skritter"}}"#,
        )
        .unwrap();
        assert_eq!(config.batch.timeout, Duration::from_secs(5));
        assert_eq!(config.batch.poll_interval, Duration::from_millis(10));
        assert_eq!(config.batch.chunk_size, 100);
        assert_eq!(config.export.style, ExportStyle::Skritter);
        assert_eq!(config.api.base_url, "https://skritter.com/api/v0");
    }

    #[test]
    fn test_bearer_token_is_never_serialized() {
        let mut config = Config::default();
        config.api.bearer_token = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.batch.chunk_size = 0;
        match config.validate().unwrap_err() {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("chunk_size")),
            other => panic!("expected config error, got {other:?}"),
        }

        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = Config::default();
        config.batch.poll_interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_parse_properties() {
        let props = parse_properties(
            "# Skritter credentials\n\
             ! legacy comment\n\
             \n\
             Bearer-Token = abc123\n\
             other: value with spaces \n\
             url=https://skritter.com/api/v0\n",
        );
        assert_eq!(props.get("Bearer-Token").map(String::as_str), Some("abc123"));
        assert_eq!(props.get("other").map(String::as_str), Some("value with spaces"));
        assert_eq!(
            props.get("url").map(String::as_str),
            Some("https://skritter.com/api/v0")
        );
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn test_resolve_token_from_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Bearer-Token=from-file").unwrap();
        let token = resolve_bearer_token(Some(file.path())).unwrap();
        assert_eq!(token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_named_properties_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("skritter.properties");
        let err = resolve_bearer_token(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("cannot be read"), "{err}");
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.batch.chunk_size = 25;
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_json_file(&path).unwrap();
        assert_eq!(loaded.batch.chunk_size, 25);
        assert!(Config::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
