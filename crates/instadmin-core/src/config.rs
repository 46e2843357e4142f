//! Configuration management for the instadmin client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Dashboard refresh configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Versioned path prefix every endpoint lives under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File the bearer token is persisted to
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    /// Route the user is sent to when the session expires
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

/// Dashboard refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Refetch interval for dashboard statistics, in seconds
    #[serde(default = "default_stats_refresh")]
    pub stats_refresh_secs: u64,

    /// Refetch interval for the account list, in seconds
    #[serde(default = "default_accounts_refresh")]
    pub accounts_refresh_secs: u64,

    /// How long a cached response is considered fresh, in seconds
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("instadmin/{}", env!("CARGO_PKG_VERSION"))
}

fn default_token_file() -> PathBuf {
    directories::ProjectDirs::from("com", "instadmin", "instadmin").map_or_else(
        || PathBuf::from(".instadmin").join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

fn default_login_route() -> String {
    "/login".to_string()
}

const fn default_stats_refresh() -> u64 {
    30
}

const fn default_accounts_refresh() -> u64 {
    60
}

const fn default_stale_time() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Root URL every endpoint path is appended to
    #[must_use]
    pub fn root_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
            login_route: default_login_route(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stats_refresh_secs: default_stats_refresh(),
            accounts_refresh_secs: default_accounts_refresh(),
            stale_time_secs: default_stale_time(),
        }
    }
}

impl DashboardConfig {
    /// Stats refetch interval
    #[must_use]
    pub const fn stats_refresh(&self) -> Duration {
        Duration::from_secs(self.stats_refresh_secs)
    }

    /// Accounts refetch interval
    #[must_use]
    pub const fn accounts_refresh(&self) -> Duration {
        Duration::from_secs(self.accounts_refresh_secs)
    }

    /// Freshness window for cached responses
    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `instadmin.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::build(config::File::with_name("instadmin").required(false))
    }

    /// Load configuration from an explicit file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or configuration cannot be parsed.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> crate::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("INSTADMIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.api_prefix, "/api/v1");
        assert_eq!(config.api.request_timeout, 30);
        assert!(config.api.user_agent.starts_with("instadmin/"));

        assert!(config.session.token_file.ends_with("session.json"));
        assert_eq!(config.session.login_route, "/login");

        assert_eq!(config.dashboard.stats_refresh_secs, 30);
        assert_eq!(config.dashboard.accounts_refresh_secs, 60);
        assert_eq!(config.dashboard.stale_time_secs, 10);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_root_url_joins_prefix() {
        let mut api = ApiConfig::default();
        assert_eq!(api.root_url(), "http://localhost:8000/api/v1");

        api.base_url = "https://admin.example.com/".to_string();
        api.api_prefix = "api/v2/".to_string();
        assert_eq!(api.root_url(), "https://admin.example.com/api/v2");

        api.api_prefix = String::new();
        assert_eq!(api.root_url(), "https://admin.example.com");
    }

    #[test]
    fn test_durations() {
        let dashboard = DashboardConfig::default();
        assert_eq!(dashboard.stats_refresh(), Duration::from_secs(30));
        assert_eq!(dashboard.accounts_refresh(), Duration::from_secs(60));
        assert_eq!(dashboard.stale_time(), Duration::from_secs(10));
        assert_eq!(ApiConfig::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://ig.example.com"},
            "dashboard": {"stats_refresh_secs": 5}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.api.base_url, "https://ig.example.com");
        assert_eq!(config.api.api_prefix, "/api/v1");
        assert_eq!(config.dashboard.stats_refresh_secs, 5);
        assert_eq!(config.dashboard.accounts_refresh_secs, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://10.0.0.5:9000\"\nrequest_timeout = 5\n\n[session]\ntoken_file = \"/tmp/instadmin-test-token.json\"\n"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.api.request_timeout, 5);
        assert_eq!(
            config.session.token_file,
            PathBuf::from("/tmp/instadmin-test-token.json")
        );
        assert_eq!(config.dashboard.stale_time_secs, 10);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Path::new("/definitely/not/here/instadmin.toml"));
        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.api.base_url, config.api.base_url);
        assert_eq!(deserialized.session.token_file, config.session.token_file);
        assert_eq!(
            deserialized.dashboard.stats_refresh_secs,
            config.dashboard.stats_refresh_secs
        );
    }
}
