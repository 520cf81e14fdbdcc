//! Application configuration
//!
//! `AppConfig` is read from a TOML file (every section optional, missing
//! keys take their defaults) and then patched from environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::{DatabaseConfig, JwtConfig};

/// Signing secret shipped for local development only
pub const DEV_JWT_SECRET: &str = "dev-secret-key";

/// Environment variable pointing at the config file
pub const CONFIG_ENV_VAR: &str = "GATEKEEPER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            shutdown_timeout: 30,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackend,
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            url: "sqlite://./gatekeeper.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseSection {
    pub fn connection(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_minutes: i64,
    pub issuer: String,
    pub bcrypt_cost: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_minutes: 30,
            refresh_token_minutes: 7 * 24 * 60,
            issuer: "gatekeeper-api".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl SecuritySection {
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            issuer: self.issuer.clone(),
            access_ttl: chrono::Duration::minutes(self.access_token_minutes),
            refresh_ttl: chrono::Duration::minutes(self.refresh_token_minutes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitSection {
    /// Burst size and requests allowed per window
    pub requests: u32,
    pub window_secs: u64,
    /// Interval of the bulk reset of all client buckets
    pub clear_interval_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            requests: 100,
            window_secs: 60,
            clear_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorsSection {
    /// `"*"` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Bootstrap admin, created when the user table is empty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdminSection {
    pub username: String,
    pub password: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin12345".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub rate_limit: RateLimitSection,
    pub cors: CorsSection,
    pub logging: LoggingSection,
    pub admin: AdminSection,
}

/// `$GATEKEEPER_CONFIG`, else `<config_dir>/gatekeeper/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatekeeper")
        .join("config.toml")
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` and apply process environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Patch fields from `lookup` (normally the process environment).
    /// Unparseable numeric values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT").and_then(|v| v.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(environment) = get("ENVIRONMENT") {
            self.server.environment = environment;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(requests) = get("RATE_LIMIT_REQUESTS").and_then(|v| v.trim().parse().ok()) {
            self.rate_limit.requests = requests;
        }
        if let Some(window) = get("RATE_LIMIT_WINDOW").and_then(|v| v.trim().parse().ok()) {
            self.rate_limit.window_secs = window;
        }
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = get("LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.is_production() && self.security.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::Invalid(
                "security.jwt_secret must be changed in production".into(),
            ));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.security.access_token_minutes <= 0 || self.security.refresh_token_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "token lifetimes must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.rate_limit.requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.requests and rate_limit.window_secs must be non-zero".into(),
            ));
        }
        if self.rate_limit.clear_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.clear_interval_secs must be non-zero".into(),
            ));
        }
        if self.database.backend == StoreBackend::Sqlite && self.database.url.is_empty() {
            return Err(ConfigError::Invalid("database.url is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Sqlite);
        assert_eq!(config.security.access_token_minutes, 30);
        assert_eq!(config.security.refresh_token_minutes, 10080);
        assert_eq!(config.rate_limit.requests, 100);
        assert_eq!(config.rate_limit.clear_interval_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [database]
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/gatekeeper/config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn environment_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("PORT", "7000"),
            ("JWT_SECRET", "s3cret"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("RATE_LIMIT_REQUESTS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.rate_limit.requests, 100);
    }

    #[test]
    fn production_refuses_dev_secret() {
        let mut config = AppConfig::default();
        config.server.environment = "production".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.security.jwt_secret = "a-real-secret".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_rate_limit_is_invalid() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn jwt_section_converts_minutes() {
        let jwt = SecuritySection::default().jwt();
        assert_eq!(jwt.access_ttl, chrono::Duration::minutes(30));
        assert_eq!(jwt.refresh_ttl, chrono::Duration::days(7));
    }
}
