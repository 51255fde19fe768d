use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API with credentials (the web frontend)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:./data/saj.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in milliseconds
    #[serde(default = "default_jwt_expiration_ms")]
    pub jwt_expiration_ms: u64,
    /// Clock skew tolerated when checking token expiry
    #[serde(default = "default_jwt_leeway_secs")]
    pub jwt_leeway_secs: u64,
    /// Mark the session cookie `Secure`; only disable for plain-HTTP development
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    /// Username of the administrator created on first start
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Password of the administrator created on first start (no admin is created when unset)
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_ms: default_jwt_expiration_ms(),
            jwt_leeway_secs: default_jwt_leeway_secs(),
            cookie_secure: default_cookie_secure(),
            admin_username: default_admin_username(),
            admin_password: None,
        }
    }
}

/// One year
const MAX_JWT_EXPIRATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

fn default_jwt_expiration_ms() -> u64 {
    86_400_000
}

fn default_jwt_leeway_secs() -> u64 {
    60
}

fn default_cookie_secure() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl AuthConfig {
    /// Cookie `Max-Age` matching the token lifetime
    pub fn cookie_max_age_secs(&self) -> i64 {
        (self.jwt_expiration_ms / 1000) as i64
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiration_ms < 1000 {
            anyhow::bail!("auth.jwt_expiration_ms must be at least 1000");
        }
        if self.auth.jwt_expiration_ms > MAX_JWT_EXPIRATION_MS {
            anyhow::bail!(
                "auth.jwt_expiration_ms must be at most {} (one year)",
                MAX_JWT_EXPIRATION_MS
            );
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than zero");
        }
        if let Some(password) = &self.auth.admin_password {
            if password.is_empty() {
                anyhow::bail!("auth.admin_password must not be empty when set");
            }
        }
        Ok(())
    }

    /// Apply a secret given on the command line or environment, or fall back to
    /// a random one so the server still starts in development.
    pub fn resolve_jwt_secret(&mut self, override_secret: Option<String>) {
        if let Some(secret) = override_secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if self.auth.jwt_secret.is_empty() {
            warn!("No JWT secret configured; generated a random one. Sessions will not survive a restart");
            let bytes: [u8; 32] = rand::rng().random();
            self.auth.jwt_secret = hex::encode(bytes);
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.auth.jwt_expiration_ms, 86_400_000);
        assert!(config.auth.cookie_secure);
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.auth.cookie_max_age_secs(), 86_400);
    }

    #[test]
    fn test_parse_auth_section() {
        let config = Config::parse(
            r#"
            [auth]
            jwt_secret = "s3cret"
            jwt_expiration_ms = 3600000
            cookie_secure = false
            admin_password = "changeme"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.cookie_max_age_secs(), 3600);
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.admin_username, "admin");
    }

    #[test]
    fn test_rejects_tiny_expiration() {
        let err = Config::parse("[auth]\njwt_expiration_ms = 10\n").unwrap_err();
        assert!(err.to_string().contains("jwt_expiration_ms"));
    }

    #[test]
    fn test_rejects_huge_expiration() {
        let err = Config::parse("[auth]\njwt_expiration_ms = 100000000000000000\n").unwrap_err();
        assert!(err.to_string().contains("at most"));

        let config = Config::parse("[auth]\njwt_expiration_ms = 31536000000\n").unwrap();
        assert_eq!(config.auth.cookie_max_age_secs(), 31_536_000);
    }

    #[test]
    fn test_resolve_jwt_secret() {
        let mut config = Config::default();
        config.resolve_jwt_secret(Some("from-env".to_string()));
        assert_eq!(config.auth.jwt_secret, "from-env");

        let mut config = Config::default();
        config.resolve_jwt_secret(None);
        assert_eq!(config.auth.jwt_secret.len(), 64);

        let mut config = Config::default();
        config.auth.jwt_secret = "from-file".to_string();
        config.resolve_jwt_secret(Some(String::new()));
        assert_eq!(config.auth.jwt_secret, "from-file");
    }
}
