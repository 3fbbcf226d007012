use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is missing")]
    MissingVariable(String),
    #[error("failed to parse environment variable {variable}: {source}")]
    ParseError {
        variable: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub server: ServerConfig,
    pub backends: BackendsConfig,
    pub timeouts: TimeoutsConfig,
    pub retry: RetryConfig,
    pub routing: RoutingConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Base URLs for the two backend bridges (§6 external interfaces).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    pub backend_g_url: String,
    pub backend_b_url: String,
}

/// Named timeout policy (§4.2): `SHORT` 10s, `DEFAULT` 30s, `MEDIA` 60s,
/// `HEALTH` 5s.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    pub short_secs: u64,
    pub default_secs: u64,
    pub media_secs: u64,
    pub health_secs: u64,
}

impl TimeoutsConfig {
    pub fn to_policy(self) -> wa_clients::TimeoutPolicy {
        wa_clients::TimeoutPolicy {
            short: Duration::from_secs(self.short_secs),
            default: Duration::from_secs(self.default_secs),
            media: Duration::from_secs(self.media_secs),
            health: Duration::from_secs(self.health_secs),
        }
    }
}

/// Reconciliation retry policy (§4.4.1) and health cache TTL (§9 pinned
/// open question 3: on-demand with TTL, no background refresh task).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub health_cache_ttl_secs: u64,
    pub sync_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub max_age: Option<usize>,
    pub supports_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv();

        let server = ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("SERVER_PORT", "8080")?,
            workers: env::var("SERVER_WORKERS").ok().map(|v| parse("SERVER_WORKERS", &v)).transpose()?,
        };

        let backends = BackendsConfig {
            backend_g_url: env::var("WA_BACKEND_G_URL")
                .map_err(|_| ConfigError::MissingVariable("WA_BACKEND_G_URL".to_string()))?,
            backend_b_url: env::var("WA_BACKEND_B_URL")
                .map_err(|_| ConfigError::MissingVariable("WA_BACKEND_B_URL".to_string()))?,
        };

        let timeouts = TimeoutsConfig {
            short_secs: parse_env("WA_TIMEOUT_SHORT_SECS", "10")?,
            default_secs: parse_env("WA_TIMEOUT_DEFAULT_SECS", "30")?,
            media_secs: parse_env("WA_TIMEOUT_MEDIA_SECS", "60")?,
            health_secs: parse_env("WA_TIMEOUT_HEALTH_SECS", "5")?,
        };

        let retry = RetryConfig {
            max_retries: parse_env("WA_SYNC_MAX_RETRIES", "3")?,
            retry_delay_secs: parse_env("WA_SYNC_RETRY_DELAY_SECS", "1")?,
            health_cache_ttl_secs: parse_env("WA_HEALTH_CACHE_TTL_SECS", "1")?,
            sync_timeout_secs: parse_env("WA_WORKFLOW_SYNC_TIMEOUT_SECS", "600")?,
        };

        let routing = RoutingConfig {
            batch_size: parse_env("WA_SYNC_BATCH_SIZE", "1000")?,
        };

        let cors = CorsConfig {
            allowed_origins: split_env("CORS_ALLOWED_ORIGINS", "http://localhost:3000"),
            allowed_methods: split_env("CORS_ALLOWED_METHODS", "GET,POST,PUT,DELETE,OPTIONS"),
            allowed_headers: split_env("CORS_ALLOWED_HEADERS", "Content-Type,Authorization,X-Requested-With"),
            expose_headers: split_env("CORS_EXPOSE_HEADERS", "X-Request-Id"),
            max_age: env::var("CORS_MAX_AGE").ok().map(|v| parse("CORS_MAX_AGE", &v)).transpose()?,
            supports_credentials: env::var("CORS_SUPPORTS_CREDENTIALS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            },
        };

        Ok(OrchestratorConfig {
            server,
            backends,
            timeouts,
            retry,
            routing,
            cors,
            logging,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidConfig("server port cannot be 0".to_string()));
        }
        if self.backends.backend_g_url.is_empty() || self.backends.backend_b_url.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "both backend base URLs must be set".to_string(),
            ));
        }
        if self.cors.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "at least one CORS origin must be specified".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: std::str::FromStr<Err = std::num::ParseIntError>>(variable: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|source| ConfigError::ParseError {
        variable: variable.to_string(),
        source,
    })
}

fn parse_env<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    variable: &str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = env::var(variable).unwrap_or_else(|_| default.to_string());
    parse(variable, &value)
}

fn split_env(variable: &str, default: &str) -> Vec<String> {
    env::var(variable)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            backends: BackendsConfig {
                backend_g_url: "http://localhost:9001".to_string(),
                backend_b_url: "http://localhost:9002".to_string(),
            },
            timeouts: TimeoutsConfig {
                short_secs: 10,
                default_secs: 30,
                media_secs: 60,
                health_secs: 5,
            },
            retry: RetryConfig {
                max_retries: 3,
                retry_delay_secs: 1,
                health_cache_ttl_secs: 1,
                sync_timeout_secs: 600,
            },
            routing: RoutingConfig { batch_size: 1000 },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
                allowed_methods: vec![
                    "GET".to_string(),
                    "POST".to_string(),
                    "PUT".to_string(),
                    "DELETE".to_string(),
                    "OPTIONS".to_string(),
                ],
                allowed_headers: vec![
                    "Content-Type".to_string(),
                    "Authorization".to_string(),
                    "X-Requested-With".to_string(),
                ],
                expose_headers: vec!["X-Request-Id".to_string()],
                max_age: Some(3600),
                supports_credentials: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn config_from_env_with_defaults() {
        for var in ["SERVER_HOST", "SERVER_PORT", "WA_BACKEND_G_URL", "WA_BACKEND_B_URL", "LOG_LEVEL"] {
            env::remove_var(var);
        }
        env::set_var("WA_BACKEND_G_URL", "http://g.local:9001");
        env::set_var("WA_BACKEND_B_URL", "http://b.local:9002");

        let config = OrchestratorConfig::from_env().expect("should build with defaults");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backends.backend_g_url, "http://g.local:9001");
        assert_eq!(config.timeouts.health_secs, 5);

        env::remove_var("WA_BACKEND_G_URL");
        env::remove_var("WA_BACKEND_B_URL");
    }

    #[test]
    fn validation_rejects_zero_port() {
        let mut config = OrchestratorConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_missing_backend_url() {
        let mut config = OrchestratorConfig::default();
        config.backends.backend_g_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn server_address_formats_host_and_port() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }
}
