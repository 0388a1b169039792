use crate::workflows::assessment::freshness::FreshnessWeights;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let pipeline = PipelineConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Tunable knobs for the assessment pipeline.
///
/// The freshness weights default to the humidity-dominant 30/40/30 split;
/// deployments preferring the temperature-dominant variant override them via
/// `APP_FRESHNESS_WEIGHTS` instead of patching the scorer.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub freshness_weights: FreshnessWeights,
    pub advisory_timeout: Duration,
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let freshness_weights = match env::var("APP_FRESHNESS_WEIGHTS") {
            Ok(raw) => parse_weights(&raw).ok_or(ConfigError::InvalidFreshnessWeights)?,
            Err(_) => FreshnessWeights::default(),
        };

        let advisory_timeout_ms = env::var("APP_ADVISORY_TIMEOUT_MS")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidAdvisoryTimeout)?;

        Ok(Self {
            freshness_weights,
            advisory_timeout: Duration::from_millis(advisory_timeout_ms),
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            freshness_weights: FreshnessWeights::default(),
            advisory_timeout: Duration::from_millis(3000),
        }
    }
}

fn parse_weights(raw: &str) -> Option<FreshnessWeights> {
    let mut parts = raw.split(',').map(|part| part.trim().parse::<f64>());
    let temperature = parts.next()?.ok()?;
    let humidity = parts.next()?.ok()?;
    let age = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }

    let weights = FreshnessWeights {
        temperature,
        humidity,
        age,
    };
    weights.validate().ok()?;
    Some(weights)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFreshnessWeights,
    InvalidAdvisoryTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFreshnessWeights => write!(
                f,
                "APP_FRESHNESS_WEIGHTS must be three comma-separated positive numbers"
            ),
            ConfigError::InvalidAdvisoryTimeout => {
                write!(f, "APP_ADVISORY_TIMEOUT_MS must be a valid u64")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_FRESHNESS_WEIGHTS");
        env::remove_var("APP_ADVISORY_TIMEOUT_MS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.pipeline.advisory_timeout,
            Duration::from_millis(3000)
        );
        assert!((config.pipeline.freshness_weights.humidity - 0.40).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        env::remove_var("APP_HOST");
    }

    #[test]
    fn alternative_weighting_can_be_configured() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_FRESHNESS_WEIGHTS", "0.40, 0.30, 0.30");
        let config = AppConfig::load().expect("config loads");
        assert!((config.pipeline.freshness_weights.temperature - 0.40).abs() < f64::EPSILON);
        env::remove_var("APP_FRESHNESS_WEIGHTS");
    }

    #[test]
    fn rejects_malformed_weights() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_FRESHNESS_WEIGHTS", "0.4,banana,0.3");
        let result = AppConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidFreshnessWeights)));
        env::remove_var("APP_FRESHNESS_WEIGHTS");
    }
}
