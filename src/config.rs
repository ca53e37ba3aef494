use std::env;
use std::time::Duration;

/// Secret used to sign session tokens when none is configured in development
const DEVELOPMENT_SESSION_SECRET: &str = "forefinder-development-secret";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` selects the in-memory store (development only)
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
    pub log_level: String,
    pub log_format: String,
    pub http_port: u16,
    pub environment: String,
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create database config from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let url = lookup("DATABASE_URL")
            .ok_or("DATABASE_URL environment variable is required")?;

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32);
        let acquire_timeout_secs = parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 30u64);
        let idle_timeout_secs = parse_or(&lookup, "DATABASE_IDLE_TIMEOUT_SECS", 600u64); // 10 minutes
        let max_lifetime_secs = parse_or(&lookup, "DATABASE_MAX_LIFETIME_SECS", 1800u64); // 30 minutes
        let test_before_acquire = parse_or(&lookup, "DATABASE_TEST_BEFORE_ACQUIRE", true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/forefinder".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEVELOPMENT_SESSION_SECRET.to_string(),
            ttl_secs: 24 * 60 * 60,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create application config from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let environment = lookup("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase();

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }
        let is_development = environment == "development";

        let database = match lookup("DATABASE_URL") {
            Some(_) => Some(DatabaseConfig::from_lookup(&lookup)?),
            None if is_development => None,
            None => return Err(format!("DATABASE_URL is required in {}", environment)),
        };

        let log_level = lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase();

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let log_format = lookup("LOG_FORMAT")
            .unwrap_or_else(|| "pretty".to_string())
            .to_lowercase();
        if log_format != "pretty" && log_format != "json" {
            return Err(format!("Invalid LOG_FORMAT: {}. Must be pretty or json", log_format));
        }

        let http_port = parse_or(&lookup, "HTTP_PORT", 3001u16);

        let secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if is_development => DEVELOPMENT_SESSION_SECRET.to_string(),
            _ => return Err(format!("SESSION_SECRET is required in {}", environment)),
        };

        let ttl_secs = parse_or(&lookup, "SESSION_TTL_SECS", 24 * 60 * 60i64);
        if ttl_secs <= 0 {
            return Err("SESSION_TTL_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            database,
            session: SessionConfig { secret, ttl_secs },
            log_level,
            log_format,
            http_port,
            environment,
        })
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            session: SessionConfig::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            http_port: 3001,
            environment: "development".to_string(),
        }
    }
}
