use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Configuration errors surfaced at start-up
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DB_DSN (or DATABASE_URL) is required")]
    MissingDatabaseUrl,

    #[error("invalid database url: {0}")]
    InvalidDatabaseUrl(String),

    #[error("invalid log level '{0}', must be debug, info, warn or error")]
    InvalidLogLevel(String),

    #[error("invalid auth mode '{0}', must be cognito, secret or dev")]
    InvalidAuthMode(String),

    #[error("COGNITO_USER_POOL_ID and AWS_REGION are required in cognito auth mode")]
    MissingCognito,

    #[error("JWT_SECRET is required in secret auth mode")]
    MissingJwtSecret,

    #[error("invalid DEV_USER_ROLE '{0}', must be admin or user")]
    InvalidDevUserRole(String),

    #[error("GUESTBOOK_PROVIDERS must name at least one provider")]
    NoGuestbookProviders,

    #[error("{name} must be at least 1, got {value}")]
    InvalidDailyLimit { name: &'static str, value: i64 },

    #[error("{name} must be between 1 and 36500 days, got {value}")]
    InvalidRetention { name: &'static str, value: i64 },

    #[error("REQUEST_TIMEOUT_SECS must be between 1 and 3600, got {0}")]
    InvalidRequestTimeout(u64),
}

/// Upper bound for the retention settings, roughly a century.
pub const MAX_RETENTION_DAYS: i64 = 36_500;

pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3_600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    Cognito,
    Secret,
    Dev,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub aws_region: Option<String>,
    pub cognito_user_pool_id: Option<String>,
    pub cognito_client_id: Option<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    pub jwt_expiry_hours: u64,
    pub dev_user_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub guestbook_providers: Vec<String>,
    pub guestbook_daily_limit: i64,
    pub contact_daily_limit: i64,
    pub contact_retention_days: i64,
    pub stats_retention_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                request_timeout_secs: 15,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
            auth: AuthConfig {
                mode: AuthMode::Cognito,
                aws_region: None,
                cognito_user_pool_id: None,
                cognito_client_id: None,
                jwt_secret: None,
                jwt_expiry_hours: 24,
                dev_user_role: "user".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            limits: LimitsConfig {
                guestbook_providers: vec!["google".to_string(), "linkedin".to_string()],
                guestbook_daily_limit: 3,
                contact_daily_limit: 5,
                contact_retention_days: 180,
                stats_retention_days: 395,
            },
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, then validate it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::default().with_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }

        // Database overrides
        self.database.url = lookup("DB_DSN")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Logging overrides
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = match v.to_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }

        // Auth overrides
        let dev_mode = lookup("DEV_MODE")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        if dev_mode {
            self.auth.mode = AuthMode::Dev;
        } else if let Some(v) = lookup("AUTH_MODE") {
            self.auth.mode = match v.to_lowercase().as_str() {
                "cognito" => AuthMode::Cognito,
                "secret" => AuthMode::Secret,
                "dev" => AuthMode::Dev,
                _ => return Err(ConfigError::InvalidAuthMode(v)),
            };
        }
        self.auth.aws_region = lookup("AWS_REGION");
        self.auth.cognito_user_pool_id = lookup("COGNITO_USER_POOL_ID");
        self.auth.cognito_client_id = lookup("COGNITO_CLIENT_ID");
        self.auth.jwt_secret = lookup("JWT_SECRET");
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.auth.jwt_expiry_hours = v.parse().unwrap_or(self.auth.jwt_expiry_hours);
        }
        if let Some(v) = lookup("DEV_USER_ROLE") {
            self.auth.dev_user_role = v;
        }

        // Security overrides
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        // Limit overrides
        if let Some(v) = lookup("GUESTBOOK_PROVIDERS") {
            self.limits.guestbook_providers = split_list(&v)
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect();
        }
        if let Some(v) = lookup("GUESTBOOK_DAILY_LIMIT") {
            self.limits.guestbook_daily_limit = v.parse().unwrap_or(self.limits.guestbook_daily_limit);
        }
        if let Some(v) = lookup("CONTACT_DAILY_LIMIT") {
            self.limits.contact_daily_limit = v.parse().unwrap_or(self.limits.contact_daily_limit);
        }
        if let Some(v) = lookup("CONTACT_RETENTION_DAYS") {
            self.limits.contact_retention_days = v.parse().unwrap_or(self.limits.contact_retention_days);
        }
        if let Some(v) = lookup("STATS_RETENTION_DAYS") {
            self.limits.stats_retention_days = v.parse().unwrap_or(self.limits.stats_retention_days);
        }

        Ok(self)
    }

    /// Check the configuration for values the server cannot start with.
    ///
    /// The database URL is checked only when present; whether it is required
    /// depends on the selected store (see [`AppConfig::require_database_url`]).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(raw) = &self.database.url {
            url::Url::parse(raw).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
        }

        if !matches!(self.logging.level.as_str(), "debug" | "info" | "warn" | "error") {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        match self.auth.mode {
            AuthMode::Cognito => {
                if self.auth.cognito_user_pool_id.is_none() || self.auth.aws_region.is_none() {
                    return Err(ConfigError::MissingCognito);
                }
            }
            AuthMode::Secret => {
                if self.auth.jwt_secret.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingJwtSecret);
                }
            }
            AuthMode::Dev => {
                if !matches!(self.auth.dev_user_role.as_str(), "admin" | "user") {
                    return Err(ConfigError::InvalidDevUserRole(self.auth.dev_user_role.clone()));
                }
            }
        }

        if self.limits.guestbook_providers.is_empty() {
            return Err(ConfigError::NoGuestbookProviders);
        }

        let timeout = self.server.request_timeout_secs;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::InvalidRequestTimeout(timeout));
        }

        for (name, value) in [
            ("GUESTBOOK_DAILY_LIMIT", self.limits.guestbook_daily_limit),
            ("CONTACT_DAILY_LIMIT", self.limits.contact_daily_limit),
        ] {
            if value < 1 {
                return Err(ConfigError::InvalidDailyLimit { name, value });
            }
        }

        for (name, value) in [
            ("CONTACT_RETENTION_DAYS", self.limits.contact_retention_days),
            ("STATS_RETENTION_DAYS", self.limits.stats_retention_days),
        ] {
            if !(1..=MAX_RETENTION_DAYS).contains(&value) {
                return Err(ConfigError::InvalidRetention { name, value });
            }
        }

        Ok(())
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database.url.as_deref().ok_or(ConfigError::MissingDatabaseUrl)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
