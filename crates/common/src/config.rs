use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub password: String,
    pub jwt_secret: String,
    pub session_hours: i64,
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("session_hours", &self.session_hours)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct MailConfig {
    pub sendgrid_api_key: Option<String>,
    pub api_url: String,
    pub from_email: String,
    pub from_name: String,
    pub website_url: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("sendgrid_configured", &self.sendgrid_api_key.is_some())
            .field("api_url", &self.api_url)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("website_url", &self.website_url)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub burst: f64,
    pub per_second: f64,
    /// Key clients on `X-Real-IP` / `X-Forwarded-For` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    pub trust_forwarded: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub service_name: String,
    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,
    pub environment: Environment,
    pub request_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
    pub table_capacity: usize,
    pub event_date: Option<NaiveDate>,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = optional("DATABASE_URL")
            .or_else(|| optional("NETLIFY_DATABASE_URL"))
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let environment = match optional("APP_ENV").as_deref() {
            Some("development") | Some("dev") => Environment::Development,
            _ => Environment::Production,
        };

        let table_capacity: usize = parse_or("SEATING_TABLE_CAPACITY", 4)?;
        if table_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "SEATING_TABLE_CAPACITY",
                value: "0".to_string(),
                reason: "capacity must be at least 1".to_string(),
            });
        }

        let event_date = match optional("EVENT_DATE") {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                ConfigError::Invalid {
                    key: "EVENT_DATE",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            service_name: optional("SERVICE_NAME").unwrap_or_else(|| "wedding-service".to_string()),
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", 8080)?,
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            environment,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 15)?),
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
            table_capacity,
            event_date,
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?),
                statement_timeout: Duration::from_secs(parse_or("DB_STATEMENT_TIMEOUT_SECS", 10)?),
            },
            admin: AdminConfig {
                password: secret("ADMIN_PASSWORD")?.ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?,
                jwt_secret: secret("JWT_SECRET")?.ok_or(ConfigError::Missing("JWT_SECRET"))?,
                session_hours: parse_or("ADMIN_SESSION_HOURS", 12)?,
            },
            mail: MailConfig {
                sendgrid_api_key: secret("SENDGRID_API_KEY")?,
                api_url: optional("SENDGRID_API_URL")
                    .unwrap_or_else(|| "https://api.sendgrid.com/v3/mail/send".to_string()),
                from_email: optional("EMAIL_FROM").unwrap_or_else(|| "noreply@example.com".to_string()),
                from_name: optional("EMAIL_FROM_NAME").unwrap_or_else(|| "Wedding RSVP".to_string()),
                website_url: optional("WEBSITE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            },
            rate_limit: RateLimitConfig {
                burst: parse_or("RATE_LIMIT_BURST", 20.0)?,
                per_second: parse_or("RATE_LIMIT_PER_SECOND", 0.5)?,
                trust_forwarded: parse_or("RATE_LIMIT_TRUST_FORWARDED", false)?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Resolves a secret from `KEY`, then from the file named by `KEY_FILE`, then
/// from `/run/secrets/<key>` (lower-cased, as mounted by container secrets).
fn secret(key: &'static str) -> Result<Option<String>, ConfigError> {
    if let Some(value) = optional(key) {
        return Ok(Some(value));
    }

    let file_key = format!("{key}_FILE");
    if let Some(path) = optional(&file_key) {
        return read_secret_file(&path).map(Some);
    }

    let mounted = format!("/run/secrets/{}", key.to_ascii_lowercase());
    if std::path::Path::new(&mounted).exists() {
        return read_secret_file(&mounted).map(Some);
    }

    Ok(None)
}

fn read_secret_file(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ConfigError::SecretFile {
            path: path.to_string(),
            source,
        })
}
