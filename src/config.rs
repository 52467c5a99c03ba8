use std::{env, path::PathBuf};

use thiserror::Error;

/// Development-only signing secret. Production refuses to start without `JWT_SECRET`.
pub const DEV_JWT_SECRET: &str = "gcx_super_secret_jwt_key_change_this_in_production";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// AppConfig
///
/// Immutable configuration resolved once at startup and shared through `AppState`.
/// Handlers and the auth extractor pull it out via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: Env,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub admin: AdminSeed,
}

/// Env
///
/// Runtime context. Selects the log format and whether secrets may fall back to defaults.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// DatabaseConfig
///
/// Which store backs the repository and how to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseConfig {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

/// Credentials for the administrator created on first boot.
#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test state. Uses the in-memory store and the
    /// cheapest bcrypt cost so suites stay fast.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: 8080,
            database: DatabaseConfig::Memory,
            jwt_secret: "gcx-test-secret".to_string(),
            bcrypt_cost: 4,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            admin: AdminSeed::default(),
        }
    }
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            email: "admin@gcx.com".to_string(),
            password: "admin123".to_string(),
            name: "GCX Admin".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the process environment. Missing production secrets
    /// and unparsable numbers are reported as `ConfigError` so `main` can refuse to start.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match (env, env::var("JWT_SECRET")) {
            (_, Ok(secret)) if !secret.is_empty() => secret,
            (Env::Production, _) => return Err(ConfigError::Missing("JWT_SECRET")),
            (Env::Local, _) => DEV_JWT_SECRET.to_string(),
        };

        let database = match env::var("DB_TYPE").as_deref() {
            Ok("memory") => DatabaseConfig::Memory,
            _ => DatabaseConfig::Postgres {
                url: postgres_url(env)?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            },
        };

        let defaults = AdminSeed::default();
        let admin = AdminSeed {
            email: var_or("ADMIN_EMAIL", &defaults.email),
            password: var_or("ADMIN_PASSWORD", &defaults.password),
            name: var_or("ADMIN_NAME", &defaults.name),
        };

        Ok(Self {
            env,
            port: parse_var("PORT", 8080)?,
            database,
            jwt_secret,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "./uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            admin,
        })
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
fn postgres_url(env: Env) -> Result<String, ConfigError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }
    if env == Env::Production && env::var("DB_HOST").is_err() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }
    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        var_or("DB_USER", "postgres"),
        var_or("DB_PASSWORD", ""),
        var_or("DB_HOST", "localhost"),
        var_or("DB_PORT", "5432"),
        var_or("DB_NAME", "gcx_cms"),
    ))
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
