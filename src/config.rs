use std::env;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MySql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend '{}', expected mysql or memory", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage: StorageBackend,
    /// Required for the mysql backend only
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: String,
    pub holiday_cache_ttl_secs: u64,

    /// Seeded into the memory backend so a fresh instance can log in
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage: StorageBackend = parsed_or("STORAGE_BACKEND", StorageBackend::MySql)?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set for the mysql backend");
        }

        let bootstrap_admin = match (env::var("BOOTSTRAP_ADMIN_USER"), env::var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Ok(user), Ok(password)) if !user.trim().is_empty() && !password.is_empty() => {
                Some((user.trim().to_string(), password))
            }
            _ => None,
        };

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            storage,
            database_url,
            run_migrations: parsed_or("RUN_MIGRATIONS", true)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed_or("REFRESH_TOKEN_TTL", 604_800)?, // 7 days
            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parsed_or("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            holiday_cache_ttl_secs: parsed_or("HOLIDAY_CACHE_TTL_SECS", 300)?,
            bootstrap_admin,
        })
    }

    /// Memory-backed settings for tests and local runs.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            storage: StorageBackend::Memory,
            database_url: None,
            run_migrations: false,
            jwt_secret: jwt_secret.to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 604_800,
            rate_login_per_min: 1000,
            rate_refresh_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
            holiday_cache_ttl_secs: 300,
            bootstrap_admin: None,
        }
    }
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value '{}' for {}: {}", raw, key, e)),
        Err(_) => Ok(default),
    }
}
