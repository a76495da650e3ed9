use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

/// `DATABASE_URL` value selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub server_addr: String,
    /// Session cookie lifetime, seconds.
    pub session_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = match lookup("SERVER_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", parse_or(&lookup, "PORT", 5000u16)?),
        };

        let session_secret = lookup("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if session_secret.len() < 16 {
            return Err(anyhow!("SESSION_SECRET must be at least 16 bytes"));
        }

        Ok(Self {
            server_addr,
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            session_secret,
            session_ttl: parse_or(&lookup, "SESSION_TTL", 28_800)?, // default 8h

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or(&lookup, "RATE_REGISTER_PER_MIN", 30)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: MEMORY_DATABASE_URL.to_string(),
        session_secret: "test-secret-0123456789abcdef".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        session_ttl: 3600,
        rate_login_per_min: 1000,
        rate_register_per_min: 1000,
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        log_level: tracing::Level::DEBUG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mysql://root@localhost/plumbx"),
            ("SESSION_SECRET", "0123456789abcdef0123"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:5000");
        assert_eq!(config.session_ttl, 28_800);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn port_is_used_when_server_addr_is_absent() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", MEMORY_DATABASE_URL),
            ("SESSION_SECRET", "0123456789abcdef0123"),
            ("PORT", "8088"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:8088");
        assert!(config.uses_memory_store());
    }

    #[test]
    fn missing_secret_and_bad_numbers_are_reported() {
        let missing = Config::from_lookup(lookup_from(&[("DATABASE_URL", MEMORY_DATABASE_URL)]));
        assert!(missing.unwrap_err().to_string().contains("SESSION_SECRET"));

        let short = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", MEMORY_DATABASE_URL),
            ("SESSION_SECRET", "short"),
        ]));
        assert!(short.is_err());

        let bad_ttl = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", MEMORY_DATABASE_URL),
            ("SESSION_SECRET", "0123456789abcdef0123"),
            ("SESSION_TTL", "forever"),
        ]));
        assert!(bad_ttl.unwrap_err().to_string().contains("SESSION_TTL"));
    }
}
