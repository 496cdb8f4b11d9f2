// src/config.rs
use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

/// How promotion copies the draft's products and breakups into the new offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Header commits first; each nested row is copied on its own and failures are logged.
    #[default]
    BestEffort,
    /// Header and every nested row commit together or not at all.
    Atomic,
}

impl FromStr for CopyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(CopyMode::BestEffort),
            "atomic" => Ok(CopyMode::Atomic),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub copy_mode: CopyMode,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = parse_or("STORAGE_BACKEND", &lookup, StorageBackend::Postgres)?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let smtp_enabled = parse_or("SMTP_ENABLED", &lookup, false)?;
        let smtp = if smtp_enabled {
            Some(SmtpConfig {
                host: lookup("SMTP_HOST").ok_or(ConfigError::Missing("SMTP_HOST"))?,
                port: parse_or("SMTP_PORT", &lookup, 587)?,
                user: lookup("SMTP_USER").unwrap_or_default(),
                password: lookup("SMTP_PASSWORD").unwrap_or_default(),
                from_email: lookup("SMTP_FROM_EMAIL").unwrap_or_else(|| "noreply@example.com".to_string()),
                from_name: lookup("SMTP_FROM_NAME").unwrap_or_else(|| "Offer Desk".to_string()),
            })
        } else {
            None
        };

        Ok(Self {
            storage,
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 10)?,
            jwt_secret,
            host: parse_or("HOST", &lookup, IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("PORT", &lookup, 3000)?,
            copy_mode: parse_or("PROMOTION_COPY_MODE", &lookup, CopyMode::BestEffort)?,
            smtp,
        })
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
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
    fn memory_backend_needs_no_database_url() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.copy_mode, CopyMode::BestEffort);
        assert!(cfg.smtp.is_none());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn rejects_unknown_copy_mode() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("PROMOTION_COPY_MODE", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PROMOTION_COPY_MODE", .. }));
    }

    #[test]
    fn smtp_settings_load_when_enabled() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("PROMOTION_COPY_MODE", "atomic"),
            ("SMTP_ENABLED", "true"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
        ]))
        .unwrap();
        let smtp = cfg.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(cfg.copy_mode, CopyMode::Atomic);
    }
}
