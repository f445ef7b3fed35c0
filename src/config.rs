use std::{env, fmt, str::FromStr};

use crate::utils::{AppError, AppResult};

const DEFAULT_JWT_SECRET: &str = "default-secret-change-me";
/// One year
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDB),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be 'mongodb' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::MongoDB => write!(f, "mongodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️  JWT_SECRET not set, using the built-in default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", &var("PORT", "8000"))?,
            store_backend: var("STORE_BACKEND", "mongodb").parse()?,
            database_url: var("DATABASE_URL", "mongodb://localhost:27017/user_scores"),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            auth: AuthConfig {
                enabled: parse_bool("AUTH_ENABLED", &var("AUTH_ENABLED", "false"))?,
                jwt_secret,
                token_ttl_hours: parse_ttl_hours(&var("JWT_TTL_HOURS", "24"))?,
                admin_username: lookup("ADMIN_USERNAME").filter(|s| !s.is_empty()),
                admin_password: lookup("ADMIN_PASSWORD").filter(|s| !s.is_empty()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn parse_ttl_hours(value: &str) -> AppResult<i64> {
    let hours: i64 = parse("JWT_TTL_HOURS", value)?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(AppError::Config(format!(
            "JWT_TTL_HOURS must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_HOURS, hours
        )));
    }
    Ok(hours)
}

fn parse_bool(key: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!("Invalid {} value '{}'", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.store_backend, StoreBackend::MongoDB);
        assert!(!config.auth.enabled);
        assert_eq!(config.auth.jwt_secret, DEFAULT_JWT_SECRET);
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.auth.admin_username.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("STORE_BACKEND", "Memory"),
            ("AUTH_ENABLED", "true"),
            ("JWT_TTL_HOURS", "2"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, http://127.0.0.1:3000,"),
        ])
        .unwrap();

        assert_eq!(config.port, 9001);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.auth.enabled);
        assert_eq!(config.auth.token_ttl_hours, 2);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(config_from(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(
            config_from(&[("STORE_BACKEND", "postgres")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("AUTH_ENABLED", "maybe")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_token_ttl_out_of_range_is_rejected() {
        for ttl in ["0", "-5", "8761", "9223372036854775807"] {
            assert!(
                matches!(config_from(&[("JWT_TTL_HOURS", ttl)]), Err(AppError::Config(_))),
                "JWT_TTL_HOURS={} should be rejected",
                ttl
            );
        }
        assert_eq!(
            config_from(&[("JWT_TTL_HOURS", "8760")]).unwrap().auth.token_ttl_hours,
            8760
        );
    }
}
