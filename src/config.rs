use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub quotes_base_url: String,
    pub quotes_timeout: Duration,
    pub timezone: Tz,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: var("SUBRATES_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&var, "SUBRATES_PORT", 8080)?,
            quotes_base_url: var("QUOTES_BASE_URL")
                .unwrap_or_else(|| "https://dolarapi.com/v1".to_string()),
            quotes_timeout: Duration::from_secs(parse_positive(&var, "QUOTES_TIMEOUT_SECS", 10)?),
            timezone: match var("RATES_TIMEZONE") {
                Some(name) => name
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("RATES_TIMEZONE: {}", e))?,
                None => chrono_tz::America::Argentina::Buenos_Aires,
            },
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_positive(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_positive<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse(var, key, default)?;
    anyhow::ensure!(
        value > T::default(),
        "Invalid value for {}: must be positive",
        key
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.quotes_base_url, "https://dolarapi.com/v1");
        assert_eq!(config.quotes_timeout, Duration::from_secs(10));
        assert_eq!(config.timezone, chrono_tz::America::Argentina::Buenos_Aires);
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = config(&[
            ("SUBRATES_PORT", "9090"),
            ("QUOTES_BASE_URL", "http://localhost:4000/v1"),
            ("QUOTES_TIMEOUT_SECS", "3"),
            ("RATES_TIMEZONE", "Europe/Madrid"),
            ("DATABASE_URL", "postgres://localhost/subrates"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.quotes_base_url, "http://localhost:4000/v1");
        assert_eq!(config.quotes_timeout, Duration::from_secs(3));
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/subrates")
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("SUBRATES_PORT", "  "), ("DATABASE_URL", "")]).unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[("SUBRATES_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("SUBRATES_PORT"));

        let err = config(&[("RATES_TIMEZONE", "Mars/Olympus_Mons")]).unwrap_err();
        assert!(err.to_string().contains("RATES_TIMEZONE"));

        let err = config(&[("QUOTES_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("QUOTES_TIMEOUT_SECS"));

        let err = config(&[("DATABASE_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }
}
