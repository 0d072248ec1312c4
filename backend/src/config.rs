use std::{env, fmt::Display, net::IpAddr, net::SocketAddr, str::FromStr};

use anyhow::{anyhow, Result};
use tracing::{info, warn};

const DEFAULT_PORT: &str = "5000";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_DATABASE_URL: &str = "sqlite:gym.db";

/// Runtime settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_address: IpAddr,
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            bind_address: try_load(&lookup, "BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            database_url: try_load(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.trim().is_empty()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("Invalid {key} value: {e}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_address, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.database_url, "sqlite:gym.db");
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CORS_ORIGIN", "http://localhost:5173"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));

        assert!(result.is_err());
    }

    #[test]
    fn test_blank_cors_origin_allows_any() {
        let config = Config::from_lookup(lookup_from(&[("CORS_ORIGIN", "  ")])).unwrap();

        assert_eq!(config.cors_origin, None);
    }
}
