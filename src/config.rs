//! Server configuration loaded from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |
//! | `DATABASE_URL` | `<data dir>/todos/todos.db`, or `:memory:` |

use crate::store::Store;
use eyre::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Value of `DATABASE_URL` selecting a throwaway in-memory store.
const MEMORY_TARGET: &str = ":memory:";

/// Where the task store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    File(PathBuf),
    Memory,
}

impl DatabaseTarget {
    /// Parse a `DATABASE_URL` value. A `sqlite://` prefix is accepted and stripped.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == MEMORY_TARGET {
            return Self::Memory;
        }
        let path = value.strip_prefix("sqlite://").unwrap_or(value);
        Self::File(PathBuf::from(path))
    }

    /// Open the store this target points at.
    pub fn open(&self) -> Result<Store> {
        match self {
            Self::File(path) => {
                Store::open(path).with_context(|| format!("Failed to open store at {}", path.display()))
            }
            Self::Memory => Store::open_in_memory(),
        }
    }
}

impl Default for DatabaseTarget {
    fn default() -> Self {
        let dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::File(dir.join("todos").join("todos.db"))
    }
}

impl std::fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(MEMORY_TARGET),
        }
    }
}

/// Settings needed to run the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database: DatabaseTarget,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database: DatabaseTarget::default(),
        }
    }
}

impl ServerConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names. Unset or empty values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host
                .trim()
                .parse()
                .with_context(|| format!("Invalid HOST value: {}", host))?;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        if let Some(database) = get("DATABASE_URL") {
            config.database = DatabaseTarget::parse(&database);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert!(matches!(config.database, DatabaseTarget::File(ref p) if p.ends_with("todos/todos.db")));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "sqlite:///tmp/tasks.db"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database, DatabaseTarget::File(PathBuf::from("/tmp/tasks.db")));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", ""), ("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, DatabaseTarget::default());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "70000")])).is_err());
    }

    #[test]
    fn test_memory_target() {
        assert_eq!(DatabaseTarget::parse(":memory:"), DatabaseTarget::Memory);
        assert!(DatabaseTarget::Memory.open().is_ok());
    }
}
