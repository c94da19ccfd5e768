//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};

use tracing::warn;

/// Port used when `SERVER_PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    /// Load from `SERVER_PORT`
    pub fn from_env() -> Self {
        Self::from_port_var(std::env::var("SERVER_PORT").ok())
    }

    fn from_port_var(raw: Option<String>) -> Self {
        let port = match raw {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid SERVER_PORT='{}'", raw);
                DEFAULT_PORT
            }),
        };
        Self { port }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_parsing() {
        assert_eq!(ServerConfig::from_port_var(None).port, 3001);
        assert_eq!(ServerConfig::from_port_var(Some("8080".into())).port, 8080);
        assert_eq!(ServerConfig::from_port_var(Some("http".into())).port, 3001);
        assert_eq!(ServerConfig::from_port_var(Some("70000".into())).port, 3001);
    }

    #[test]
    fn test_addr_binds_all_interfaces() {
        assert_eq!(ServerConfig::default().addr().to_string(), "0.0.0.0:3001");
    }
}
