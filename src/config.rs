//! Server configuration loaded from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the relay server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Load config from environment variables.
    ///
    /// `PARLEY_HOST` and `PARLEY_PORT` override the defaults
    /// (`0.0.0.0:8080`). Unparseable values fall back with a warning rather
    /// than failing startup.
    pub fn from_env() -> Self {
        let host = match std::env::var("PARLEY_HOST") {
            Ok(raw) => match raw.parse::<IpAddr>() {
                Ok(ip) => ip,
                Err(_) => {
                    tracing::warn!("PARLEY_HOST {:?} is not a valid address, using 0.0.0.0", raw);
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
                }
            },
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match std::env::var("PARLEY_PORT") {
            Ok(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "PARLEY_PORT {:?} is not a valid port, using {}",
                        raw,
                        DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        Self {
            bind_addr: SocketAddr::new(host, port),
        }
    }
}
