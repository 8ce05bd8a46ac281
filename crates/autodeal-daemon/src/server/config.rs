//! Server configuration.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP bind address.
    pub tcp_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tcp_addr: SocketAddr::from(([127, 0, 0, 1], 50061)),
        }
    }
}

impl ServerConfig {
    /// Create a new server config bound to the given TCP address.
    pub const fn tcp(addr: SocketAddr) -> Self {
        Self { tcp_addr: addr }
    }
}
