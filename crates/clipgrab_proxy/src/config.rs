use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PREFIX: &str = "/api";
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen_addr: SocketAddr,
    /// Public path prefix stripped before forwarding.
    pub prefix: String,
    pub backend_origin: String,
    /// Largest request body buffered for forwarding.
    pub body_limit: usize,
    pub connect_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            prefix: DEFAULT_PREFIX.to_string(),
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            body_limit: 64 * 1024 * 1024,
            connect_timeout: Duration::from_secs(10),
        }
    }
}
