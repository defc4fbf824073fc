//! Clipgrab proxy: serves the backend under the client's single origin.
//!
//! Requests under the public prefix (`/api` by default) have the prefix
//! stripped and are forwarded to the backend origin with method, query,
//! headers and body untouched.
mod config;
mod error;
mod rewrite;
mod server;

pub use config::{ProxyConfig, DEFAULT_BACKEND_ORIGIN, DEFAULT_LISTEN_ADDR, DEFAULT_PREFIX};
pub use error::ProxyError;
pub use rewrite::{rewrite_path, target_url};
pub use server::{router, serve, ProxyState};
