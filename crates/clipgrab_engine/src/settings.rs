use std::path::PathBuf;
use std::time::Duration;

/// Backend address as seen by the client: the single origin behind the `/api` proxy.
pub const DEFAULT_BACKEND_BASE: &str = "http://localhost:3000/api";
/// Quiet period before a typed URL is resolved.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub backend_base: String,
    pub connect_timeout: Duration,
    /// Extraction on the backend runs yt-dlp, so this is generous.
    pub request_timeout: Duration,
    pub max_payload_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_base: DEFAULT_BACKEND_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_payload_bytes: 512 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub download_dir: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            download_dir: PathBuf::from("downloads"),
        }
    }
}
