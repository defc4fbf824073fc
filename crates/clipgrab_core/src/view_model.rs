use crate::{MediaPayload, Metadata};

/// Snapshot of a session as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub url: String,
    pub metadata: Option<Metadata>,
    pub payload: Option<MediaPayload>,
    pub loading: bool,
    pub downloading: bool,
    pub fetching_payload: bool,
    pub error: Option<String>,
    pub last_saved: Option<String>,
}

impl SessionView {
    /// Title to show in the preview, if metadata has resolved.
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().map(|metadata| metadata.title.as_str())
    }

    /// Busy in any way the user could notice.
    pub fn is_busy(&self) -> bool {
        self.loading || self.downloading || self.fetching_payload
    }
}
