use bytes::Bytes;

use crate::view_model::SessionView;

/// Sequence number a timer or request was issued under.
pub type Ticket = u64;

/// MIME type assumed when the backend does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "video/mp4";

/// Descriptive record of a video. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub original_url: String,
}

/// Raw media bytes plus their MIME type. Cloning shares the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    bytes: Bytes,
    mime_type: String,
}

impl MediaPayload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: Option<&str>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE);
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PayloadRequest {
    pub(crate) ticket: Ticket,
    pub(crate) save_after: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedPayload {
    url: String,
    payload: MediaPayload,
}

/// The single state record of one session.
///
/// Every timer and request is tagged with a [`Ticket`] drawn from `sequence`.
/// `url_generation` is the ticket of the last URL mutation; anything issued
/// before it belongs to a URL the user has moved away from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    url: String,
    metadata: Option<Metadata>,
    payload: Option<CachedPayload>,
    downloading: bool,
    error: Option<String>,
    sequence: Ticket,
    url_generation: Ticket,
    pending_debounce: Option<Ticket>,
    metadata_in_flight: Option<Ticket>,
    payload_in_flight: Option<PayloadRequest>,
    last_saved: Option<String>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            url: self.url.clone(),
            metadata: self.metadata.clone(),
            payload: self.cached_payload().cloned(),
            loading: self.loading(),
            downloading: self.downloading,
            fetching_payload: self.fetching_payload(),
            error: self.error.clone(),
            last_saved: self.last_saved.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Payload cached for the current URL, if any.
    pub fn cached_payload(&self) -> Option<&MediaPayload> {
        self.payload
            .as_ref()
            .filter(|cached| cached.url == self.url)
            .map(|cached| &cached.payload)
    }

    pub fn loading(&self) -> bool {
        self.metadata_in_flight.is_some()
    }

    /// Whether a payload fetch for the current URL is under way.
    pub fn fetching_payload(&self) -> bool {
        self.payload_in_flight
            .is_some_and(|request| request.ticket >= self.url_generation)
    }

    pub fn downloading(&self) -> bool {
        self.downloading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_debounce(&self) -> Option<Ticket> {
        self.pending_debounce
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn has_blank_url(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// Replaces the URL and drops everything derived from the previous one.
    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
        self.url_generation = self.next_ticket();
        self.metadata = None;
        self.payload = None;
        self.error = None;
        self.dirty = true;
    }

    /// Ticket of the last URL mutation; a debounce armed for this URL uses it.
    pub(crate) fn url_generation(&self) -> Ticket {
        self.url_generation
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        ticket >= self.url_generation
    }

    pub(crate) fn arm_debounce(&mut self, ticket: Ticket) {
        self.pending_debounce = Some(ticket);
    }

    pub(crate) fn take_pending_debounce(&mut self) -> Option<Ticket> {
        self.pending_debounce.take()
    }

    pub(crate) fn begin_metadata_request(&mut self) -> Ticket {
        let ticket = self.next_ticket();
        self.metadata_in_flight = Some(ticket);
        self.metadata = None;
        self.payload = None;
        self.error = None;
        self.dirty = true;
        ticket
    }

    /// Returns `false` when a newer metadata request superseded `ticket`.
    pub(crate) fn finish_metadata_request(&mut self, ticket: Ticket) -> bool {
        if self.metadata_in_flight != Some(ticket) {
            return false;
        }
        self.metadata_in_flight = None;
        self.dirty = true;
        true
    }

    pub(crate) fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = Some(metadata);
        self.dirty = true;
    }

    /// In-flight payload request for the current URL, if any.
    pub(crate) fn current_payload_request(&mut self) -> Option<&mut PayloadRequest> {
        let url_generation = self.url_generation;
        self.payload_in_flight
            .as_mut()
            .filter(|request| request.ticket >= url_generation)
    }

    /// Starts a payload fetch, superseding any request for an earlier URL.
    ///
    /// A superseded download never reports back, so its busy flag is released
    /// here unless the new request saves too.
    pub(crate) fn begin_payload_request(&mut self, save_after: bool) -> Ticket {
        let ticket = self.next_ticket();
        let replaced = self
            .payload_in_flight
            .replace(PayloadRequest { ticket, save_after });
        if replaced.is_some_and(|old| old.save_after) && !save_after {
            self.set_downloading(false);
        }
        self.dirty = true;
        ticket
    }

    pub(crate) fn finish_payload_request(&mut self, ticket: Ticket) -> Option<PayloadRequest> {
        match self.payload_in_flight {
            Some(request) if request.ticket == ticket => {
                self.payload_in_flight = None;
                self.dirty = true;
                Some(request)
            }
            _ => None,
        }
    }

    pub(crate) fn store_payload(&mut self, payload: MediaPayload) {
        self.payload = Some(CachedPayload {
            url: self.url.clone(),
            payload,
        });
        self.dirty = true;
    }

    pub(crate) fn set_downloading(&mut self, downloading: bool) {
        if self.downloading != downloading {
            self.downloading = downloading;
            self.dirty = true;
        }
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.dirty = true;
    }

    pub(crate) fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn set_last_saved(&mut self, location: String) {
        self.last_saved = Some(location);
        self.dirty = true;
    }

    fn next_ticket(&mut self) -> Ticket {
        self.sequence += 1;
        self.sequence
    }
}
