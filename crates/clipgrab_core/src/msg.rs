/// Inputs to the session state machine.
///
/// Each variant lists the [`crate::SessionState`] fields it may write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input (`resolve`).
    ///
    /// Writes: url, metadata, payload, error, pending debounce, sequence.
    UrlChanged(String),
    /// User asked for an immediate preview of the current URL.
    ///
    /// Writes: loading, metadata, payload, error, pending debounce, sequence.
    ResolveNow,
    /// The debounce timer armed under `ticket` elapsed.
    ///
    /// Writes: loading, metadata, payload, error, pending debounce, sequence.
    DebounceElapsed { ticket: crate::Ticket },
    /// Backend answered a metadata request. Errors arrive already formatted.
    ///
    /// Writes: loading, metadata, error.
    MetadataResolved {
        ticket: crate::Ticket,
        result: Result<crate::Metadata, String>,
    },
    /// Fetch the payload for the current URL into the cache without saving it.
    ///
    /// Writes: error, sequence; downloading when it supersedes a download.
    PayloadRequested,
    /// User clicked Download (`handleDownload`).
    ///
    /// Writes: downloading, error, sequence.
    DownloadClicked,
    /// Backend answered a payload request.
    ///
    /// Writes: payload, downloading, error.
    PayloadFetched {
        ticket: crate::Ticket,
        result: Result<crate::MediaPayload, String>,
    },
    /// The save trigger finished; `Ok` carries the saved location.
    ///
    /// Writes: downloading, error, last saved.
    SaveFinished { result: Result<String, String> },
    /// Session is going away.
    ///
    /// Writes: pending debounce.
    Teardown,
}
