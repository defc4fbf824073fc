use crate::{MediaPayload, Ticket};

/// Side effects requested by [`crate::update`]; executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Arm the debounce timer, replacing any armed one. Fires `Msg::DebounceElapsed`.
    ArmDebounce { ticket: Ticket },
    /// Cancel the armed debounce timer, if any.
    CancelDebounce,
    /// `GET /metadata?url=...`, answered by `Msg::MetadataResolved`.
    FetchMetadata { ticket: Ticket, url: String },
    /// `POST /download`, answered by `Msg::PayloadFetched`.
    FetchPayload { ticket: Ticket, url: String },
    /// Hand the payload to the save trigger, answered by `Msg::SaveFinished`.
    SavePayload {
        payload: MediaPayload,
        file_name: String,
    },
}
