//! Clipgrab core: pure session state machine and view-model helpers.
mod effect;
mod filename;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use filename::{save_file_name, DEFAULT_FILE_NAME, FILE_EXTENSION, MAX_TITLE_CHARS};
pub use msg::Msg;
pub use state::{MediaPayload, Metadata, SessionState, Ticket, DEFAULT_MIME_TYPE};
pub use update::{update, BLANK_DOWNLOAD_URL_ERROR, BLANK_URL_ERROR};
pub use view_model::SessionView;
