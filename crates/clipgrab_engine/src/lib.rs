//! Clipgrab engine: backend IO, debounce timer, save trigger and the session runner.
mod backend;
mod debounce;
mod error;
mod save;
mod session;
mod settings;

pub use backend::{Backend, ReqwestBackend};
pub use debounce::DebounceTimer;
pub use error::WorkflowError;
pub use save::{DirectorySaver, Saver};
pub use session::SessionHandle;
pub use settings::{ClientSettings, SessionSettings, DEFAULT_BACKEND_BASE, DEFAULT_DEBOUNCE};
