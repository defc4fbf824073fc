use std::sync::Arc;
use std::time::Duration;

use clipgrab_core::{update, Effect, Msg, SessionState, SessionView};
use session_logging::{session_debug, session_info, session_trace, session_warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{
    Backend, ClientSettings, DebounceTimer, DirectorySaver, ReqwestBackend, Saver,
    SessionSettings, WorkflowError,
};

/// Handle to one running session.
///
/// A driver task owns the [`SessionState`] and applies messages one at a time;
/// network calls, the debounce timer and saves run as separate tasks that
/// report back by message. Dropping the handle tears the session down.
pub struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<Msg>,
    view_rx: watch::Receiver<SessionView>,
    driver: JoinHandle<()>,
}

impl SessionHandle {
    /// Starts a session against the HTTP backend, saving into `session.download_dir`.
    pub fn connect(client: ClientSettings, session: SessionSettings) -> Result<Self, WorkflowError> {
        let backend = Arc::new(ReqwestBackend::new(client)?);
        let saver = Arc::new(DirectorySaver::new(session.download_dir.clone()));
        Ok(Self::spawn(session, backend, saver))
    }

    /// Starts a session driver on the current tokio runtime.
    pub fn spawn(
        settings: SessionSettings,
        backend: Arc<dyn Backend>,
        saver: Arc<dyn Saver>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = SessionState::new();
        let (view_tx, view_rx) = watch::channel(state.view());

        let driver = Driver {
            state,
            debounce: settings.debounce,
            backend,
            saver,
            timer: None,
            event_tx,
            view_tx,
        };
        let driver = tokio::spawn(driver.run(cmd_rx, event_rx));

        Self {
            cmd_tx,
            view_rx,
            driver,
        }
    }

    /// The user typed or pasted `url`; resolution follows after the quiet period.
    pub fn resolve(&self, url: impl Into<String>) {
        self.send(Msg::UrlChanged(url.into()));
    }

    /// Resolve the current URL without waiting for the quiet period.
    pub fn resolve_now(&self) {
        self.send(Msg::ResolveNow);
    }

    /// Fetch the payload for the current URL into the session cache.
    pub fn fetch_payload(&self) {
        self.send(Msg::PayloadRequested);
    }

    /// Save the current URL's video, fetching it first unless cached.
    pub fn handle_download(&self) {
        self.send(Msg::DownloadClicked);
    }

    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that is notified whenever the visible state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Waits until the published view satisfies `predicate`.
    ///
    /// Returns the last published view if the session ends first.
    pub async fn wait_until<F>(&self, mut predicate: F) -> SessionView
    where
        F: FnMut(&SessionView) -> bool,
    {
        let mut rx = self.view_rx.clone();
        let view = rx.wait_for(|view| predicate(view)).await.map(|view| view.clone());
        view.unwrap_or_else(|_| rx.borrow().clone())
    }

    /// Cancels any pending timer and stops the driver.
    pub async fn shutdown(self) {
        let Self {
            cmd_tx,
            view_rx: _,
            driver,
        } = self;
        let _ = cmd_tx.send(Msg::Teardown);
        drop(cmd_tx);
        if let Err(err) = driver.await {
            session_warn!("Session driver ended abnormally: {}", err);
        }
    }

    fn send(&self, msg: Msg) {
        if self.cmd_tx.send(msg).is_err() {
            session_warn!("Session driver is gone; message dropped");
        }
    }
}

struct Driver {
    state: SessionState,
    debounce: Duration,
    backend: Arc<dyn Backend>,
    saver: Arc<dyn Saver>,
    timer: Option<DebounceTimer>,
    event_tx: mpsc::UnboundedSender<Msg>,
    view_tx: watch::Sender<SessionView>,
}

impl Driver {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Msg>,
        mut event_rx: mpsc::UnboundedReceiver<Msg>,
    ) {
        session_debug!("Session started");
        loop {
            let msg = tokio::select! {
                biased;
                cmd = cmd_rx.recv() => match cmd {
                    Some(msg) => msg,
                    // Handle dropped without an explicit shutdown.
                    None => Msg::Teardown,
                },
                Some(event) = event_rx.recv() => event,
            };
            let teardown = matches!(msg, Msg::Teardown);
            self.dispatch(msg);
            if teardown {
                break;
            }
        }
        // In-flight requests keep running; their results have nowhere to go.
        self.timer = None;
        session_debug!("Session ended");
    }

    fn dispatch(&mut self, msg: Msg) {
        session_trace!("Dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.view_tx.send_replace(state.view());
        }
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ArmDebounce { ticket } => {
                let event_tx = self.event_tx.clone();
                session_trace!("Arm debounce ticket={} delay={:?}", ticket, self.debounce);
                // Assigning drops, and so cancels, the previous timer.
                self.timer = Some(DebounceTimer::arm(self.debounce, move || {
                    let _ = event_tx.send(Msg::DebounceElapsed { ticket });
                }));
            }
            Effect::CancelDebounce => {
                if let Some(mut timer) = self.timer.take() {
                    if timer.cancel() {
                        session_trace!("Cancelled pending debounce");
                    }
                }
            }
            Effect::FetchMetadata { ticket, url } => {
                session_info!("Resolve metadata ticket={} url_len={}", ticket, url.len());
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = backend
                        .metadata(&url)
                        .await
                        .map_err(|err| report("metadata", err));
                    let _ = event_tx.send(Msg::MetadataResolved { ticket, result });
                });
            }
            Effect::FetchPayload { ticket, url } => {
                session_info!("Fetch payload ticket={} url_len={}", ticket, url.len());
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = backend
                        .download(&url)
                        .await
                        .map_err(|err| report("payload", err));
                    let _ = event_tx.send(Msg::PayloadFetched { ticket, result });
                });
            }
            Effect::SavePayload { payload, file_name } => {
                session_info!("Save {} bytes as {:?}", payload.len(), file_name);
                let saver = self.saver.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = saver
                        .save(payload, &file_name)
                        .await
                        .map_err(|err| report("save", err));
                    let _ = event_tx.send(Msg::SaveFinished { result });
                });
            }
        }
    }
}

fn report(operation: &str, err: WorkflowError) -> String {
    session_warn!("{} failed: {}", operation, err);
    err.to_string()
}
