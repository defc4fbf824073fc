use std::time::Duration;

use tokio::task::JoinHandle;

/// An armed one-shot timer. Creating it arms it; dropping it cancels it.
///
/// Replacing a stored `DebounceTimer` therefore always disposes of the old one
/// before it can fire.
#[derive(Debug)]
pub struct DebounceTimer {
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    /// Runs `on_fire` once `delay` has elapsed, unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Cancels the timer. Idempotent; returns `true` only if this call stopped it from firing.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
