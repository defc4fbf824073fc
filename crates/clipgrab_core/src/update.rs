use crate::{save_file_name, Effect, Msg, SessionState};

/// Shown when a preview is requested with an empty input.
pub const BLANK_URL_ERROR: &str = "Please enter a video URL.";
/// Shown when a download is requested with an empty input.
pub const BLANK_DOWNLOAD_URL_ERROR: &str = "Please enter a video URL to download.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(url) => {
            state.set_url(url);
            let had_timer = state.take_pending_debounce().is_some();
            if state.has_blank_url() {
                // Idle: nothing to resolve, only dispose of the old timer.
                if had_timer {
                    vec![Effect::CancelDebounce]
                } else {
                    Vec::new()
                }
            } else {
                let ticket = state.url_generation();
                state.arm_debounce(ticket);
                vec![Effect::ArmDebounce { ticket }]
            }
        }
        Msg::ResolveNow => {
            let mut effects = Vec::with_capacity(2);
            if state.take_pending_debounce().is_some() {
                effects.push(Effect::CancelDebounce);
            }
            if state.has_blank_url() {
                state.set_error(BLANK_URL_ERROR);
            } else {
                effects.push(fire_metadata_request(&mut state));
            }
            effects
        }
        Msg::DebounceElapsed { ticket } => {
            if state.pending_debounce() != Some(ticket) {
                // Superseded timer that slipped past cancellation.
                return (state, Vec::new());
            }
            state.take_pending_debounce();
            vec![fire_metadata_request(&mut state)]
        }
        Msg::MetadataResolved { ticket, result } => {
            if state.finish_metadata_request(ticket) && state.is_current(ticket) {
                match result {
                    Ok(metadata) => state.set_metadata(metadata),
                    Err(message) => state.set_error(message),
                }
            }
            Vec::new()
        }
        Msg::PayloadRequested => {
            state.clear_error();
            if state.has_blank_url() {
                state.set_error(BLANK_URL_ERROR);
                Vec::new()
            } else if state.cached_payload().is_some() || state.current_payload_request().is_some()
            {
                Vec::new()
            } else {
                vec![fetch_payload(&mut state, false)]
            }
        }
        Msg::DownloadClicked => {
            state.set_downloading(true);
            state.clear_error();
            if state.has_blank_url() {
                state.set_error(BLANK_DOWNLOAD_URL_ERROR);
                state.set_downloading(false);
                Vec::new()
            } else if let Some(payload) = state.cached_payload().cloned() {
                vec![save_effect(&state, payload)]
            } else if let Some(request) = state.current_payload_request() {
                // Join the fetch already under way instead of issuing a second POST.
                request.save_after = true;
                Vec::new()
            } else {
                vec![fetch_payload(&mut state, true)]
            }
        }
        Msg::PayloadFetched { ticket, result } => {
            let Some(request) = state.finish_payload_request(ticket) else {
                return (state, Vec::new());
            };
            if !state.is_current(ticket) {
                // Bytes for a URL the user moved away from never reach the cache.
                if request.save_after {
                    state.set_downloading(false);
                }
                return (state, Vec::new());
            }
            match result {
                Ok(payload) => {
                    state.store_payload(payload.clone());
                    if request.save_after {
                        vec![save_effect(&state, payload)]
                    } else {
                        Vec::new()
                    }
                }
                Err(message) => {
                    state.set_error(message);
                    if request.save_after {
                        state.set_downloading(false);
                    }
                    Vec::new()
                }
            }
        }
        Msg::SaveFinished { result } => {
            state.set_downloading(false);
            match result {
                Ok(location) => state.set_last_saved(location),
                Err(message) => state.set_error(message),
            }
            Vec::new()
        }
        Msg::Teardown => match state.take_pending_debounce() {
            Some(_) => vec![Effect::CancelDebounce],
            None => Vec::new(),
        },
    };

    (state, effects)
}

fn fire_metadata_request(state: &mut SessionState) -> Effect {
    let ticket = state.begin_metadata_request();
    Effect::FetchMetadata {
        ticket,
        url: state.url().trim().to_string(),
    }
}

fn fetch_payload(state: &mut SessionState, save_after: bool) -> Effect {
    let ticket = state.begin_payload_request(save_after);
    Effect::FetchPayload {
        ticket,
        url: state.url().trim().to_string(),
    }
}

fn save_effect(state: &SessionState, payload: crate::MediaPayload) -> Effect {
    let title = state.metadata().map(|metadata| metadata.title.as_str());
    Effect::SavePayload {
        payload,
        file_name: save_file_name(title),
    }
}
