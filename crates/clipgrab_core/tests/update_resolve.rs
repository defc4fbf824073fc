use std::sync::Once;

use clipgrab_core::{update, Effect, MediaPayload, Metadata, Msg, SessionState, BLANK_URL_ERROR};
use pretty_assertions::assert_eq;

const URL: &str = "https://tiktok.com/@a/video/1";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(session_logging::initialize_for_tests);
}

fn cat_video() -> Metadata {
    Metadata {
        title: "Cat video".to_string(),
        thumbnail_url: Some("http://t/1.jpg".to_string()),
        original_url: URL.to_string(),
    }
}

fn armed_ticket(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ArmDebounce { ticket } => Some(*ticket),
            _ => None,
        })
        .expect("arm effect")
}

fn fetch_ticket(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchMetadata { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("fetch effect")
}

/// Types `url`, lets the debounce elapse and returns the metadata request ticket.
fn type_and_settle(state: SessionState, url: &str) -> (SessionState, u64) {
    let (state, effects) = update(state, Msg::UrlChanged(url.to_string()));
    let ticket = armed_ticket(&effects);
    let (state, effects) = update(state, Msg::DebounceElapsed { ticket });
    (state, fetch_ticket(&effects))
}

#[test]
fn typing_arms_debounce_without_fetching() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::UrlChanged(URL.to_string()));

    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::ArmDebounce { .. }));
    assert_eq!(state.url(), URL);
    assert!(!state.loading());
    assert!(state.pending_debounce().is_some());
}

#[test]
fn only_latest_timer_fires_for_latest_value() {
    init_logging();
    let (state, first) = update(SessionState::new(), Msg::UrlChanged("https://a".to_string()));
    let (state, second) = update(state, Msg::UrlChanged("https://ab".to_string()));
    let (state, third) = update(state, Msg::UrlChanged("https://abc".to_string()));

    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            ticket: armed_ticket(&first),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            ticket: armed_ticket(&second),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.loading());

    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            ticket: armed_ticket(&third),
        },
    );
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::FetchMetadata { url, .. } => assert_eq!(url, "https://abc"),
        other => panic!("unexpected effect {other:?}"),
    }
    assert!(state.loading());
    assert!(state.pending_debounce().is_none());
}

#[test]
fn blank_input_clears_synchronously_and_cancels_timer() {
    init_logging();
    let (state, ticket) = type_and_settle(SessionState::new(), URL);
    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket,
            result: Ok(cat_video()),
        },
    );
    let (state, _) = update(state, Msg::DownloadClicked);
    let (state, _) = update(state, Msg::UrlChanged("https://other".to_string()));
    assert!(state.pending_debounce().is_some());

    let (state, effects) = update(state, Msg::UrlChanged("   ".to_string()));
    assert_eq!(effects, vec![Effect::CancelDebounce]);
    assert!(state.metadata().is_none());
    assert!(state.cached_payload().is_none());
    assert!(state.error().is_none());
    assert!(state.pending_debounce().is_none());

    let (_state, effects) = update(state, Msg::UrlChanged(String::new()));
    assert!(effects.is_empty());
}

#[test]
fn url_change_clears_derived_fields_before_debounce_fires() {
    init_logging();
    let (state, ticket) = type_and_settle(SessionState::new(), URL);
    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket,
            result: Ok(cat_video()),
        },
    );
    let (state, effects) = update(state, Msg::PayloadRequested);
    let payload_ticket = match &effects[0] {
        Effect::FetchPayload { ticket, .. } => *ticket,
        other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::PayloadFetched {
            ticket: payload_ticket,
            result: Ok(MediaPayload::new(vec![0u8; 4], Some("video/mp4"))),
        },
    );
    assert!(state.cached_payload().is_some());
    assert!(state.metadata().is_some());

    let (state, _) = update(state, Msg::UrlChanged(format!("{URL}?s=2")));
    assert!(state.metadata().is_none());
    assert!(state.cached_payload().is_none());
    assert!(state.error().is_none());
}

#[test]
fn successful_resolution_stores_metadata_and_clears_loading() {
    init_logging();
    let (state, ticket) = type_and_settle(SessionState::new(), URL);
    assert!(state.loading());

    let (mut state, effects) = update(
        state,
        Msg::MetadataResolved {
            ticket,
            result: Ok(cat_video()),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.loading());
    assert_eq!(state.metadata(), Some(&cat_video()));
    assert_eq!(state.view().title(), Some("Cat video"));
    assert!(state.consume_dirty());
}

#[test]
fn resolution_never_requests_payload() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::UrlChanged(URL.to_string()));
    let (state, fire) = update(
        state,
        Msg::DebounceElapsed {
            ticket: armed_ticket(&effects),
        },
    );
    let (_state, done) = update(
        state,
        Msg::MetadataResolved {
            ticket: fetch_ticket(&fire),
            result: Ok(cat_video()),
        },
    );
    let all: Vec<_> = effects.iter().chain(&fire).chain(&done).collect();
    assert!(!all
        .iter()
        .any(|effect| matches!(effect, Effect::FetchPayload { .. })));
}

#[test]
fn failed_resolution_stores_error_and_clears_loading() {
    init_logging();
    let (state, ticket) = type_and_settle(SessionState::new(), URL);
    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket,
            result: Err("Error 404: not found".to_string()),
        },
    );

    assert!(!state.loading());
    assert!(state.metadata().is_none());
    assert_eq!(state.error(), Some("Error 404: not found"));
}

#[test]
fn stale_result_is_discarded_but_loading_settles() {
    init_logging();
    let (state, stale) = type_and_settle(SessionState::new(), URL);
    // User edits while the request is in flight; new debounce still pending.
    let (state, _) = update(state, Msg::UrlChanged("https://instagram.com/p/2".to_string()));

    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket: stale,
            result: Ok(cat_video()),
        },
    );
    assert!(state.metadata().is_none());
    assert!(!state.loading());
    assert!(state.pending_debounce().is_some());
}

#[test]
fn superseded_request_does_not_clear_newer_loading() {
    init_logging();
    let (state, old) = type_and_settle(SessionState::new(), URL);
    let (state, new) = type_and_settle(state, "https://instagram.com/p/2");

    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket: old,
            result: Err("Error 500: boom".to_string()),
        },
    );
    assert!(state.loading());
    assert!(state.error().is_none());

    let (state, _) = update(
        state,
        Msg::MetadataResolved {
            ticket: new,
            result: Ok(Metadata {
                title: "Reel".to_string(),
                thumbnail_url: None,
                original_url: "https://instagram.com/p/2".to_string(),
            }),
        },
    );
    assert!(!state.loading());
    assert_eq!(state.metadata().map(|m| m.title.as_str()), Some("Reel"));
}

#[test]
fn resolve_now_cancels_timer_and_fires_immediately() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::UrlChanged(URL.to_string()));
    let (state, effects) = update(state, Msg::ResolveNow);

    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::CancelDebounce);
    assert!(matches!(&effects[1], Effect::FetchMetadata { url, .. } if url == URL));
    assert!(state.loading());
    assert!(state.pending_debounce().is_none());
}

#[test]
fn resolve_now_on_blank_url_reports_validation_error() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::ResolveNow);

    assert!(effects.is_empty());
    assert!(!state.loading());
    assert_eq!(state.error(), Some(BLANK_URL_ERROR));
}

#[test]
fn teardown_cancels_pending_timer() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::UrlChanged(URL.to_string()));
    let (state, effects) = update(state, Msg::Teardown);

    assert_eq!(effects, vec![Effect::CancelDebounce]);
    assert!(state.pending_debounce().is_none());
}
