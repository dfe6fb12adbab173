mod support;

use crawl_core::{update, AppState, ClientPhase, Effect, Msg, ResultRecord};
use pretty_assertions::assert_eq;
use support::*;

#[test]
fn resubmit_stops_old_timer_before_creating() {
    init_logging();
    let (state, old) = start_task(AppState::new(), "t-old");
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(effects.len(), 2);
    assert_eq!(
        effects[0],
        Effect::StopPolling {
            handle_id: old.handle_id
        }
    );
    assert!(matches!(effects[1], Effect::CreateTask { request_id: 2, .. }));
    assert_eq!(state.view().phase, ClientPhase::Submitting);
    assert_eq!(state.session().timer(), None);
}

#[test]
fn stale_poll_response_is_never_rendered_against_new_handle() {
    init_logging();
    let (state, old) = start_task(AppState::new(), "t-old");
    // Poll for the old task is in flight when the user resubmits.
    let (state, old_seq) = poll_due(state, &old);
    let (state, effects) = update(state, Msg::SubmitClicked);
    let request_id = request_id_of(&effects);

    // Old response lands while the new task is being created.
    let (state, effects) = receive(state, &old, old_seq, snapshot("running", 90, &["old"]));
    assert!(effects.is_empty());
    assert_eq!(state.view().progress, 0);

    let (state, new) = created(state, request_id, "t-new");
    assert_ne!(new.handle_id, old.handle_id);
    assert_eq!(state.session().timer(), Some(new.handle_id));

    // And again after the new handle is installed, even as a terminal status.
    let (state, effects) = receive(state, &old, old_seq, snapshot("succeeded", 100, &["old"]));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, ClientPhase::Polling);
    assert_eq!(view.progress, 0);
    assert_eq!(view.badge.label, "running");
    assert_eq!(
        view.current_task_label.as_deref(),
        Some("Current task: t-new (created 12:00:00)")
    );
}

#[test]
fn old_timer_ticks_are_ignored_after_supersession() {
    init_logging();
    let (state, old) = start_task(AppState::new(), "t-old");
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (state, new) = created(state, request_id_of(&effects), "t-new");

    let (state, effects) = update(
        state,
        Msg::PollDue {
            handle_id: old.handle_id,
        },
    );
    assert!(effects.is_empty());

    let (_state, effects) = update(
        state,
        Msg::PollDue {
            handle_id: new.handle_id,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::PollStatus {
            handle: new.clone(),
            seq: 1
        }]
    );
}

#[test]
fn stale_failures_and_results_are_discarded() {
    init_logging();
    let (state, old) = start_task(AppState::new(), "t-old");
    let (state, _) = tick(state, &old, snapshot("succeeded", 100, &[]));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (state, new) = created(state, request_id_of(&effects), "t-new");
    let before = state.view();

    let (state, _) = update(
        state,
        Msg::ResultsReceived {
            handle_id: old.handle_id,
            records: vec![ResultRecord::default()],
        },
    );
    let (state, _) = update(
        state,
        Msg::PollFailed {
            handle_id: old.handle_id,
            error: "late".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::CancelFailed {
            handle_id: old.handle_id,
            error: "late".to_string(),
        },
    );
    assert_eq!(state.view(), before);

    // The new handle gets its own single results fetch.
    let (_state, effects) = tick(state, &new, snapshot("succeeded", 100, &[]));
    assert_eq!(
        count_effects(&effects, |e| matches!(e, Effect::FetchResults { handle } if handle.handle_id == new.handle_id)),
        1
    );
}

#[test]
fn failed_resubmission_keeps_old_task_untracked() {
    init_logging();
    let (state, old) = start_task(AppState::new(), "t-old");
    let (state, effects) = update(state, Msg::SubmitClicked);
    let request_id = request_id_of(&effects);
    let (state, _) = update(
        state,
        Msg::TaskCreateFailed {
            request_id,
            error: "network error".to_string(),
        },
    );

    assert_eq!(state.view().phase, ClientPhase::Idle);
    assert_eq!(state.view().current_task_label, None);
    let (_state, effects) = update(
        state,
        Msg::PollDue {
            handle_id: old.handle_id,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn signals_for_unknown_handles_leave_state_clean() {
    init_logging();
    let (mut state, current) = start_task(AppState::new(), "t-now");
    state.consume_dirty();
    let before = state.clone();
    let stranger = current.handle_id + 100;

    let (state, due) = update(state, Msg::PollDue { handle_id: stranger });
    let (mut state, failed) = update(
        state,
        Msg::PollFailed {
            handle_id: stranger,
            error: "timeout".to_string(),
        },
    );

    assert!(due.is_empty());
    assert!(failed.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}
