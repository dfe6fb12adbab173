use crate::{build_play_url, AppState, ClientPhase, Effect, HandleId, Msg};

pub const CREATING_TASK: &str = "Creating task...";
pub const RUNNING_STATUS: &str = "running";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::KeywordsChanged(raw) => {
            state.set_keywords(raw);
            Vec::new()
        }
        Msg::MaxPagesChanged(raw) => {
            state.set_max_pages(raw);
            Vec::new()
        }
        Msg::PersistToggled(persist) => {
            state.set_persist(persist);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::TaskCreated {
            request_id,
            task_id,
            created_at,
        } => {
            if state.phase() != ClientPhase::Submitting
                || !state.session_mut().finish_request(request_id)
            {
                return (state, Vec::new());
            }
            let handle = state.session_mut().install(task_id, created_at);
            state.set_task_label(Some(&handle));
            state.clear_results();
            state.show(0, RUNNING_STATUS, Vec::new());
            state.set_phase(ClientPhase::Polling);
            vec![Effect::StartPolling { handle }]
        }
        Msg::TaskCreateFailed { request_id, error } => {
            if state.phase() == ClientPhase::Submitting
                && state.session_mut().finish_request(request_id)
            {
                state.reset_to_idle(format!("Task creation failed: {error}"));
            }
            Vec::new()
        }
        Msg::PollDue { handle_id } => {
            if !is_polling(&state, handle_id) || state.session().timer() != Some(handle_id) {
                return (state, Vec::new());
            }
            let Some(handle) = state.session().current().cloned() else {
                return (state, Vec::new());
            };
            let seq = state.session_mut().next_poll_seq();
            vec![Effect::PollStatus { handle, seq }]
        }
        Msg::SnapshotReceived {
            handle_id,
            seq,
            snapshot,
        } => {
            if !is_polling(&state, handle_id) || !state.session_mut().accept_seq(seq) {
                return (state, Vec::new());
            }
            let terminal = ClientPhase::from_terminal(&snapshot.status);
            state.show_snapshot(snapshot);
            match terminal {
                None => Vec::new(),
                Some(phase) => finish_polling(&mut state, phase),
            }
        }
        Msg::PollFailed { handle_id, error } => {
            if !is_polling(&state, handle_id) {
                return (state, Vec::new());
            }
            let effects = stop_timer(&mut state);
            state.reset_to_idle(format!("Poll failed: {error}"));
            effects
        }
        Msg::CancelClicked => match state.session().current() {
            Some(handle) if state.phase() == ClientPhase::Polling => vec![Effect::CancelTask {
                handle: handle.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::CancelFailed { handle_id, error } => {
            if state.session().is_current(handle_id) && state.phase() != ClientPhase::Submitting {
                state.show_logs(vec![format!("Cancel failed: {error}")]);
            }
            Vec::new()
        }
        Msg::ResultsReceived { handle_id, records } => {
            if awaiting_results(&state, handle_id) && !state.has_results() {
                state.set_results(records);
            }
            Vec::new()
        }
        Msg::ResultsFailed { handle_id, error } => {
            if awaiting_results(&state, handle_id) && !state.has_results() {
                state.reset_to_idle(format!("Poll failed: {error}"));
            }
            Vec::new()
        }
        Msg::PlayRequested { row } => match state.rendered_bvid(row) {
            Some(bvid) => {
                state.set_opened_url(build_play_url(Some(&bvid)));
                vec![Effect::RecordView { bvid }]
            }
            None => Vec::new(),
        },
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.phase() == ClientPhase::Submitting {
        return Vec::new();
    }
    // A re-submission supersedes the tracked task: its timer goes first.
    let mut effects = stop_timer(state);
    let submission = state.form_submission();
    let request_id = state.session_mut().begin_request();
    state.set_task_label(None);
    state.show(0, RUNNING_STATUS, vec![CREATING_TASK.to_string()]);
    state.set_phase(ClientPhase::Submitting);
    effects.push(Effect::CreateTask {
        request_id,
        submission,
    });
    effects
}

fn finish_polling(state: &mut AppState, phase: ClientPhase) -> Vec<Effect> {
    let mut effects = stop_timer(state);
    state.set_phase(phase);
    if phase == ClientPhase::Succeeded && state.session_mut().claim_results_fetch() {
        if let Some(handle) = state.session().current().cloned() {
            effects.push(Effect::FetchResults { handle });
        }
    }
    effects
}

fn stop_timer(state: &mut AppState) -> Vec<Effect> {
    state
        .session_mut()
        .stop_timer()
        .map(|handle_id| Effect::StopPolling { handle_id })
        .into_iter()
        .collect()
}

fn is_polling(state: &AppState, handle_id: HandleId) -> bool {
    state.phase() == ClientPhase::Polling && state.session().is_current(handle_id)
}

fn awaiting_results(state: &AppState, handle_id: HandleId) -> bool {
    state.phase() == ClientPhase::Succeeded
        && state.session().is_current(handle_id)
        && state.session().results_requested()
}
