#![allow(dead_code)]

use std::sync::Once;

use crawl_core::{update, AppState, Effect, Msg, RequestId, TaskHandle, TaskSnapshot, TaskStatus};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawl_logging::initialize_for_tests);
}

/// Fills the form and clicks Start.
pub fn submit(state: AppState, keywords: &str, pages: &str, persist: bool) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::KeywordsChanged(keywords.to_string()));
    let (state, _) = update(state, Msg::MaxPagesChanged(pages.to_string()));
    let (state, _) = update(state, Msg::PersistToggled(persist));
    update(state, Msg::SubmitClicked)
}

pub fn request_id_of(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::CreateTask { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("create effect")
}

pub fn created(state: AppState, request_id: RequestId, task_id: &str) -> (AppState, TaskHandle) {
    let (state, effects) = update(
        state,
        Msg::TaskCreated {
            request_id,
            task_id: task_id.to_string(),
            created_at: "12:00:00".to_string(),
        },
    );
    let handle = effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::StartPolling { handle } => Some(handle),
            _ => None,
        })
        .expect("start polling effect");
    (state, handle)
}

/// Submits and accepts creation in one step.
pub fn start_task(state: AppState, task_id: &str) -> (AppState, TaskHandle) {
    let (state, effects) = submit(state, "drone", "3", false);
    let request_id = request_id_of(&effects);
    created(state, request_id, task_id)
}

/// Fires the timer for `handle`; returns the issued sequence number.
pub fn poll_due(state: AppState, handle: &TaskHandle) -> (AppState, u64) {
    let (state, effects) = update(
        state,
        Msg::PollDue {
            handle_id: handle.handle_id,
        },
    );
    let seq = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::PollStatus { seq, .. } => Some(*seq),
            _ => None,
        })
        .expect("poll effect");
    (state, seq)
}

pub fn snapshot(status: &str, progress: i64, logs: &[&str]) -> TaskSnapshot {
    TaskSnapshot {
        status: TaskStatus::from_wire(Some(status)),
        progress,
        logs: logs.iter().map(|line| line.to_string()).collect(),
    }
}

pub fn receive(
    state: AppState,
    handle: &TaskHandle,
    seq: u64,
    snapshot: TaskSnapshot,
) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::SnapshotReceived {
            handle_id: handle.handle_id,
            seq,
            snapshot,
        },
    )
}

/// One full timer tick: due, request, response.
pub fn tick(state: AppState, handle: &TaskHandle, snap: TaskSnapshot) -> (AppState, Vec<Effect>) {
    let (state, seq) = poll_due(state, handle);
    receive(state, handle, seq, snap)
}

pub fn count_effects(effects: &[Effect], pred: impl Fn(&Effect) -> bool) -> usize {
    effects.iter().filter(|&effect| pred(effect)).count()
}
