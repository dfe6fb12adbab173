use crate::results::render_results;
use crate::view_model::{AppViewModel, BadgeStyle, StatusBadge};
use crate::{ResultRecord, TaskSnapshot, TaskStatus, DEFAULT_MAX_PAGES};

pub type HandleId = u64;
pub type RequestId = u64;

pub const NO_LOGS: &str = "No logs";
pub const IDLE_STATUS: &str = "idle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
    Cancelled,
}

impl ClientPhase {
    /// A creation request or a poll loop is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(self, ClientPhase::Submitting | ClientPhase::Polling)
    }

    pub(crate) fn from_terminal(status: &TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::Succeeded => Some(ClientPhase::Succeeded),
            TaskStatus::Failed => Some(ClientPhase::Failed),
            TaskStatus::Cancelled => Some(ClientPhase::Cancelled),
            _ => None,
        }
    }
}

/// Server task the session is tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    /// Client-local id; strictly increasing across submissions.
    pub handle_id: HandleId,
    pub task_id: String,
    pub created_at: String,
}

/// The single "current task" of a client session and everything bound to it.
///
/// The handle is only replaced by [`TaskSession::install`], which also rebinds
/// the poll timer, so stale responses can be recognised by handle id alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskSession {
    current: Option<TaskHandle>,
    next_handle_id: HandleId,
    next_request_id: RequestId,
    pending_request: Option<RequestId>,
    timer: Option<HandleId>,
    next_seq: u64,
    last_applied_seq: Option<u64>,
    results_requested: bool,
}

impl TaskSession {
    pub fn current(&self) -> Option<&TaskHandle> {
        self.current.as_ref()
    }

    pub fn is_current(&self, handle_id: HandleId) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| handle.handle_id == handle_id)
    }

    /// Handle the poll timer is bound to, if one is running.
    pub fn timer(&self) -> Option<HandleId> {
        self.timer
    }

    pub fn results_requested(&self) -> bool {
        self.results_requested
    }

    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.pending_request = Some(self.next_request_id);
        self.next_request_id
    }

    pub(crate) fn finish_request(&mut self, request_id: RequestId) -> bool {
        if self.pending_request == Some(request_id) {
            self.pending_request = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn install(&mut self, task_id: String, created_at: String) -> TaskHandle {
        self.next_handle_id += 1;
        let handle = TaskHandle {
            handle_id: self.next_handle_id,
            task_id,
            created_at,
        };
        self.current = Some(handle.clone());
        self.timer = Some(handle.handle_id);
        self.next_seq = 0;
        self.last_applied_seq = None;
        self.results_requested = false;
        handle
    }

    pub(crate) fn stop_timer(&mut self) -> Option<HandleId> {
        self.timer.take()
    }

    pub(crate) fn next_poll_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Accepts a poll response unless a newer one was already applied.
    pub(crate) fn accept_seq(&mut self, seq: u64) -> bool {
        if self.last_applied_seq.is_some_and(|last| seq <= last) {
            return false;
        }
        self.last_applied_seq = Some(seq);
        true
    }

    /// Returns true the first time only.
    pub(crate) fn claim_results_fetch(&mut self) -> bool {
        !std::mem::replace(&mut self.results_requested, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormState {
    keywords: String,
    max_pages: String,
    persist: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            max_pages: DEFAULT_MAX_PAGES.to_string(),
            persist: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Display {
    progress: u8,
    status: String,
    logs: Vec<String>,
    task_label: Option<String>,
    results: Option<Vec<ResultRecord>>,
    opened_url: Option<String>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            progress: 0,
            status: IDLE_STATUS.to_string(),
            logs: Vec::new(),
            task_label: None,
            results: None,
            opened_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    form: FormState,
    phase: ClientPhase,
    session: TaskSession,
    display: Display,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn session(&self) -> &TaskSession {
        &self.session
    }

    pub fn view(&self) -> AppViewModel {
        let results = render_results(self.display.results.as_deref().unwrap_or_default());
        let log_text = if self.display.logs.is_empty() {
            NO_LOGS.to_string()
        } else {
            self.display.logs.join("\n")
        };
        let badge_style = if self.display.status == "running" {
            BadgeStyle::Active
        } else {
            BadgeStyle::Muted
        };
        AppViewModel {
            phase: self.phase,
            keywords_input: self.form.keywords.clone(),
            max_pages_input: self.form.max_pages.clone(),
            persist: self.form.persist,
            submit_enabled: !self.phase.is_busy(),
            cancel_enabled: self.phase == ClientPhase::Polling,
            current_task_label: self.display.task_label.clone(),
            progress: self.display.progress,
            progress_label: format!("{}%", self.display.progress),
            badge: StatusBadge {
                label: self.display.status.clone(),
                style: badge_style,
            },
            log_text,
            results,
            opened_url: self.display.opened_url.clone(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn session_mut(&mut self) -> &mut TaskSession {
        &mut self.session
    }

    pub(crate) fn set_phase(&mut self, phase: ClientPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn set_keywords(&mut self, raw: String) {
        self.dirty |= self.form.keywords != raw;
        self.form.keywords = raw;
    }

    pub(crate) fn set_max_pages(&mut self, raw: String) {
        self.dirty |= self.form.max_pages != raw;
        self.form.max_pages = raw;
    }

    pub(crate) fn set_persist(&mut self, persist: bool) {
        self.dirty |= self.form.persist != persist;
        self.form.persist = persist;
    }

    pub(crate) fn form_submission(&self) -> crate::TaskSubmission {
        crate::TaskSubmission::from_form(
            &self.form.keywords,
            &self.form.max_pages,
            self.form.persist,
        )
    }

    /// Replaces progress, status and log panel in one go.
    pub(crate) fn show(&mut self, progress: u8, status: &str, logs: Vec<String>) {
        let display = &mut self.display;
        if display.progress != progress || display.status != status || display.logs != logs {
            display.progress = progress;
            display.status = status.to_string();
            display.logs = logs;
            self.dirty = true;
        }
    }

    pub(crate) fn show_logs(&mut self, logs: Vec<String>) {
        if self.display.logs != logs {
            self.display.logs = logs;
            self.dirty = true;
        }
    }

    pub(crate) fn show_snapshot(&mut self, snapshot: TaskSnapshot) {
        let progress = crate::clamp_progress(snapshot.progress);
        self.show(progress, snapshot.status.label(), snapshot.logs);
    }

    pub(crate) fn reset_to_idle(&mut self, message: String) {
        self.show(0, IDLE_STATUS, vec![message]);
        self.set_phase(ClientPhase::Idle);
    }

    pub(crate) fn set_task_label(&mut self, handle: Option<&crate::TaskHandle>) {
        let label = handle.map(|handle| {
            format!(
                "Current task: {} (created {})",
                handle.task_id, handle.created_at
            )
        });
        self.dirty |= self.display.task_label != label;
        self.display.task_label = label;
    }

    pub(crate) fn clear_results(&mut self) {
        if self.display.results.is_some() {
            self.display.results = None;
            self.dirty = true;
        }
    }

    pub(crate) fn has_results(&self) -> bool {
        self.display.results.is_some()
    }

    pub(crate) fn set_results(&mut self, records: Vec<ResultRecord>) {
        self.display.results = Some(records);
        self.dirty = true;
    }

    pub(crate) fn rendered_bvid(&self, row: usize) -> Option<String> {
        self.display
            .results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .take(crate::MAX_RENDERED_ROWS)
            .nth(row)
            .and_then(|record| record.bvid.as_deref())
            .map(str::trim)
            .filter(|bvid| !bvid.is_empty())
            .map(ToOwned::to_owned)
    }

    pub(crate) fn set_opened_url(&mut self, url: String) {
        self.dirty |= self.display.opened_url.as_deref() != Some(url.as_str());
        self.display.opened_url = Some(url);
    }
}
