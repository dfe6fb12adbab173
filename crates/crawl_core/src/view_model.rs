use crate::{ClientPhase, ResultsTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    /// Task is actively running.
    Active,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub style: BadgeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: ClientPhase,
    pub keywords_input: String,
    pub max_pages_input: String,
    pub persist: bool,
    pub submit_enabled: bool,
    pub cancel_enabled: bool,
    pub current_task_label: Option<String>,
    pub progress: u8,
    pub progress_label: String,
    pub badge: StatusBadge,
    pub log_text: String,
    pub results: ResultsTable,
    pub opened_url: Option<String>,
}
