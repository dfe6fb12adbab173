//! Crawl client core: pure task-lifecycle state machine and view-model helpers.
mod effect;
mod format;
mod msg;
mod results;
mod snapshot;
mod state;
mod submission;
mod update;
mod view_model;

pub use effect::Effect;
pub use format::{
    build_play_url, clamp_progress, format_count, format_duration, INERT_LINK, PLAY_URL_BASE,
};
pub use msg::Msg;
pub use results::{
    render_results, PlayLink, ResultRecord, ResultRow, ResultsTable, TableBody, EMPTY_FIELD,
    MAX_RENDERED_ROWS, NO_DATA,
};
pub use snapshot::{TaskSnapshot, TaskStatus};
pub use state::{
    AppState, ClientPhase, HandleId, RequestId, TaskHandle, TaskSession, IDLE_STATUS, NO_LOGS,
};
pub use submission::{parse_keywords, parse_max_pages, TaskSubmission, DEFAULT_MAX_PAGES};
pub use update::{update, CREATING_TASK, RUNNING_STATUS};
pub use view_model::{AppViewModel, BadgeStyle, StatusBadge};
