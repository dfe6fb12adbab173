use crate::{HandleId, RequestId, TaskHandle, TaskSubmission};

/// Side effects requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateTask {
        request_id: RequestId,
        submission: TaskSubmission,
    },
    /// Replace any running poll timer with one bound to `handle`.
    StartPolling { handle: TaskHandle },
    StopPolling { handle_id: HandleId },
    PollStatus { handle: TaskHandle, seq: u64 },
    CancelTask { handle: TaskHandle },
    FetchResults { handle: TaskHandle },
    /// Best-effort view report; failures are never fed back.
    RecordView { bvid: String },
}
