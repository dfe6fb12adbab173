use crate::{HandleId, RequestId, ResultRecord, TaskSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the keyword box.
    KeywordsChanged(String),
    /// User edited the page-count box.
    MaxPagesChanged(String),
    /// User toggled the persist checkbox.
    PersistToggled(bool),
    /// User clicked Start.
    SubmitClicked,
    /// User clicked Cancel.
    CancelClicked,
    /// User opened a rendered result row.
    PlayRequested { row: usize },
    /// Server accepted the creation request.
    TaskCreated {
        request_id: RequestId,
        task_id: String,
        created_at: String,
    },
    /// Creation request failed at the network or protocol level.
    TaskCreateFailed { request_id: RequestId, error: String },
    /// Poll timer fired for a handle.
    PollDue { handle_id: HandleId },
    /// Status response for a poll issued with `seq`.
    SnapshotReceived {
        handle_id: HandleId,
        seq: u64,
        snapshot: TaskSnapshot,
    },
    /// Status request failed, or polling gave up.
    PollFailed { handle_id: HandleId, error: String },
    /// Cancellation request failed; polling carries on.
    CancelFailed { handle_id: HandleId, error: String },
    ResultsReceived {
        handle_id: HandleId,
        records: Vec<ResultRecord>,
    },
    ResultsFailed { handle_id: HandleId, error: String },
}
