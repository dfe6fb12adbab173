/// Server-reported task status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Anything the client does not recognise; treated as still in progress.
    Unknown(String),
}

impl TaskStatus {
    /// A missing status reads as `Running`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return TaskStatus::Running;
        };
        match raw.to_ascii_lowercase().as_str() {
            "" | "running" => TaskStatus::Running,
            "pending" => TaskStatus::Pending,
            "succeeded" => TaskStatus::Succeeded,
            "failed" => TaskStatus::Failed,
            "cancelled" => TaskStatus::Cancelled,
            _ => TaskStatus::Unknown(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown(raw) => raw,
        }
    }
}

/// Latest status poll for the current task. Replaced wholesale on each poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    /// Raw percent as reported; clamped when displayed.
    pub progress: i64,
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::TaskStatus;
    use crate::ClientPhase;

    #[test]
    fn parses_known_statuses() {
        assert_eq!(TaskStatus::from_wire(Some("succeeded")), TaskStatus::Succeeded);
        assert_eq!(TaskStatus::from_wire(Some("FAILED")), TaskStatus::Failed);
        assert_eq!(TaskStatus::from_wire(Some("cancelled")), TaskStatus::Cancelled);
        assert_eq!(TaskStatus::from_wire(Some("pending")), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_wire(None), TaskStatus::Running);
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let status = TaskStatus::from_wire(Some("paused"));
        assert_eq!(status, TaskStatus::Unknown("paused".to_string()));
        assert_eq!(ClientPhase::from_terminal(&status), None);
        assert_eq!(status.label(), "paused");
    }

    #[test]
    fn only_final_statuses_end_polling() {
        let phases: Vec<_> = ["pending", "running", "succeeded", "failed", "cancelled"]
            .into_iter()
            .map(|raw| ClientPhase::from_terminal(&TaskStatus::from_wire(Some(raw))))
            .collect();
        assert_eq!(
            phases,
            vec![
                None,
                None,
                Some(ClientPhase::Succeeded),
                Some(ClientPhase::Failed),
                Some(ClientPhase::Cancelled),
            ]
        );
    }
}
