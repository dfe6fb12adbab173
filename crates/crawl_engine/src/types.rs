use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type HandleId = u64;
pub type RequestId = u64;

/// Body of a create-task call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub keywords: Vec<String>,
    pub max_pages: u32,
    pub persist: bool,
}

/// Normalised status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: Option<String>,
    pub progress: i64,
    pub logs: Vec<String>,
}

/// Normalised result row; counts are already coerced to integers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlRecord {
    pub bvid: Option<String>,
    pub title: Option<String>,
    pub up_name: Option<String>,
    pub view_count: i64,
    pub favorite_count: i64,
    pub tags: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TaskCreated {
        request_id: RequestId,
        result: Result<String, ApiError>,
    },
    PollDue {
        handle_id: HandleId,
    },
    PollDeadlineExceeded {
        handle_id: HandleId,
        limit: Duration,
    },
    StatusFetched {
        handle_id: HandleId,
        seq: u64,
        result: Result<StatusReport, ApiError>,
    },
    CancelFinished {
        handle_id: HandleId,
        result: Result<(), ApiError>,
    },
    ResultsFetched {
        handle_id: HandleId,
        result: Result<Vec<CrawlRecord>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "invalid response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}
