//! Crawl engine: task API client, poll timers and view telemetry.
mod api;
mod engine;
mod settings;
mod telemetry;
mod types;
mod wire;

pub use api::{ReqwestTaskApi, TaskApi};
pub use engine::{ChannelEventSink, EngineEvents, EngineHandle, EventSink};
pub use settings::{ApiSettings, EngineSettings, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
pub use telemetry::{
    BlockingTransport, EngineQueueTransport, HistoryEndpoint, KeepAliveTransport, Telemetry,
    ViewTransport,
};
pub use types::{
    ApiError, CrawlRecord, CrawlRequest, EngineError, EngineEvent, FailureKind, HandleId,
    RequestId, StatusReport,
};
pub use wire::ViewReport;
