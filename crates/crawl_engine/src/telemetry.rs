//! Fire-and-forget "video viewed" reports.
//!
//! A report goes out through exactly one transport: the first one in priority
//! order that can run in the caller's context. A transport that fails is not
//! followed by the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_trace};
use url::Url;

use crate::api::{endpoint, parse_base_url, send_checked};
use crate::engine::EngineCommand;
use crate::settings::ApiSettings;
use crate::wire::ViewReport;
use crate::{ApiError, FailureKind};

const HISTORY_PATH: [&str; 2] = ["api", "log_history"];
const HISTORY_TIMEOUT: Duration = Duration::from_secs(5);

pub trait ViewTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the transport can deliver from the calling thread right now.
    fn is_available(&self) -> bool;

    fn deliver(&self, report: ViewReport) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct Telemetry {
    transports: Arc<Vec<Arc<dyn ViewTransport>>>,
}

impl Telemetry {
    pub fn new(transports: Vec<Arc<dyn ViewTransport>>) -> Self {
        Self {
            transports: Arc::new(transports),
        }
    }

    /// Returns the name of the transport that took the report, if any.
    pub fn report_view(&self, bvid: Option<&str>) -> Option<&'static str> {
        let bvid = bvid.map(str::trim).filter(|bvid| !bvid.is_empty())?;
        let transport = self
            .transports
            .iter()
            .find(|transport| transport.is_available())?;
        let report = ViewReport {
            bvid: bvid.to_string(),
        };
        match transport.deliver(report) {
            Ok(()) => crawl_trace!("view of {} handed to {}", bvid, transport.name()),
            Err(err) => crawl_debug!("view report via {} failed: {}", transport.name(), err),
        }
        Some(transport.name())
    }
}

/// `POST /api/log_history`.
#[derive(Debug, Clone)]
pub struct HistoryEndpoint {
    client: reqwest::Client,
    url: Url,
}

impl HistoryEndpoint {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let url = endpoint(&base, &HISTORY_PATH)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout.min(HISTORY_TIMEOUT))
            .timeout(HISTORY_TIMEOUT)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, url })
    }

    pub async fn post(&self, report: &ViewReport) -> Result<(), ApiError> {
        send_checked(self.client.post(self.url.clone()).json(report))
            .await
            .map(drop)
    }
}

/// Shared sender into the engine worker; closing it ends the worker loop.
pub(crate) struct CommandQueue {
    tx: Mutex<Option<mpsc::Sender<EngineCommand>>>,
}

impl CommandQueue {
    pub(crate) fn new(tx: mpsc::Sender<EngineCommand>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    pub(crate) fn send(&self, command: EngineCommand) -> bool {
        match self.tx.lock() {
            Ok(guard) => guard
                .as_ref()
                .is_some_and(|tx| tx.send(command).is_ok()),
            Err(_) => false,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.tx.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    pub(crate) fn close(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }
}

/// Queues the report on the engine worker, which posts it on its runtime.
pub struct EngineQueueTransport {
    queue: Arc<CommandQueue>,
    alive: Arc<AtomicBool>,
}

impl EngineQueueTransport {
    pub(crate) fn new(queue: Arc<CommandQueue>, alive: Arc<AtomicBool>) -> Self {
        Self { queue, alive }
    }
}

impl ViewTransport for EngineQueueTransport {
    fn name(&self) -> &'static str {
        "engine-queue"
    }

    fn is_available(&self) -> bool {
        self.alive.load(Ordering::Acquire) && self.queue.is_open()
    }

    fn deliver(&self, report: ViewReport) -> Result<(), ApiError> {
        if self.queue.send(EngineCommand::DeliverView(report)) {
            Ok(())
        } else {
            Err(ApiError::new(FailureKind::Network, "engine queue closed"))
        }
    }
}

/// Spawns the post on the caller's tokio runtime and returns immediately.
pub struct KeepAliveTransport {
    endpoint: Arc<HistoryEndpoint>,
}

impl KeepAliveTransport {
    pub fn new(endpoint: Arc<HistoryEndpoint>) -> Self {
        Self { endpoint }
    }
}

impl ViewTransport for KeepAliveTransport {
    fn name(&self) -> &'static str {
        "keep-alive"
    }

    fn is_available(&self) -> bool {
        tokio::runtime::Handle::try_current().is_ok()
    }

    fn deliver(&self, report: ViewReport) -> Result<(), ApiError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            if let Err(err) = endpoint.post(&report).await {
                crawl_debug!("view report for {} failed: {}", report.bvid, err);
            }
        });
        Ok(())
    }
}

/// Last resort for plain threads: posts on a throwaway current-thread runtime.
pub struct BlockingTransport {
    endpoint: Arc<HistoryEndpoint>,
}

impl BlockingTransport {
    pub fn new(endpoint: Arc<HistoryEndpoint>) -> Self {
        Self { endpoint }
    }
}

impl ViewTransport for BlockingTransport {
    fn name(&self) -> &'static str {
        "blocking"
    }

    fn is_available(&self) -> bool {
        tokio::runtime::Handle::try_current().is_err()
    }

    fn deliver(&self, report: ViewReport) -> Result<(), ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        runtime.block_on(self.endpoint.post(&report))
    }
}
