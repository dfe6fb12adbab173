use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::api::{ReqwestTaskApi, TaskApi};
use crate::settings::EngineSettings;
use crate::telemetry::{
    BlockingTransport, CommandQueue, EngineQueueTransport, HistoryEndpoint, KeepAliveTransport,
    Telemetry,
};
use crate::wire::ViewReport;
use crate::{CrawlRequest, EngineError, EngineEvent, HandleId, RequestId};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

#[derive(Clone)]
pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) enum EngineCommand {
    CreateTask {
        request_id: RequestId,
        request: CrawlRequest,
    },
    StartPolling {
        handle_id: HandleId,
    },
    StopPolling {
        handle_id: HandleId,
    },
    PollStatus {
        handle_id: HandleId,
        task_id: String,
        seq: u64,
    },
    CancelTask {
        handle_id: HandleId,
        task_id: String,
    },
    FetchResults {
        handle_id: HandleId,
        task_id: String,
    },
    DeliverView(ViewReport),
}

/// Receiving side of the engine; may be moved to another thread.
pub struct EngineEvents {
    rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.rx.recv().ok()
    }
}

/// Runs task API calls and poll timers on a worker thread with its own runtime.
pub struct EngineHandle {
    queue: Arc<CommandQueue>,
    telemetry: Telemetry,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<(Self, EngineEvents), EngineError> {
        let api = Arc::new(ReqwestTaskApi::new(&settings.api)?);
        Self::with_api(settings, api)
    }

    pub fn with_api(
        settings: EngineSettings,
        api: Arc<dyn TaskApi>,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let history = Arc::new(HistoryEndpoint::new(&settings.api)?);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("crawl-engine-io")
            .build()?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let queue = Arc::new(CommandQueue::new(cmd_tx));
        let alive = Arc::new(AtomicBool::new(true));

        let worker = Worker {
            api,
            history: history.clone(),
            sink: Arc::new(ChannelEventSink::new(event_tx)),
            scheduler: PollScheduler::default(),
            poll_interval: settings.poll_interval.max(MIN_POLL_INTERVAL),
            poll_deadline: settings.poll_deadline,
            tracker: TaskTracker::new(),
        };
        let grace = settings.shutdown_grace;
        let worker_alive = alive.clone();
        let join = thread::Builder::new()
            .name("crawl-engine".to_string())
            .spawn(move || {
                let mut worker = worker;
                while let Ok(command) = cmd_rx.recv() {
                    worker.handle(&runtime, command);
                }
                worker.drain(runtime, grace);
                worker_alive.store(false, Ordering::Release);
                crawl_info!("engine worker stopped");
            })?;

        let telemetry = Telemetry::new(vec![
            Arc::new(EngineQueueTransport::new(queue.clone(), alive)),
            Arc::new(KeepAliveTransport::new(history.clone())),
            Arc::new(BlockingTransport::new(history)),
        ]);

        let handle = Self {
            queue,
            telemetry,
            worker: Some(join),
        };
        Ok((handle, EngineEvents { rx: event_rx }))
    }

    pub fn create_task(&self, request_id: RequestId, request: CrawlRequest) {
        self.send(EngineCommand::CreateTask {
            request_id,
            request,
        });
    }

    /// Starts the poll timer for `handle_id`. Every other handle becomes stale.
    pub fn start_polling(&self, handle_id: HandleId) {
        self.send(EngineCommand::StartPolling { handle_id });
    }

    pub fn stop_polling(&self, handle_id: HandleId) {
        self.send(EngineCommand::StopPolling { handle_id });
    }

    pub fn poll_status(&self, handle_id: HandleId, task_id: impl Into<String>, seq: u64) {
        self.send(EngineCommand::PollStatus {
            handle_id,
            task_id: task_id.into(),
            seq,
        });
    }

    pub fn cancel_task(&self, handle_id: HandleId, task_id: impl Into<String>) {
        self.send(EngineCommand::CancelTask {
            handle_id,
            task_id: task_id.into(),
        });
    }

    pub fn fetch_results(&self, handle_id: HandleId, task_id: impl Into<String>) {
        self.send(EngineCommand::FetchResults {
            handle_id,
            task_id: task_id.into(),
        });
    }

    pub fn report_view(&self, bvid: Option<&str>) -> Option<&'static str> {
        self.telemetry.report_view(bvid)
    }

    /// Reporter that keeps working after the engine is shut down.
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }

    /// Stops all timers and waits for the worker. Queued commands and in-flight
    /// calls get the configured grace period to finish.
    pub fn shutdown(mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                crawl_warn!("engine worker panicked");
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        if !self.queue.send(command) {
            crawl_warn!("engine command dropped: worker is gone");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.queue.close();
    }
}

struct Worker {
    api: Arc<dyn TaskApi>,
    history: Arc<HistoryEndpoint>,
    sink: Arc<dyn EventSink>,
    scheduler: PollScheduler,
    poll_interval: Duration,
    poll_deadline: Option<Duration>,
    tracker: TaskTracker,
}

impl Worker {
    /// Spawns tracked work so shutdown can wait for it.
    fn spawn<F>(&self, runtime: &tokio::runtime::Runtime, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn_on(task, runtime.handle());
    }

    /// Waits up to `grace` for tracked work, then stops the runtime.
    fn drain(mut self, runtime: tokio::runtime::Runtime, grace: Duration) {
        self.scheduler.stop_all();
        self.tracker.close();
        let tracker = self.tracker.clone();
        if runtime
            .block_on(tokio::time::timeout(grace, tracker.wait()))
            .is_err()
        {
            crawl_warn!(
                "{} engine tasks still running after {:?}; dropping them",
                tracker.len(),
                grace
            );
        }
        drop(self);
        runtime.shutdown_background();
    }

    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::CreateTask {
                request_id,
                request,
            } => {
                crawl_info!(
                    "create task request_id={} keywords={} max_pages={} save={}",
                    request_id,
                    request.keywords.len(),
                    request.max_pages,
                    request.persist
                );
                let api = self.api.clone();
                let sink = self.sink.clone();
                self.spawn(runtime, async move {
                    let result = api.create_task(&request).await;
                    if let Err(err) = &result {
                        crawl_warn!("create task request_id={} failed: {}", request_id, err);
                    }
                    sink.emit(EngineEvent::TaskCreated { request_id, result });
                });
            }
            EngineCommand::StartPolling { handle_id } => {
                let token = self.scheduler.start(handle_id);
                crawl_debug!(
                    "poll timer started handle={} every {:?}",
                    handle_id,
                    self.poll_interval
                );
                self.spawn(
                    runtime,
                    run_poll_timer(
                        handle_id,
                        self.poll_interval,
                        self.poll_deadline,
                        token,
                        self.sink.clone(),
                    ),
                );
            }
            EngineCommand::StopPolling { handle_id } => {
                if self.scheduler.stop(handle_id) {
                    crawl_debug!("poll timer stopped handle={}", handle_id);
                }
            }
            EngineCommand::PollStatus {
                handle_id,
                task_id,
                seq,
            } => {
                crawl_debug!("poll status {} seq={} handle={}", task_id, seq, handle_id);
                let scope = self.scheduler.scope(handle_id);
                let api = self.api.clone();
                let sink = self.sink.clone();
                self.spawn(runtime, async move {
                    let result = api.task_status(&task_id).await;
                    if scope.is_cancelled() {
                        crawl_debug!("status poll {} for stale handle {} dropped", seq, handle_id);
                        return;
                    }
                    if let Err(err) = &result {
                        crawl_warn!("status poll for {} failed: {}", task_id, err);
                    }
                    sink.emit(EngineEvent::StatusFetched {
                        handle_id,
                        seq,
                        result,
                    });
                });
            }
            EngineCommand::CancelTask { handle_id, task_id } => {
                crawl_info!("cancel task {} handle={}", task_id, handle_id);
                let scope = self.scheduler.scope(handle_id);
                let api = self.api.clone();
                let sink = self.sink.clone();
                self.spawn(runtime, async move {
                    let result = api.cancel_task(&task_id).await;
                    if let Err(err) = &result {
                        crawl_warn!("cancel of {} failed: {}", task_id, err);
                    }
                    if scope.is_cancelled() {
                        crawl_debug!("cancel outcome for stale handle {} dropped", handle_id);
                        return;
                    }
                    sink.emit(EngineEvent::CancelFinished { handle_id, result });
                });
            }
            EngineCommand::FetchResults { handle_id, task_id } => {
                crawl_debug!("fetch results {} handle={}", task_id, handle_id);
                let scope = self.scheduler.scope(handle_id);
                let api = self.api.clone();
                let sink = self.sink.clone();
                self.spawn(runtime, async move {
                    let result = api.task_results(&task_id).await;
                    if scope.is_cancelled() {
                        crawl_debug!("results for stale handle {} dropped", handle_id);
                        return;
                    }
                    match &result {
                        Ok(records) => crawl_info!("task {} returned {} records", task_id, records.len()),
                        Err(err) => crawl_warn!("results for {} failed: {}", task_id, err),
                    }
                    sink.emit(EngineEvent::ResultsFetched { handle_id, result });
                });
            }
            EngineCommand::DeliverView(report) => {
                let history = self.history.clone();
                self.spawn(runtime, async move {
                    if let Err(err) = history.post(&report).await {
                        crawl_debug!("view report for {} failed: {}", report.bvid, err);
                    }
                });
            }
        }
    }
}

struct PollScope {
    scope: CancellationToken,
    timer: Option<CancellationToken>,
}

impl PollScope {
    fn new() -> Self {
        Self {
            scope: CancellationToken::new(),
            timer: None,
        }
    }
}

/// One cancellation scope per handle. Timers are children of their scope.
/// Requests are never aborted; a cancelled scope only marks their outcome stale.
#[derive(Default)]
struct PollScheduler {
    scopes: HashMap<HandleId, PollScope>,
}

impl PollScheduler {
    fn start(&mut self, handle_id: HandleId) -> CancellationToken {
        self.scopes.retain(|&id, scope| {
            if id == handle_id {
                return true;
            }
            scope.scope.cancel();
            false
        });
        let entry = self.scopes.entry(handle_id).or_insert_with(PollScope::new);
        if let Some(previous) = entry.timer.take() {
            previous.cancel();
        }
        let timer = entry.scope.child_token();
        entry.timer = Some(timer.clone());
        timer
    }

    fn stop(&mut self, handle_id: HandleId) -> bool {
        self.scopes
            .get_mut(&handle_id)
            .and_then(|scope| scope.timer.take())
            .map(|timer| timer.cancel())
            .is_some()
    }

    fn scope(&mut self, handle_id: HandleId) -> CancellationToken {
        self.scopes
            .entry(handle_id)
            .or_insert_with(PollScope::new)
            .scope
            .clone()
    }

    fn stop_all(&mut self) {
        for (_, scope) in self.scopes.drain() {
            scope.scope.cancel();
        }
    }
}

async fn run_poll_timer(
    handle_id: HandleId,
    interval: Duration,
    deadline: Option<Duration>,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if let Some(limit) = deadline {
                    if started.elapsed() >= limit {
                        crawl_warn!("polling handle {} gave up after {:?}", handle_id, limit);
                        sink.emit(EngineEvent::PollDeadlineExceeded { handle_id, limit });
                        break;
                    }
                }
                sink.emit(EngineEvent::PollDue { handle_id });
            }
        }
    }
}
