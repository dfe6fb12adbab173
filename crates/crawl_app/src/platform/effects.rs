use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use crawl_core::{format_duration, Effect, Msg, ResultRecord, TaskSnapshot, TaskStatus};
use crawl_engine::{
    CrawlRecord, CrawlRequest, EngineEvent, EngineEvents, EngineHandle, EngineSettings,
};
use crawl_logging::{crawl_debug, crawl_info, crawl_trace};

use super::app::AppEvent;

/// Produces the `created_at` stamp for a newly created task.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub struct EffectRunner {
    engine: EngineHandle,
    forwarder: Option<thread::JoinHandle<()>>,
}

impl EffectRunner {
    pub fn new(
        settings: EngineSettings,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let (engine, events) =
            EngineHandle::new(settings).context("failed to start the crawl engine")?;
        let clock: Clock = Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        let forwarder = spawn_event_loop(events, event_tx, clock)?;
        Ok(Self {
            engine,
            forwarder: Some(forwarder),
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CreateTask {
                    request_id,
                    submission,
                } => {
                    crawl_info!(
                        "CreateTask request_id={} keywords={:?} max_pages={}",
                        request_id,
                        submission.keywords,
                        submission.max_pages
                    );
                    self.engine.create_task(
                        request_id,
                        CrawlRequest {
                            keywords: submission.keywords,
                            max_pages: submission.max_pages,
                            persist: submission.persist,
                        },
                    );
                }
                Effect::StartPolling { handle } => {
                    crawl_info!(
                        "StartPolling handle={} task={}",
                        handle.handle_id,
                        handle.task_id
                    );
                    self.engine.start_polling(handle.handle_id);
                }
                Effect::StopPolling { handle_id } => self.engine.stop_polling(handle_id),
                Effect::PollStatus { handle, seq } => {
                    self.engine.poll_status(handle.handle_id, handle.task_id, seq);
                }
                Effect::CancelTask { handle } => {
                    self.engine.cancel_task(handle.handle_id, handle.task_id);
                }
                Effect::FetchResults { handle } => {
                    self.engine.fetch_results(handle.handle_id, handle.task_id);
                }
                Effect::RecordView { bvid } => match self.engine.report_view(Some(&bvid)) {
                    Some(transport) => crawl_trace!("view of {} sent via {}", bvid, transport),
                    None => crawl_debug!("view of {} not reported", bvid),
                },
            }
        }
    }

    /// Shuts the engine down, then waits for the last events to be forwarded.
    pub fn shutdown(mut self) {
        self.engine.shutdown();
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
    }
}

fn spawn_event_loop(
    events: EngineEvents,
    event_tx: mpsc::Sender<AppEvent>,
    clock: Clock,
) -> anyhow::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("crawl-events".to_string())
        .spawn(move || {
            while let Some(event) = events.recv() {
                let Some(msg) = map_event(event, clock.as_ref()) else {
                    continue;
                };
                if event_tx.send(AppEvent::Msg(msg)).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn the event forwarder")
}

/// Translates an engine event into the core message it stands for.
///
/// A successful cancel has no message: the next poll reports the outcome.
pub(crate) fn map_event(
    event: EngineEvent,
    clock: &(dyn Fn() -> String + Send + Sync),
) -> Option<Msg> {
    let msg = match event {
        EngineEvent::TaskCreated { request_id, result } => match result {
            Ok(task_id) => Msg::TaskCreated {
                request_id,
                task_id,
                created_at: clock(),
            },
            Err(err) => Msg::TaskCreateFailed {
                request_id,
                error: err.to_string(),
            },
        },
        EngineEvent::PollDue { handle_id } => Msg::PollDue { handle_id },
        EngineEvent::PollDeadlineExceeded { handle_id, limit } => Msg::PollFailed {
            handle_id,
            error: format!(
                "no final status after {}",
                format_duration(limit.as_secs_f64())
            ),
        },
        EngineEvent::StatusFetched {
            handle_id,
            seq,
            result,
        } => match result {
            Ok(report) => Msg::SnapshotReceived {
                handle_id,
                seq,
                snapshot: TaskSnapshot {
                    status: TaskStatus::from_wire(report.status.as_deref()),
                    progress: report.progress,
                    logs: report.logs,
                },
            },
            Err(err) => Msg::PollFailed {
                handle_id,
                error: err.to_string(),
            },
        },
        EngineEvent::CancelFinished { handle_id, result } => match result {
            Ok(()) => return None,
            Err(err) => Msg::CancelFailed {
                handle_id,
                error: err.to_string(),
            },
        },
        EngineEvent::ResultsFetched { handle_id, result } => match result {
            Ok(records) => Msg::ResultsReceived {
                handle_id,
                records: records.into_iter().map(to_result_record).collect(),
            },
            Err(err) => Msg::ResultsFailed {
                handle_id,
                error: err.to_string(),
            },
        },
    };
    Some(msg)
}

fn to_result_record(record: CrawlRecord) -> ResultRecord {
    ResultRecord {
        bvid: record.bvid,
        title: record.title,
        up_name: record.up_name,
        view_count: record.view_count,
        favorite_count: record.favorite_count,
        tags: record.tags,
        subject: record.subject,
        category: record.category,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crawl_engine::{ApiError, StatusReport};
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixed_clock() -> String {
        "2026-01-01T12:00:00Z".to_string()
    }

    #[test]
    fn created_task_is_stamped() {
        let msg = map_event(
            EngineEvent::TaskCreated {
                request_id: 2,
                result: Ok("t-9".to_string()),
            },
            &fixed_clock,
        );
        assert_eq!(
            msg,
            Some(Msg::TaskCreated {
                request_id: 2,
                task_id: "t-9".to_string(),
                created_at: "2026-01-01T12:00:00Z".to_string(),
            })
        );
    }

    #[test]
    fn status_report_becomes_a_snapshot() {
        let msg = map_event(
            EngineEvent::StatusFetched {
                handle_id: 1,
                seq: 3,
                result: Ok(StatusReport {
                    status: Some("Succeeded".to_string()),
                    progress: 100,
                    logs: vec!["done".to_string()],
                }),
            },
            &fixed_clock,
        );
        assert_eq!(
            msg,
            Some(Msg::SnapshotReceived {
                handle_id: 1,
                seq: 3,
                snapshot: TaskSnapshot {
                    status: TaskStatus::Succeeded,
                    progress: 100,
                    logs: vec!["done".to_string()],
                },
            })
        );
    }

    #[test]
    fn deadline_is_a_poll_failure() {
        let msg = map_event(
            EngineEvent::PollDeadlineExceeded {
                handle_id: 4,
                limit: Duration::from_secs(600),
            },
            &fixed_clock,
        );
        assert_eq!(
            msg,
            Some(Msg::PollFailed {
                handle_id: 4,
                error: "no final status after 10:00".to_string(),
            })
        );
    }

    #[test]
    fn successful_cancel_is_silent() {
        let ok = EngineEvent::CancelFinished {
            handle_id: 1,
            result: Ok(()),
        };
        assert_eq!(map_event(ok, &fixed_clock), None);

        let failed = map_event(
            EngineEvent::CancelFinished {
                handle_id: 1,
                result: Err(ApiError {
                    kind: crawl_engine::FailureKind::HttpStatus(409),
                    message: "Conflict".to_string(),
                }),
            },
            &fixed_clock,
        );
        assert_eq!(
            failed,
            Some(Msg::CancelFailed {
                handle_id: 1,
                error: "http status 409: Conflict".to_string(),
            })
        );
    }
}
