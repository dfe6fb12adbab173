//! JSON shapes of the task API and the coercions applied to loose fields.
//!
//! The server is not strict about types: ids may be numbers, counts may be
//! strings or floats, and arrays may be missing or `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, CrawlRecord, CrawlRequest, FailureKind, StatusReport};

#[derive(Debug, Serialize)]
pub(crate) struct CreateTaskBody<'a> {
    max_pages: u32,
    save: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<Vec<KeywordEntry<'a>>>,
}

#[derive(Debug, Serialize)]
struct KeywordEntry<'a> {
    q: &'a str,
    keyword: &'a str,
    phase: &'a str,
    subject: &'a str,
}

impl<'a> From<&'a CrawlRequest> for CreateTaskBody<'a> {
    fn from(request: &'a CrawlRequest) -> Self {
        let tasks = (!request.keywords.is_empty()).then(|| {
            request
                .keywords
                .iter()
                .map(|keyword| KeywordEntry {
                    q: keyword,
                    keyword,
                    phase: "",
                    subject: "",
                })
                .collect()
        });
        Self {
            max_pages: request.max_pages,
            save: request.persist,
            tasks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskCreatedBody {
    #[serde(default)]
    task_id: Value,
}

impl TaskCreatedBody {
    pub(crate) fn into_task_id(self) -> Result<String, ApiError> {
        match self.task_id {
            Value::String(id) if !id.trim().is_empty() => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            _ => Err(ApiError::new(
                FailureKind::Decode,
                "response carries no task_id",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    #[serde(default)]
    progress: Value,
    #[serde(default)]
    status: Value,
    #[serde(default)]
    logs: Option<Vec<Value>>,
}

impl From<StatusBody> for StatusReport {
    fn from(body: StatusBody) -> Self {
        Self {
            status: text(body.status),
            progress: coerce_i64(&body.progress),
            logs: body
                .logs
                .unwrap_or_default()
                .into_iter()
                .filter_map(text)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsBody {
    #[serde(default)]
    data: Option<Vec<RecordBody>>,
}

impl ResultsBody {
    pub(crate) fn into_records(self) -> Vec<CrawlRecord> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(CrawlRecord::from)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordBody {
    bvid: Value,
    title: Value,
    up_name: Value,
    view_count: Value,
    favorite_count: Value,
    tags: Value,
    subject: Value,
    category: Value,
}

impl From<RecordBody> for CrawlRecord {
    fn from(body: RecordBody) -> Self {
        Self {
            view_count: coerce_i64(&body.view_count),
            favorite_count: coerce_i64(&body.favorite_count),
            bvid: text(body.bvid),
            title: text(body.title),
            up_name: text(body.up_name),
            tags: text(body.tags),
            subject: text(body.subject),
            category: text(body.category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewReport {
    pub bvid: String,
}

/// Numbers pass through (floats truncate), numeric strings are parsed,
/// everything else is 0.
pub(crate) fn coerce_i64(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .ok()
                .or_else(|| {
                    raw.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counts_accept_loose_types() {
        assert_eq!(coerce_i64(&json!(15000)), 15000);
        assert_eq!(coerce_i64(&json!(40.7)), 40);
        assert_eq!(coerce_i64(&json!(" 123 ")), 123);
        assert_eq!(coerce_i64(&json!("12.9")), 12);
        assert_eq!(coerce_i64(&json!("many")), 0);
        assert_eq!(coerce_i64(&json!(null)), 0);
        assert_eq!(coerce_i64(&json!([1])), 0);
    }

    #[test]
    fn create_body_omits_tasks_without_keywords() {
        let request = CrawlRequest {
            keywords: Vec::new(),
            max_pages: 3,
            persist: false,
        };
        let body = serde_json::to_value(CreateTaskBody::from(&request)).unwrap();
        assert_eq!(body, json!({ "max_pages": 3, "save": false }));
    }

    #[test]
    fn each_keyword_becomes_a_search_entry() {
        let request = CrawlRequest {
            keywords: vec!["drone".to_string(), "fpv".to_string()],
            max_pages: 5,
            persist: true,
        };
        let body = serde_json::to_value(CreateTaskBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "max_pages": 5,
                "save": true,
                "tasks": [
                    { "q": "drone", "keyword": "drone", "phase": "", "subject": "" },
                    { "q": "fpv", "keyword": "fpv", "phase": "", "subject": "" },
                ],
            })
        );
    }

    #[test]
    fn task_id_may_be_numeric() {
        let body: TaskCreatedBody = serde_json::from_value(json!({ "task_id": 42 })).unwrap();
        assert_eq!(body.into_task_id().unwrap(), "42");

        let body: TaskCreatedBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.into_task_id().unwrap_err().kind, FailureKind::Decode);
    }

    #[test]
    fn status_body_tolerates_missing_fields() {
        let body: StatusBody = serde_json::from_value(json!({ "logs": null })).unwrap();
        assert_eq!(
            StatusReport::from(body),
            StatusReport {
                status: None,
                progress: 0,
                logs: Vec::new(),
            }
        );
    }
}
