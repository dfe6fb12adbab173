use serde::de::DeserializeOwned;
use url::Url;

use crate::settings::ApiSettings;
use crate::wire::{CreateTaskBody, ResultsBody, StatusBody, TaskCreatedBody};
use crate::{ApiError, CrawlRecord, CrawlRequest, FailureKind, StatusReport};

const TASKS_PATH: [&str; 3] = ["api", "spider", "tasks"];

/// The remote task service.
#[async_trait::async_trait]
pub trait TaskApi: Send + Sync {
    async fn create_task(&self, request: &CrawlRequest) -> Result<String, ApiError>;

    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError>;

    /// Requests an abort. Success only means the server accepted the request.
    async fn cancel_task(&self, task_id: &str) -> Result<(), ApiError>;

    async fn task_results(&self, task_id: &str) -> Result<Vec<CrawlRecord>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTaskApi {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestTaskApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, base })
    }

    fn tasks_url(&self, tail: &[&str]) -> Result<Url, ApiError> {
        let mut segments: Vec<&str> = TASKS_PATH.to_vec();
        segments.extend_from_slice(tail);
        endpoint(&self.base, &segments)
    }
}

#[async_trait::async_trait]
impl TaskApi for ReqwestTaskApi {
    async fn create_task(&self, request: &CrawlRequest) -> Result<String, ApiError> {
        let url = self.tasks_url(&[])?;
        let body: TaskCreatedBody =
            receive_json(self.client.post(url).json(&CreateTaskBody::from(request))).await?;
        body.into_task_id()
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusReport, ApiError> {
        let url = self.tasks_url(&[task_id])?;
        let body: StatusBody = receive_json(self.client.get(url)).await?;
        Ok(body.into())
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), ApiError> {
        let url = self.tasks_url(&[task_id, "cancel"])?;
        send_checked(self.client.post(url)).await.map(drop)
    }

    async fn task_results(&self, task_id: &str) -> Result<Vec<CrawlRecord>, ApiError> {
        let url = self.tasks_url(&[task_id, "data"])?;
        let body: ResultsBody = receive_json(self.client.get(url)).await?;
        Ok(body.into_records())
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("{raw}: cannot be used as a base url"),
        ));
    }
    Ok(url)
}

/// Appends path segments to `base`; each segment is percent-encoded on its own.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot take a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ApiError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.canonical_reason().unwrap_or("request failed"),
        ));
    }
    Ok(response)
}

async fn receive_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    send_checked(request)
        .await?
        .json::<T>()
        .await
        .map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
