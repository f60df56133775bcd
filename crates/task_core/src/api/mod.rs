//! HTTP client for the task REST resource.
//!
//! Every operation issues exactly one request. Non-2xx responses become
//! [`AppError::RequestFailed`] carrying the server's `message` when the body
//! has one; a `204 No Content` success is reported as `None`.

use crate::error::{AppError, GENERIC_FAILURE_MESSAGE, UNREADABLE_FAILURE_MESSAGE};
use crate::model::{Task, TaskInput};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TASKS_SEGMENT: &str = "tasks";
const HEALTH_SEGMENT: &str = "health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::io(err.to_string()))?;
        Self::with_client(base_url, http)
    }

    /// Builds a client around a shared `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| AppError::invalid_input(format!("invalid API URL '{base_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::invalid_input(format!(
                "invalid API URL '{base_url}': not a base URL"
            )));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    #[tracing::instrument(skip_all)]
    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let response = self.send(Method::GET, &[TASKS_SEGMENT], None).await?;
        expect_body(handle_response(response).await?)
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, AppError> {
        let response = self.send(Method::POST, &[TASKS_SEGMENT], Some(input)).await?;
        expect_body(handle_response(response).await?)
    }

    #[tracing::instrument(skip_all, fields(id = %id))]
    pub async fn update_task(&self, id: &str, input: &TaskInput) -> Result<Task, AppError> {
        let response = self
            .send(Method::PUT, &[TASKS_SEGMENT, id], Some(input))
            .await?;
        expect_body(handle_response(response).await?)
    }

    #[tracing::instrument(skip_all, fields(id = %id))]
    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let response = self.send(Method::DELETE, &[TASKS_SEGMENT, id], None).await?;
        // The body, if any, carries nothing the client needs.
        let _: Option<serde_json::Value> = handle_response(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub async fn health(&self) -> Result<HealthStatus, AppError> {
        let response = self.send(Method::GET, &[HEALTH_SEGMENT], None).await?;
        expect_body(handle_response(response).await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::invalid_input("API URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TaskInput>,
    ) -> Result<Response, AppError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!(error = %err, "request did not complete");
            AppError::request_failed(None, err.to_string())
        })?;
        tracing::debug!(status = response.status().as_u16(), "response received");
        Ok(response)
    }
}

/// Maps a response to its decoded body, `None` for an empty success, or a
/// `RequestFailed` error for any non-2xx status.
pub async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = failure_message(&body);
        tracing::warn!(status = status.as_u16(), %message, "request failed");
        return Err(AppError::request_failed(Some(status.as_u16()), message));
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| AppError::invalid_data(format!("unexpected response body: {err}")))
}

/// Human-readable reason for a failed response body.
pub fn failure_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string(),
        Err(_) => UNREADABLE_FAILURE_MESSAGE.to_string(),
    }
}

fn expect_body<T>(body: Option<T>) -> Result<T, AppError> {
    body.ok_or_else(|| AppError::invalid_data("expected a response body but the server sent none"))
}
