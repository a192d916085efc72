use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Task, TaskId},
    protocol::{
        task_segments, update_positions_segments, CreateTaskRequest, UpdateTaskRequest,
        TASKS_SEGMENTS, UPDATE_POSITIONS_SEGMENT,
    },
};
use tracing::debug;
use url::Url;

use crate::error::SyncError;

/// Request/response seam to the remote task store.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, SyncError>;
    async fn create(&self, text: &str, position: u32) -> Result<Task, SyncError>;
    async fn set_completed(&self, task_id: &TaskId, completed: bool) -> Result<(), SyncError>;
    async fn delete(&self, task_id: &TaskId) -> Result<(), SyncError>;
    /// Submits every task with its current `position` in a single call.
    async fn reorder_all(&self, tasks: &[Task]) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTaskApiOptions {
    pub request_timeout: Option<Duration>,
}

/// [`TaskApi`] over JSON/HTTP.
pub struct HttpTaskApi {
    http: Client,
    base_url: Url,
}

impl HttpTaskApi {
    pub fn new(base_url: Url, options: HttpTaskApiOptions) -> Result<Self, SyncError> {
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidRequest(format!(
                "api base url '{base_url}' cannot hold a path"
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, base_url })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SyncError::InvalidRequest(format!(
                    "api base url '{}' cannot hold a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn task_endpoint(&self, task_id: &TaskId) -> Result<Url, SyncError> {
        if task_id.as_str() == UPDATE_POSITIONS_SEGMENT {
            return Err(SyncError::InvalidRequest(format!(
                "task id '{task_id}' collides with the position update route"
            )));
        }
        self.endpoint(&task_segments(task_id))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, SyncError> {
        debug!(method = %method, url = %url, "tasks: sending request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        ensure_success(response).await
    }

    async fn send_for_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, SyncError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, url, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }
}

async fn ensure_success(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::server(status.as_u16(), &body))
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, SyncError> {
        let url = self.endpoint(&TASKS_SEGMENTS)?;
        self.send_for_json::<(), _>(Method::GET, url, None).await
    }

    async fn create(&self, text: &str, position: u32) -> Result<Task, SyncError> {
        let body = CreateTaskRequest {
            task: text.to_string(),
            position,
        };
        let url = self.endpoint(&TASKS_SEGMENTS)?;
        self.send_for_json(Method::POST, url, Some(&body)).await
    }

    async fn set_completed(&self, task_id: &TaskId, completed: bool) -> Result<(), SyncError> {
        let body = UpdateTaskRequest { completed };
        let url = self.task_endpoint(task_id)?;
        self.send(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    async fn delete(&self, task_id: &TaskId) -> Result<(), SyncError> {
        let url = self.task_endpoint(task_id)?;
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn reorder_all(&self, tasks: &[Task]) -> Result<(), SyncError> {
        let url = self.endpoint(&update_positions_segments())?;
        self.send(Method::PUT, url, Some(tasks)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
