//! HTTP client for the remote task store.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

use tasklist_auth::SessionGate;
use tasklist_core::{extract_api_message, parse_base_url};

use crate::backend::{TaskApiError, TaskApiResult, TaskBackend};
use crate::task::{Task, TaskCreateRequest, TaskUpdateRequest};

const TODOS_PATH: &str = "api/v1/todos";

/// Fetch-all payload: a bare array, or the same array wrapped in `{"todos": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<Task>),
    Wrapped { todos: Vec<Task> },
}

impl ListResponse {
    fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Bare(tasks) | Self::Wrapped { todos: tasks } => tasks,
        }
    }
}

/// HTTP client for the remote task store
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: Url,
    client: Arc<Client>,
    gate: SessionGate,
}

impl TaskClient {
    /// Create a client whose every request is stamped by `gate`
    pub fn new(base_url: &str, gate: SessionGate, timeout: Duration) -> TaskApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TaskApiError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            client: Arc::new(client),
            gate,
        })
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    fn todos_url(&self) -> TaskApiResult<Url> {
        Ok(self.base_url.join(TODOS_PATH)?)
    }

    fn todo_url(&self, id: &str) -> TaskApiResult<Url> {
        let mut url = self.todos_url()?;
        url.path_segments_mut()
            .map_err(|_| TaskApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .push(id);
        Ok(url)
    }

    /// Check response status and extract the store's error message
    async fn check_response(&self, response: Response) -> TaskApiResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_api_message(&body);
            tracing::error!(
                "Task API error ({}): {}",
                status,
                message.as_deref().unwrap_or("no details")
            );
            return Err(TaskApiError::from_status(status.as_u16(), message));
        }
        Ok(response)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> TaskApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| TaskApiError::InvalidResponse(e.to_string()))
    }

    /// Fetch every task for the signed-in user
    pub async fn list_tasks(&self) -> TaskApiResult<Vec<Task>> {
        tracing::debug!("Fetching tasks");

        let request = self.gate.attach(self.client.get(self.todos_url()?));
        let response = self.check_response(request.send().await?).await?;
        let tasks = Self::parse::<ListResponse>(response).await?.into_tasks();

        tracing::info!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Create a task
    pub async fn create_task(&self, request: TaskCreateRequest) -> TaskApiResult<Task> {
        tracing::debug!("Creating task");

        let request = self
            .gate
            .attach(self.client.post(self.todos_url()?).json(&request));
        let response = self.check_response(request.send().await?).await?;
        let task: Task = Self::parse(response).await?;

        tracing::info!("Created task {}", task.id);
        Ok(task)
    }

    /// Apply a partial update to a task
    pub async fn update_task(&self, id: &str, request: TaskUpdateRequest) -> TaskApiResult<Task> {
        tracing::debug!("Updating task {}", id);

        let request = self
            .gate
            .attach(self.client.put(self.todo_url(id)?).json(&request));
        let response = self.check_response(request.send().await?).await?;
        let task: Task = Self::parse(response).await?;

        tracing::info!("Updated task {}", task.id);
        Ok(task)
    }

    /// Delete a task. Any response body is ignored.
    pub async fn delete_task(&self, id: &str) -> TaskApiResult<()> {
        tracing::debug!("Deleting task {}", id);

        let request = self.gate.attach(self.client.delete(self.todo_url(id)?));
        self.check_response(request.send().await?).await?;

        tracing::info!("Deleted task {}", id);
        Ok(())
    }
}

impl TaskBackend for TaskClient {
    async fn list(&self) -> TaskApiResult<Vec<Task>> {
        self.list_tasks().await
    }

    async fn create(&self, request: TaskCreateRequest) -> TaskApiResult<Task> {
        self.create_task(request).await
    }

    async fn update(&self, id: &str, request: TaskUpdateRequest) -> TaskApiResult<Task> {
        self.update_task(id, request).await
    }

    async fn delete(&self, id: &str) -> TaskApiResult<()> {
        self.delete_task(id).await
    }
}
