//! HTTP client for the DevShed API.
//!
//! Every logical operation is a POST to an operation-named endpoint under the
//! configured base URL, authenticated with the `X-API-KEY` header. The client
//! returns the raw [`ApiResponse`] envelope; callers apply the
//! [`shape`](crate::shape) and [`ids`](crate::ids) normalizers themselves so
//! normalization happens in exactly one place.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Config, ConfigStore};
use crate::models::TaskStatus;

const NO_PROJECT_GUIDANCE: &str =
    "No project ID specified. Use \"devshed context switch project <id>\" to set a current project.";

/// Envelope returned by every client operation.
///
/// Failures of any kind (routing, transport, HTTP status, decode) land in
/// `error` with `success: false`; client operations never return `Err` and
/// never panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectCreateRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskCreateRequest {
    pub title: String,
    pub project_id: String,
    pub description: Option<String>,
    /// Defaults to [`TaskStatus::Todo`] when unset.
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
}

/// Stateless request layer over the DevShed REST API.
///
/// Holds a snapshot of the configuration taken at construction; a flow that
/// switches projects constructs a fresh client afterwards.
pub struct ApiClient {
    config: Config,
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: Config) -> Self {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        Self {
            config,
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Client over the store's loaded configuration, or `None` when nothing
    /// is persisted yet.
    pub fn from_store(store: &ConfigStore) -> Option<Self> {
        store.load().map(Self::new)
    }

    /// Request body fields every operation carries: requester identity and
    /// organization.
    fn base_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert(
            "user_id".to_string(),
            Value::String(self.config.user_id.clone()),
        );
        body.insert(
            "organization_id".to_string(),
            Value::String(self.config.default_organization_id.clone()),
        );
        body
    }

    /// Explicit project id, or the configured current project.
    fn resolve_project_id(&self, project_id: Option<&str>) -> Option<String> {
        project_id
            .map(str::to_string)
            .or_else(|| self.config.current_project_id.clone())
    }

    /// Generic request primitive. Network failures, non-2xx statuses and
    /// decode failures all map into the envelope rather than an `Err`.
    async fn request(&self, endpoint: &str, method: Method, body: Option<Value>) -> ApiResponse {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header("X-API-KEY", &self.config.api_key)
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            if method == Method::POST || method == Method::PUT {
                builder = builder.json(&body);
            }
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("request to {} failed: {}", url, err);
                return ApiResponse::failure(err.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ApiResponse::failure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            ));
        }

        match response.json::<Value>().await {
            Ok(data) => ApiResponse::ok(data),
            Err(err) => {
                tracing::debug!("response from {} did not decode: {}", url, err);
                ApiResponse::failure(err.to_string())
            }
        }
    }

    pub async fn list_projects(&self) -> ApiResponse {
        let body = self.base_body();
        self.request("projects/list", Method::POST, Some(Value::Object(body)))
            .await
    }

    pub async fn create_project(&self, request: ProjectCreateRequest) -> ApiResponse {
        let mut body = self.base_body();
        body.insert("name".to_string(), request.name.into());
        body.insert(
            "description".to_string(),
            request.description.unwrap_or_default().into(),
        );
        self.request("projects/create", Method::POST, Some(Value::Object(body)))
            .await
    }

    pub async fn read_project(&self, project_id: &str) -> ApiResponse {
        let mut body = self.base_body();
        body.insert("id".to_string(), project_id.into());
        self.request("projects/read", Method::POST, Some(Value::Object(body)))
            .await
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        updates: ProjectUpdateRequest,
    ) -> ApiResponse {
        let mut body = self.base_body();
        body.insert("id".to_string(), project_id.into());
        if let Some(name) = updates.name {
            body.insert("name".to_string(), name.into());
        }
        if let Some(description) = updates.description {
            body.insert("description".to_string(), description.into());
        }
        self.request("projects/update", Method::POST, Some(Value::Object(body)))
            .await
    }

    /// List tasks in `project_id`, or in the current project when omitted.
    pub async fn list_tasks(&self, project_id: Option<&str>) -> ApiResponse {
        let Some(project_id) = self.resolve_project_id(project_id) else {
            return ApiResponse::failure(NO_PROJECT_GUIDANCE);
        };
        let mut body = self.base_body();
        body.insert("project_id".to_string(), project_id.into());
        self.request("tasks/list", Method::POST, Some(Value::Object(body)))
            .await
    }

    pub async fn create_task(&self, request: TaskCreateRequest) -> ApiResponse {
        let mut body = self.base_body();
        body.insert("project_id".to_string(), request.project_id.into());
        body.insert("title".to_string(), request.title.into());
        body.insert(
            "description".to_string(),
            request.description.unwrap_or_default().into(),
        );
        body.insert(
            "status".to_string(),
            request.status.unwrap_or_default().as_str().into(),
        );
        self.request("tasks/create", Method::POST, Some(Value::Object(body)))
            .await
    }

    /// Read one task, resolving the project the same way as
    /// [`list_tasks`](Self::list_tasks).
    pub async fn read_task(&self, task_id: &str, project_id: Option<&str>) -> ApiResponse {
        let Some(project_id) = self.resolve_project_id(project_id) else {
            return ApiResponse::failure(NO_PROJECT_GUIDANCE);
        };
        let mut body = self.base_body();
        body.insert("project_id".to_string(), project_id.into());
        body.insert("id".to_string(), task_id.into());
        self.request("tasks/read", Method::POST, Some(Value::Object(body)))
            .await
    }

    pub async fn update_task(
        &self,
        task_id: &str,
        updates: TaskUpdateRequest,
        project_id: Option<&str>,
    ) -> ApiResponse {
        let Some(project_id) = self.resolve_project_id(project_id) else {
            return ApiResponse::failure(NO_PROJECT_GUIDANCE);
        };
        let mut body = self.base_body();
        body.insert("project_id".to_string(), project_id.into());
        body.insert("id".to_string(), task_id.into());
        if let Some(title) = updates.title {
            body.insert("title".to_string(), title.into());
        }
        if let Some(description) = updates.description {
            body.insert("description".to_string(), description.into());
        }
        if let Some(status) = updates.status {
            body.insert("status".to_string(), status.as_str().into());
        }
        if let Some(assignee_id) = updates.assignee_id {
            body.insert("assignee_id".to_string(), assignee_id.into());
        }
        self.request("tasks/update", Method::POST, Some(Value::Object(body)))
            .await
    }
}
