use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::models::*;
use crate::config::ClientConfig;
use crate::errors::{GatewayError, SyncError};

/// Remote side of the board: the REST API's task mutations and board queries.
/// Real implementation: `HttpTaskGateway`. Tests substitute in-memory fakes.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, GatewayError>;

    async fn fetch_board(&self, board_id: BoardId) -> Result<Board, GatewayError>;

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, GatewayError>;

    /// Returns the updated task when the server sends one back.
    async fn update_title(
        &self,
        task_id: TaskId,
        request: &UpdateTitleRequest,
    ) -> Result<Option<Task>, GatewayError>;

    async fn delete_task(&self, task_id: TaskId) -> Result<(), GatewayError>;

    async fn reorder_tasks(&self, request: &ReorderRequest) -> Result<(), GatewayError>;
}

/// Holder of the bearer credential shared by every gateway call.
#[derive(Clone, Default)]
pub struct Session {
    access: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_access(token);
        session
    }

    pub fn set_access(&self, token: impl Into<String>) {
        *self.access.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn access(&self) -> Option<String> {
        self.access
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.access.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.access().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
}

/// `TaskGateway` over the board REST API.
#[derive(Debug, Clone)]
pub struct HttpTaskGateway {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpTaskGateway {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, GatewayError> {
        Url::parse(&config.api_url).map_err(|e| GatewayError::InvalidUrl {
            url: config.api_url.clone(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange credentials for an access token and keep it in the session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url("auth/jwt/create/"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| SyncError::LoginFailed(e.into()))?;
        let response = check_status(response)
            .await
            .map_err(SyncError::LoginFailed)?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| SyncError::LoginFailed(e.into()))?;
        self.session.set_access(body.access);
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let token = self.session.access().ok_or(GatewayError::Unauthenticated)?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    #[instrument(skip(self))]
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, GatewayError> {
        let response = self.send(self.client.get(self.url("boards/"))).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn fetch_board(&self, board_id: BoardId) -> Result<Board, GatewayError> {
        let response = self
            .send(self.client.get(self.url(&format!("boards/{}/", board_id))))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, request), fields(column = request.column))]
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, GatewayError> {
        let response = self
            .send(self.client.post(self.url("tasks/")).json(request))
            .await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, request))]
    async fn update_title(
        &self,
        task_id: TaskId,
        request: &UpdateTitleRequest,
    ) -> Result<Option<Task>, GatewayError> {
        let response = self
            .send(
                self.client
                    .patch(self.url(&format!("tasks/{}/", task_id)))
                    .json(request),
            )
            .await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<Task>(&bytes) {
            Ok(task) => Ok(Some(task)),
            Err(e) => {
                debug!(task_id, error = %e, "Ignoring unparseable edit response body");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, task_id: TaskId) -> Result<(), GatewayError> {
        self.send(
            self.client
                .delete(self.url(&format!("tasks/{}/delete/", task_id))),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(moves = request.moves.len()))]
    async fn reorder_tasks(&self, request: &ReorderRequest) -> Result<(), GatewayError> {
        self.send(self.client.post(self.url("tasks/reorder/")).json(request))
            .await?;
        Ok(())
    }
}
