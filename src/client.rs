//! This module provides a client to the hosted backend, that stores tasks in its `todos` table

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::task::{NewTask, Task, TaskId, TaskPatch, UserId};
use crate::traits::TaskStore;

const TASKS_TABLE: &str = "todos";

/// Error bodies of the backend. Only `message` is of interest here
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// A [`TaskStore`] that talks to the REST interface of the hosted backend
pub struct Client {
    session: Session,
    tasks_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new(session: Session) -> Result<Self> {
        let tasks_url = session.rest_url(TASKS_TABLE)?;
        Ok(Self {
            session,
            tasks_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn tasks_url_where(&self, column: &str, value: &str) -> Url {
        let mut url = self.tasks_url.clone();
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{}", value))
            .append_pair("select", "*");
        url
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.session.api_key())
            .header(AUTHORIZATION, format!("Bearer {}", self.session.access_token()))
    }

    /// Like `authenticated`, but also asks the backend to send the written rows back
    fn returning(&self, request: RequestBuilder) -> RequestBuilder {
        self.authenticated(request)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
    }
}

/// Turn a non-successful response into an [`Error::Remote`], keeping the backend's explanation if there is one
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.message)
        .or_else(|| status.canonical_reason().map(|reason| reason.to_string()));
    log::warn!("Backend replied {} ({:?})", status, message);
    Err(Error::Remote { message })
}

/// Mutations return an array of the written rows. We expect exactly one
fn single_row(mut rows: Vec<Task>, id: Option<&TaskId>) -> Result<Task> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => Err(Error::Remote { message: id.map(|id| format!("no task matches id {}", id)) }),
        n => Err(Error::remote(format!("expected a single task, got {}", n))),
    }
}

#[async_trait]
impl TaskStore for Client {
    async fn list(&self, owner: &UserId) -> Result<Vec<Task>> {
        let url = self.tasks_url_where("user_id", owner.as_str());
        log::debug!("Listing tasks of {}", owner);

        let response = self.authenticated(self.http.get(url)).send().await?;
        let tasks = check_status(response).await?.json::<Vec<Task>>().await?;
        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        let response = self.returning(self.http.post(self.tasks_url.clone()))
            .json(&task)
            .send()
            .await?;
        let rows = check_status(response).await?.json::<Vec<Task>>().await?;
        single_row(rows, None)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        let url = self.tasks_url_where("id", id.as_str());
        let response = self.returning(self.http.patch(url))
            .json(patch)
            .send()
            .await?;
        let rows = check_status(response).await?.json::<Vec<Task>>().await?;
        single_row(rows, Some(id))
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let url = self.tasks_url_where("id", id.as_str());
        let response = self.authenticated(self.http.delete(url)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
