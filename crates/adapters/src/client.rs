// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the job server.
//!
//! One method per server route. The remote store, remote data channel,
//! HTTP message bus and the `je` command all go through this client.

use je_core::{DataKind, Job, JobId, WorkerId};
use reqwest::{Body, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {message}")]
    NotFound { message: String, id: Option<JobId> },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("server busy: {0}")]
    Unavailable(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
}

/// One entry of `GET /workers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: WorkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobId>,
}

/// Parameters of `POST /create`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub args: Vec<String>,
    pub interactive: bool,
    /// Block until the job reaches a terminal state.
    pub wait: bool,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }
}

/// What `GET /search` should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    All,
    Ids(Vec<JobId>),
    Name(String),
    State(je_core::JobState),
    Query(String),
}

impl SearchFilter {
    /// Query-string pairs for this filter.
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            SearchFilter::All => vec![],
            SearchFilter::Ids(ids) => {
                let ids: Vec<String> = ids.iter().map(JobId::to_string).collect();
                vec![("ids", ids.join(","))]
            }
            SearchFilter::Name(name) => vec![("q", format!("name:{name}"))],
            SearchFilter::State(state) => vec![("q", format!("state:{}", state.as_str()))],
            SearchFilter::Query(q) => vec![("q", q.clone())],
        }
    }
}

/// Route prefix for reading a data stream.
fn read_route(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Input => "read",
        DataKind::Output => "output",
        DataKind::Logs => "logs",
    }
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// `base` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base.to_string(),
                message: "not a base url".to_string(),
            });
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + percent-encoded path segments.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    /// `GET /`
    pub async fn version(&self) -> Result<String, ClientError> {
        let resp = check(self.http.get(self.url(&[])).send().await?).await?;
        Ok(resp.text().await?)
    }

    /// `POST /create/{name}` with `input` as the job's stdin.
    pub async fn create(
        &self,
        req: &CreateRequest,
        input: impl Into<Body>,
    ) -> Result<Job, ClientError> {
        let mut query: Vec<(&str, String)> =
            req.args.iter().map(|a| ("arg", a.clone())).collect();
        if req.interactive {
            query.push(("interactive", "1".to_string()));
        }
        if req.wait {
            query.push(("wait", "1".to_string()));
        }

        let resp = self
            .http
            .post(self.url(&["create", &req.name]))
            .query(&query)
            .body(input)
            .send()
            .await?;
        first(check(resp).await?.json().await?)
    }

    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<Job>, ClientError> {
        let resp = self
            .http
            .get(self.url(&["search"]))
            .query(&filter.params())
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// `GET /search/{id}`
    pub async fn get(&self, id: JobId) -> Result<Job, ClientError> {
        let resp = self
            .http
            .get(self.url(&["search", &id.to_string()]))
            .send()
            .await?;
        first(check(resp).await?.json().await?)
    }

    /// `POST /update/{id}`; returns the stored record (with its id
    /// assigned when `job.id` was zero).
    pub async fn update(&self, job: &Job) -> Result<Job, ClientError> {
        let resp = self
            .http
            .post(self.url(&["update", &job.id.to_string()]))
            .json(job)
            .send()
            .await?;
        first(check(resp).await?.json().await?)
    }

    pub async fn kill(&self, id: JobId, force: bool) -> Result<(), ClientError> {
        let mut req = self.http.post(self.url(&["kill", &id.to_string()]));
        if force {
            req = req.query(&[("force", "1")]);
        }
        check(req.send().await?).await?;
        Ok(())
    }

    /// `POST /write/{id}`: feed an interactive job's stdin.
    pub async fn write(&self, id: JobId, body: impl Into<Body>) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(&["write", &id.to_string()]))
            .body(body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    /// `POST /close/{id}`: close an interactive job's stdin.
    pub async fn close(&self, id: JobId) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(&["close", &id.to_string()]))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    /// Open a data stream. With `follow`, the body stays open and
    /// delivers lines as they are written.
    pub async fn open(
        &self,
        id: JobId,
        kind: DataKind,
        follow: bool,
    ) -> Result<Response, ClientError> {
        let mut req = self.http.get(self.url(&[read_route(kind), &id.to_string()]));
        if follow {
            req = req.query(&[("follow", "1")]);
        }
        check(req.send().await?).await
    }

    /// `POST /write/{id}/{kind}`: append `body` to a data stream.
    pub async fn append(
        &self,
        id: JobId,
        kind: DataKind,
        body: impl Into<Body>,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(&["write", &id.to_string(), kind.extension()]))
            .body(body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn workers(&self) -> Result<Vec<WorkerInfo>, ClientError> {
        let resp = self.http.get(self.url(&["workers"])).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    /// `POST /bus/{topic}`
    pub async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(&["bus", topic]))
            .body(payload)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    /// `GET /bus/{topic}`: next message, or `None` when the topic is empty.
    pub async fn poll(&self, topic: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let resp = check(self.http.get(self.url(&["bus", topic])).send().await?).await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(resp.bytes().await?.to_vec()))
    }
}

/// Turn non-success responses into typed errors.
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or(ErrorBody {
        error: text.trim().to_string(),
        id: None,
    });
    Err(match status {
        StatusCode::NOT_FOUND => ClientError::NotFound {
            message: body.error,
            id: body.id,
        },
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body.error),
        StatusCode::SERVICE_UNAVAILABLE => ClientError::Unavailable(body.error),
        _ => ClientError::Status {
            status: status.as_u16(),
            message: body.error,
        },
    })
}

fn first(jobs: Vec<Job>) -> Result<Job, ClientError> {
    jobs.into_iter().next().ok_or_else(|| ClientError::NotFound {
        message: "empty result".to_string(),
        id: None,
    })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
