//! `reqwest` implementation of [`BoardApi`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::BoardApi;
use crate::error::{ApiError, MapError};
use crate::mappers::{
    AccomplishmentPayload, ApiAccomplishment, NewAccomplishmentPayload, ApiDashboardStats, ApiProject, ApiProjectSummary, ApiTask,
    ApiWeeklyStat, ProjectPayload, TaskPayload,
};
use crate::models::{
    Accomplishment, AccomplishmentPatch, DashboardStats, NewAccomplishment, NewProject, NewTask, Project,
    ProjectSummary, Task, TaskPatch, WeeklyStat,
};

/// HTTP client for the board backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base: Url,
    base_url: String,
}

impl HttpApi {
    /// Creates a client for `base_url`, e.g. `http://localhost:3000`.
    ///
    /// No request timeout is set unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = Client::builder().user_agent(concat!("focusboard/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(|source| ApiError::Transport {
            message: "Failed to build HTTP client",
            source,
        })?;
        Ok(Self { http, base, base_url: trimmed.to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    ///
    /// Ids are opaque, so a segment may not be empty, `.` or `..`.
    fn endpoint(&self, segments: &[&str], message: &'static str) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidId { message, id: bad.to_string() });
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, message: &'static str) -> Result<Response, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { message, source })?;
        let status = resp.status();
        debug!(url = %resp.url(), status = status.as_u16(), "api response");
        if !status.is_success() {
            warn!(url = %resp.url(), status = status.as_u16(), "{}", message);
            return Err(ApiError::Request { message, status: status.as_u16() });
        }
        Ok(resp)
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response, message: &'static str) -> Result<T, ApiError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|source| ApiError::Transport { message, source })?;
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Json { message, source })
}

/// Reads the echo of a delete. An empty body becomes `null`.
async fn read_echo(resp: Response, message: &'static str) -> Result<serde_json::Value, ApiError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|source| ApiError::Transport { message, source })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Json { message, source })
}

fn map_one<W, D>(wire: W, message: &'static str) -> Result<D, ApiError>
where
    D: TryFrom<W, Error = MapError>,
{
    D::try_from(wire).map_err(|source| ApiError::Decode { message, source })
}

fn map_all<W, D>(wire: Vec<W>, message: &'static str) -> Result<Vec<D>, ApiError>
where
    D: TryFrom<W, Error = MapError>,
{
    wire.into_iter().map(|w| map_one(w, message)).collect()
}

fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl BoardApi for HttpApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        const MSG: &str = "Failed to get tasks";
        let resp = self.send(self.http.get(self.endpoint(&["tasks"], MSG)?), MSG).await?;
        let wire: Vec<ApiTask> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn list_tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, ApiError> {
        const MSG: &str = "Failed to get tasks";
        let url = self.endpoint(&["tasks", "date", ymd(date).as_str()], MSG)?;
        let resp = self.send(self.http.get(url), MSG).await?;
        let wire: Vec<ApiTask> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        const MSG: &str = "Failed to get task";
        let resp = self.send(self.http.get(self.endpoint(&["tasks", id], MSG)?), MSG).await?;
        let wire: ApiTask = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        const MSG: &str = "Failed to create task";
        let request = self.http.post(self.endpoint(&["tasks"], MSG)?).json(&TaskPayload::from(task));
        let resp = self.send(request, MSG).await?;
        let wire: ApiTask = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<(), ApiError> {
        const MSG: &str = "Failed to update task";
        let request = self.http.put(self.endpoint(&["tasks", id], MSG)?).json(patch);
        self.send(request, MSG).await?;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        const MSG: &str = "Failed to delete task";
        let resp = self.send(self.http.delete(self.endpoint(&["tasks", id], MSG)?), MSG).await?;
        read_echo(resp, MSG).await
    }

    async fn list_accomplishments(&self) -> Result<Vec<Accomplishment>, ApiError> {
        const MSG: &str = "Failed to get accomplishments";
        let resp = self.send(self.http.get(self.endpoint(&["accomplishments"], MSG)?), MSG).await?;
        let wire: Vec<ApiAccomplishment> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn list_accomplishments_by_task(&self, task_id: &str) -> Result<Vec<Accomplishment>, ApiError> {
        const MSG: &str = "Failed to get accomplishments";
        let url = self.endpoint(&["accomplishments", task_id], MSG)?;
        let resp = self.send(self.http.get(url), MSG).await?;
        let wire: Vec<ApiAccomplishment> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn create_accomplishment(&self, accomplishment: &NewAccomplishment) -> Result<Accomplishment, ApiError> {
        const MSG: &str = "Failed to create accomplishment";
        let request = self
            .http
            .post(self.endpoint(&["accomplishments"], MSG)?)
            .json(&NewAccomplishmentPayload::from(accomplishment));
        let resp = self.send(request, MSG).await?;
        let wire: ApiAccomplishment = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn update_accomplishment(
        &self,
        current: &Accomplishment,
        patch: &AccomplishmentPatch,
    ) -> Result<Accomplishment, ApiError> {
        const MSG: &str = "Failed to update accomplishment";
        let request = self
            .http
            .put(self.endpoint(&["accomplishments", current.id.as_str()], MSG)?)
            .json(&AccomplishmentPayload::merged(current, patch));
        let resp = self.send(request, MSG).await?;
        let wire: ApiAccomplishment = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn delete_accomplishment(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        const MSG: &str = "Failed to delete accomplishment";
        let url = self.endpoint(&["accomplishments", id], MSG)?;
        let resp = self.send(self.http.delete(url), MSG).await?;
        read_echo(resp, MSG).await
    }

    async fn delete_accomplishments_by_task(&self, task_id: &str) -> Result<serde_json::Value, ApiError> {
        const MSG: &str = "Failed to delete accomplishments";
        let url = self.endpoint(&["accomplishments", "task", task_id], MSG)?;
        let resp = self.send(self.http.delete(url), MSG).await?;
        read_echo(resp, MSG).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        const MSG: &str = "Failed to get projects";
        let resp = self.send(self.http.get(self.endpoint(&["projects"], MSG)?), MSG).await?;
        let wire: Vec<ApiProject> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        const MSG: &str = "Failed to create project";
        let request = self.http.post(self.endpoint(&["projects"], MSG)?).json(&ProjectPayload::from(project));
        let resp = self.send(request, MSG).await?;
        let wire: ApiProject = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn dashboard_stats(&self, date: NaiveDate) -> Result<DashboardStats, ApiError> {
        const MSG: &str = "Failed to get dashboard stats";
        let request = self.http.get(self.endpoint(&["dashboard", "stats"], MSG)?).query(&[("date", ymd(date))]);
        let resp = self.send(request, MSG).await?;
        let wire: ApiDashboardStats = read_json(resp, MSG).await?;
        map_one(wire, MSG)
    }

    async fn weekly_stats(&self, date: NaiveDate) -> Result<Vec<WeeklyStat>, ApiError> {
        const MSG: &str = "Failed to get weekly stats";
        let request = self
            .http
            .get(self.endpoint(&["stats", "weekly-stats"], MSG)?)
            .query(&[("date", ymd(date))]);
        let resp = self.send(request, MSG).await?;
        let wire: Vec<ApiWeeklyStat> = read_json(resp, MSG).await?;
        map_all(wire, MSG)
    }

    async fn summary_table(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ProjectSummary>, ApiError> {
        const MSG: &str = "Failed to get summary table";
        let request = self
            .http
            .post(self.endpoint(&["highlights"], MSG)?)
            .query(&[("startDate", ymd(start)), ("endDate", ymd(end))]);
        let resp = self.send(request, MSG).await?;
        let wire: Vec<ApiProjectSummary> = read_json(resp, MSG).await?;
        Ok(wire.into_iter().map(ProjectSummary::from).collect())
    }
}
