//! Remote access layer: one async operation per API call.

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ApiError;
use crate::models::{
    Accomplishment, AccomplishmentPatch, DashboardStats, NewAccomplishment, NewProject, NewTask, Project,
    ProjectSummary, Task, TaskPatch, WeeklyStat,
};

pub use http::HttpApi;

/// Typed access to the board backend.
///
/// Every method performs exactly one request, never retries, and fails with an
/// [`ApiError`] when the response status is not a success.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn list_tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, ApiError>;
    async fn get_task(&self, id: &str) -> Result<Task, ApiError>;
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;
    /// Sends only the fields present in `patch`. The server merges them.
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<(), ApiError>;
    /// Returns whatever the server echoes back.
    async fn delete_task(&self, id: &str) -> Result<serde_json::Value, ApiError>;

    async fn list_accomplishments(&self) -> Result<Vec<Accomplishment>, ApiError>;
    async fn list_accomplishments_by_task(&self, task_id: &str) -> Result<Vec<Accomplishment>, ApiError>;
    async fn create_accomplishment(&self, accomplishment: &NewAccomplishment) -> Result<Accomplishment, ApiError>;
    /// Replaces `current` with the patch merged in.
    async fn update_accomplishment(
        &self,
        current: &Accomplishment,
        patch: &AccomplishmentPatch,
    ) -> Result<Accomplishment, ApiError>;
    async fn delete_accomplishment(&self, id: &str) -> Result<serde_json::Value, ApiError>;
    async fn delete_accomplishments_by_task(&self, task_id: &str) -> Result<serde_json::Value, ApiError>;

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;

    async fn dashboard_stats(&self, date: NaiveDate) -> Result<DashboardStats, ApiError>;
    async fn weekly_stats(&self, date: NaiveDate) -> Result<Vec<WeeklyStat>, ApiError>;
    async fn summary_table(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ProjectSummary>, ApiError>;
}
