//! Wire shapes of the remote API and their conversion into domain records.
//!
//! Reads go through a `Deserialize` wire struct followed by a validating
//! `TryFrom`, so a malformed record fails with a [`MapError`] instead of
//! producing a half-filled domain value. Writes use dedicated payload structs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::models::{
    Accomplishment, AccomplishmentPatch, Attachment, AttachmentKind, DashboardStats, NewAccomplishment,
    NewAttachment, NewProject, NewTask, Project, ProjectSummary, ProjectSummaryRow, Task, TaskPriority,
    TaskStatus, WeeklyStat,
};

/// Identifiers arrive either as strings or as integers depending on the backend.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiTask {
    pub id: WireId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub estimated_time: i64,
    #[serde(default)]
    pub actual_minutes: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: String,
    #[serde(default)]
    pub project_id: Option<WireId>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiAttachment {
    pub id: WireId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiAccomplishment {
    pub id: WireId,
    #[serde(default)]
    pub task_id: Option<WireId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_taken: Option<i64>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, alias = "proofs")]
    pub attachments: Option<Vec<ApiAttachment>>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiProject {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboardStats {
    pub planned_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub discarded_tasks: i64,
    pub total_estimated_minutes: i64,
    pub total_actual_minutes: i64,
    pub completion_rate: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiWeeklyStat {
    pub day: String,
    pub planned: i64,
    pub completed: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiProjectSummaryRow {
    #[serde(default)]
    pub delivery_details: String,
    #[serde(default)]
    pub accomplishments: String,
    #[serde(default)]
    pub approach: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiProjectSummary {
    pub project_name: String,
    #[serde(default)]
    pub project_summary: Vec<ApiProjectSummaryRow>,
}

/// Parses a server timestamp.
///
/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, MapError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(MapError::InvalidTimestamp { field, value: value.to_string() })
}

/// Parses a calendar date sent either as `YYYY-MM-DD` or as a full timestamp.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, MapError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(field, trimmed).map(|dt| dt.date_naive())
}

fn non_empty(field: &'static str, value: String) -> Result<String, MapError> {
    if value.trim().is_empty() {
        Err(MapError::Empty(field))
    } else {
        Ok(value)
    }
}

fn minutes(field: &'static str, value: i64) -> Result<u32, MapError> {
    if value < 0 {
        return Err(MapError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| MapError::InvalidValue { field, value: value.to_string() })
}

fn count(field: &'static str, value: i64) -> Result<u32, MapError> {
    minutes(field, value)
}

fn total(field: &'static str, value: i64) -> Result<u64, MapError> {
    u64::try_from(value).map_err(|_| MapError::Negative { field, value })
}

fn parse_enum<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, MapError> {
    value
        .parse::<T>()
        .map_err(|_| MapError::InvalidValue { field, value: value.to_string() })
}

impl TryFrom<ApiTask> for Task {
    type Error = MapError;

    fn try_from(data: ApiTask) -> Result<Self, Self::Error> {
        Ok(Task {
            id: non_empty("id", data.id.into_string())?,
            title: non_empty("title", data.title)?,
            description: data.description.unwrap_or_default(),
            status: parse_enum::<TaskStatus>("status", &data.status)?,
            priority: parse_enum::<TaskPriority>("priority", &data.priority)?,
            estimated_minutes: minutes("estimated_time", data.estimated_time)?,
            actual_minutes: data.actual_minutes.map(|m| minutes("actual_minutes", m)).transpose()?,
            created_at: parse_timestamp("created_at", &data.created_at)?,
            updated_at: parse_timestamp("updated_at", &data.updated_at)?,
            completed_at: data
                .completed_at
                .as_deref()
                .map(|s| parse_timestamp("completed_at", s))
                .transpose()?,
            notes: data.notes,
            date: parse_date("date", &data.date)?,
            project_id: data.project_id.map(WireId::into_string),
        })
    }
}

impl TryFrom<ApiAttachment> for Attachment {
    type Error = MapError;

    fn try_from(data: ApiAttachment) -> Result<Self, Self::Error> {
        Ok(Attachment {
            id: data.id.into_string(),
            kind: parse_enum::<AttachmentKind>("type", &data.kind)?,
            title: non_empty("attachment.title", data.title)?,
            url: data.url.filter(|u| !u.trim().is_empty()),
        })
    }
}

impl TryFrom<ApiAccomplishment> for Accomplishment {
    type Error = MapError;

    fn try_from(data: ApiAccomplishment) -> Result<Self, Self::Error> {
        let attachments = data
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(Attachment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Accomplishment {
            id: non_empty("id", data.id.into_string())?,
            task_id: data.task_id.map(WireId::into_string),
            title: non_empty("title", data.title)?,
            description: data.description.unwrap_or_default(),
            time_taken: data.time_taken.map(|m| minutes("time_taken", m)).transpose()?,
            challenges: data.challenges,
            comments: data.comments,
            attachments,
            created_at: parse_timestamp("created_at", &data.created_at)?,
            updated_at: parse_timestamp("updated_at", &data.updated_at)?,
        })
    }
}

impl TryFrom<ApiProject> for Project {
    type Error = MapError;

    fn try_from(data: ApiProject) -> Result<Self, Self::Error> {
        Ok(Project {
            id: non_empty("id", data.id.into_string())?,
            name: non_empty("name", data.name)?,
            description: data.description,
        })
    }
}

impl TryFrom<ApiDashboardStats> for DashboardStats {
    type Error = MapError;

    fn try_from(data: ApiDashboardStats) -> Result<Self, Self::Error> {
        if !data.completion_rate.is_finite() || data.completion_rate < 0.0 {
            return Err(MapError::InvalidValue {
                field: "completionRate",
                value: data.completion_rate.to_string(),
            });
        }
        Ok(DashboardStats {
            planned_tasks: count("plannedTasks", data.planned_tasks)?,
            in_progress_tasks: count("inProgressTasks", data.in_progress_tasks)?,
            completed_tasks: count("completedTasks", data.completed_tasks)?,
            discarded_tasks: count("discardedTasks", data.discarded_tasks)?,
            total_estimated_minutes: total("totalEstimatedMinutes", data.total_estimated_minutes)?,
            total_actual_minutes: total("totalActualMinutes", data.total_actual_minutes)?,
            completion_rate: data.completion_rate,
        })
    }
}

impl TryFrom<ApiWeeklyStat> for WeeklyStat {
    type Error = MapError;

    fn try_from(data: ApiWeeklyStat) -> Result<Self, Self::Error> {
        Ok(WeeklyStat {
            day: non_empty("day", data.day)?,
            planned: count("planned", data.planned)?,
            completed: count("completed", data.completed)?,
        })
    }
}

impl From<ApiProjectSummary> for ProjectSummary {
    fn from(data: ApiProjectSummary) -> Self {
        ProjectSummary {
            project_name: data.project_name,
            rows: data
                .project_summary
                .into_iter()
                .map(|r| ProjectSummaryRow {
                    delivery_details: r.delivery_details,
                    accomplishments: r.accomplishments,
                    approach: r.approach,
                })
                .collect(),
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskPayload<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub estimated_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<&'a str>,
}

impl<'a> From<&'a NewTask> for TaskPayload<'a> {
    fn from(task: &'a NewTask) -> Self {
        TaskPayload {
            title: &task.title,
            description: &task.description,
            priority: task.priority,
            status: task.status,
            estimated_time: task.estimated_minutes,
            notes: task.notes.as_deref(),
            date: task.date.format("%Y-%m-%d").to_string(),
            project_id: task.project_id.as_deref(),
        }
    }
}

/// Body of `POST /accomplishments`. The create endpoint reads attachments
/// from `proofs`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewAccomplishmentPayload {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(rename = "proofs")]
    pub attachments: Vec<NewAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl From<&NewAccomplishment> for NewAccomplishmentPayload {
    fn from(a: &NewAccomplishment) -> Self {
        NewAccomplishmentPayload {
            title: a.title.clone(),
            description: a.description.clone(),
            time_taken: a.time_taken,
            challenges: a.challenges.clone(),
            comments: a.comments.clone(),
            attachments: a.attachments.clone(),
            task_id: a.task_id.clone(),
        }
    }
}

/// Body of `PUT /accomplishments/{id}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AccomplishmentPayload {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub attachments: Vec<NewAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl AccomplishmentPayload {
    /// Full replacement body: the current record with the patch merged in.
    pub fn merged(current: &Accomplishment, patch: &AccomplishmentPatch) -> Self {
        AccomplishmentPayload {
            title: patch.title.clone().unwrap_or_else(|| current.title.clone()),
            description: patch.description.clone().unwrap_or_else(|| current.description.clone()),
            time_taken: patch.time_taken.or(current.time_taken),
            challenges: patch.challenges.clone().or_else(|| current.challenges.clone()),
            comments: patch.comments.clone().or_else(|| current.comments.clone()),
            attachments: patch
                .attachments
                .clone()
                .unwrap_or_else(|| current.attachments.iter().map(NewAttachment::from).collect()),
            task_id: current.task_id.clone(),
        }
    }
}

/// Body of `POST /projects`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectPayload<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

impl<'a> From<&'a NewProject> for ProjectPayload<'a> {
    fn from(p: &'a NewProject) -> Self {
        ProjectPayload { name: &p.name, description: p.description.as_deref() }
    }
}
