use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kanban status of a task. The declaration order is the board's column order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Planned,
    #[serde(alias = "in-progress")]
    InProgress,
    Completed,
    Discarded,
}

impl TaskStatus {
    /// All statuses in column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Planned,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Discarded,
    ];

    /// Wire value of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Planned => "planned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Discarded => "discarded",
        }
    }

    /// Human readable column title.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Planned => "Planned",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Discarded => "Discarded",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(TaskStatus::Planned),
            "in_progress" | "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "discarded" => Ok(TaskStatus::Discarded),
            other => Err(format!(
                "unknown status '{}' (expected planned, in_progress, completed or discarded)",
                other
            )),
        }
    }
}

/// Declared from lowest to highest, so priorities compare by urgency.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(format!("unknown priority '{}' (expected low, medium or high)", other)),
        }
    }
}

/// Represents a single task on the board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Server assigned identifier.
    pub id: String,
    /// Short title, never empty.
    pub title: String,
    /// Longer description; empty when the server sent none.
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Estimated duration in minutes.
    pub estimated_minutes: u32,
    /// Minutes actually spent, collected when the task is completed.
    pub actual_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set if and only if the task is completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// The day the task is scheduled for.
    pub date: NaiveDate,
    /// Owning project, if any.
    pub project_id: Option<String>,
}

/// Input for creating a task. The server assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_minutes: u32,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub project_id: Option<String>,
}

/// Partial update of a task. `None` fields are left untouched.
///
/// `completed_at` is doubly optional so a patch can clear the timestamp
/// (`Some(None)`, sent as `null`) as well as leave it alone (`None`).
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "estimated_time", skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        TaskPatch { status: Some(status), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Merges the patch into `task`. Does not touch `updated_at`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(t) = &self.title { task.title = t.clone(); }
        if let Some(d) = &self.description { task.description = d.clone(); }
        if let Some(s) = self.status { task.status = s; }
        if let Some(p) = self.priority { task.priority = p; }
        if let Some(m) = self.estimated_minutes { task.estimated_minutes = m; }
        if let Some(m) = self.actual_minutes { task.actual_minutes = Some(m); }
        if let Some(c) = self.completed_at { task.completed_at = c; }
        if let Some(n) = &self.notes { task.notes = Some(n.clone()); }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    #[serde(rename = "pr", alias = "pull_request")]
    PullRequest,
    #[serde(rename = "screenshot")]
    Screenshot,
    #[serde(rename = "document")]
    Document,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::PullRequest => "pr",
            AttachmentKind::Screenshot => "screenshot",
            AttachmentKind::Document => "document",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pr" | "pull_request" | "pull-request" => Ok(AttachmentKind::PullRequest),
            "screenshot" => Ok(AttachmentKind::Screenshot),
            "document" | "doc" => Ok(AttachmentKind::Document),
            other => Err(format!(
                "unknown attachment type '{}' (expected pr, screenshot or document)",
                other
            )),
        }
    }
}

/// Evidence attached to an accomplishment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub title: String,
    pub url: Option<String>,
}

/// An attachment that has not been stored yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewAttachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Attachment> for NewAttachment {
    fn from(a: &Attachment) -> Self {
        NewAttachment { kind: a.kind, title: a.title.clone(), url: a.url.clone() }
    }
}

/// A record of completed or noteworthy work.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Accomplishment {
    pub id: String,
    /// Task this accomplishment was generated from, if any.
    pub task_id: Option<String>,
    pub title: String,
    pub description: String,
    /// Minutes the work took.
    pub time_taken: Option<u32>,
    pub challenges: Option<String>,
    /// Follow-up comments.
    pub comments: Option<String>,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccomplishment {
    pub task_id: Option<String>,
    pub title: String,
    pub description: String,
    pub time_taken: Option<u32>,
    pub challenges: Option<String>,
    pub comments: Option<String>,
    pub attachments: Vec<NewAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccomplishmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_taken: Option<u32>,
    pub challenges: Option<String>,
    pub comments: Option<String>,
    pub attachments: Option<Vec<NewAttachment>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

/// Category of a timeline entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelineAction {
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskDeleted,
    AccomplishmentAdded,
    AccomplishmentUpdated,
    AccomplishmentDeleted,
}

impl TimelineAction {
    pub fn label(self) -> &'static str {
        match self {
            TimelineAction::TaskCreated => "Task Created",
            TimelineAction::TaskUpdated => "Task Updated",
            TimelineAction::TaskMoved => "Task Moved",
            TimelineAction::TaskDeleted => "Task Deleted",
            TimelineAction::AccomplishmentAdded => "Accomplishment Added",
            TimelineAction::AccomplishmentUpdated => "Accomplishment Updated",
            TimelineAction::AccomplishmentDeleted => "Accomplishment Deleted",
        }
    }
}

impl fmt::Display for TimelineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One audit record of a state-changing action in the current session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: TimelineAction,
    pub description: Option<String>,
    pub task_id: Option<String>,
    pub accomplishment_id: Option<String>,
}

/// Aggregate counters for the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub planned_tasks: u32,
    pub in_progress_tasks: u32,
    pub completed_tasks: u32,
    pub discarded_tasks: u32,
    pub total_estimated_minutes: u64,
    pub total_actual_minutes: u64,
    /// Percentage of completed tasks, 0 when there are none.
    pub completion_rate: f64,
}

impl DashboardStats {
    pub fn total_tasks(&self) -> u32 {
        self.planned_tasks + self.in_progress_tasks + self.completed_tasks + self.discarded_tasks
    }
}

/// Planned vs. completed counts for one day of the week.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeeklyStat {
    pub day: String,
    pub planned: u32,
    pub completed: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectSummaryRow {
    pub delivery_details: String,
    pub accomplishments: String,
    pub approach: String,
}

/// Highlights of one project over a date range.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub project_name: String,
    pub rows: Vec<ProjectSummaryRow>,
}

/// A success message for the user, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}
