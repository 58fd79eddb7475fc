//! In-memory state of the current session and its synchronization with the
//! remote API.
//!
//! Every mutation first calls the API and only reconciles local state once the
//! call succeeded. Failures are logged here, leave local state untouched and
//! are handed back to the caller.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::api::BoardApi;
use crate::error::ApiError;
use crate::kanban::{completion_notes, CompletionData};
use crate::models::{
    Accomplishment, AccomplishmentPatch, DashboardStats, NewAccomplishment, NewProject, NewTask,
    Notification, Project, ProjectSummary, Task, TaskPatch, TaskStatus, TimelineAction, WeeklyStat,
};
use crate::stats::compute_stats;
use crate::timeline::Timeline;

/// Tags a fetch of the selected date's tasks so a slow, outdated response
/// cannot overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    date: NaiveDate,
}

impl FetchTicket {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Result of [`BoardStore::move_task`].
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// No task with that id is loaded. Nothing happened.
    NotFound,
    /// The target is `completed`; nothing was committed. Collect completion
    /// details and call [`BoardStore::complete_task`].
    NeedsCompletion(Task),
    Moved(Task),
}

/// Result of [`BoardStore::update_task`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Committed remotely. Carries the merged task when it is loaded.
    Updated(Option<Task>),
    /// The patch sets `completed`. Nothing was committed; use
    /// [`BoardStore::complete_task`].
    NeedsCompletion,
}

pub struct BoardStore {
    api: Arc<dyn BoardApi>,
    tasks: Vec<Task>,
    accomplishments: Vec<Accomplishment>,
    projects: Vec<Project>,
    timeline: Timeline,
    selected_date: NaiveDate,
    stats: Option<DashboardStats>,
    notifications: Vec<Notification>,
    fetch_seq: u64,
}

impl BoardStore {
    /// Creates an empty store for `selected_date`. Nothing is fetched yet.
    pub fn new(api: Arc<dyn BoardApi>, selected_date: NaiveDate) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            accomplishments: Vec::new(),
            projects: Vec::new(),
            timeline: Timeline::new(),
            selected_date,
            stats: None,
            notifications: Vec::new(),
            fetch_seq: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn accomplishments(&self) -> &[Accomplishment] {
        &self.accomplishments
    }

    /// The accomplishment generated for a task, if one is loaded.
    pub fn accomplishment_for_task(&self, task_id: &str) -> Option<&Accomplishment> {
        self.accomplishments
            .iter()
            .find(|a| a.task_id.as_deref() == Some(task_id))
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Last stats snapshot fetched from the server.
    pub fn stats_snapshot(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    /// Stats derived from the tasks currently in memory.
    pub fn local_stats(&self) -> DashboardStats {
        compute_stats(&self.tasks)
    }

    /// Drains the pending success notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let notification = Notification { title: title.into(), message: message.into() };
        info!(title = %notification.title, "{}", notification.message);
        self.notifications.push(notification);
    }

    /// Changes the active date and loads its tasks.
    pub async fn set_selected_date(&mut self, date: NaiveDate) -> Result<(), ApiError> {
        self.selected_date = date;
        self.refresh_tasks().await
    }

    /// Reloads the tasks of the selected date.
    pub async fn refresh_tasks(&mut self) -> Result<(), ApiError> {
        let ticket = self.begin_fetch();
        let tasks = self
            .api
            .list_tasks_by_date(ticket.date)
            .await
            .inspect_err(|e| error!(date = %ticket.date, error = %e, "failed to load tasks"))?;
        self.apply_fetch(ticket, tasks);
        Ok(())
    }

    /// Loads every task regardless of date. Pending date fetches become stale.
    pub async fn load_all_tasks(&mut self) -> Result<(), ApiError> {
        self.fetch_seq += 1;
        self.tasks = self
            .api
            .list_tasks()
            .await
            .inspect_err(|e| error!(error = %e, "failed to load tasks"))?;
        Ok(())
    }

    /// Starts a fetch for the selected date. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        FetchTicket { seq: self.fetch_seq, date: self.selected_date }
    }

    /// Installs fetched tasks if `ticket` is still the latest fetch for the
    /// selected date. Returns whether they were applied.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        if ticket.seq != self.fetch_seq || ticket.date != self.selected_date {
            debug!(date = %ticket.date, "discarding stale task fetch");
            return false;
        }
        debug!(date = %ticket.date, count = tasks.len(), "tasks loaded");
        self.tasks = tasks;
        true
    }

    /// Makes sure the task is in memory, fetching it by id if needed.
    pub async fn ensure_task(&mut self, id: &str) -> Result<Task, ApiError> {
        if let Some(task) = self.task(id) {
            return Ok(task.clone());
        }
        let task = self
            .api
            .get_task(id)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to load task"))?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn add_task(&mut self, input: NewTask) -> Result<Task, ApiError> {
        let task = self
            .api
            .create_task(&input)
            .await
            .inspect_err(|e| error!(title = %input.title, error = %e, "failed to create task"))?;
        self.tasks.push(task.clone());
        self.timeline.record(
            TimelineAction::TaskCreated,
            Some(format!("Created task: {}", task.title)),
            Some(task.id.clone()),
            None,
        );
        self.notify("Task created", format!("\"{}\" has been added to your board.", task.title));
        Ok(task)
    }

    /// Sends `patch` to the server and merges it into the local task.
    ///
    /// The server's canonical record is not re-fetched. A patch that sets
    /// `completed` is refused without calling the API.
    pub async fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<UpdateOutcome, ApiError> {
        if patch.status == Some(TaskStatus::Completed) {
            debug!(id, "completion requires details, not committing update");
            return Ok(UpdateOutcome::NeedsCompletion);
        }
        let patch = with_completion_timestamp(patch);
        self.api
            .update_task(id, &patch)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to update task"))?;
        let updated = self.merge_local(id, &patch);
        self.timeline.record(
            TimelineAction::TaskUpdated,
            Some("Updated task details".to_string()),
            Some(id.to_string()),
            None,
        );
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Moves a task to another column.
    ///
    /// Moving to `completed` never commits here; see [`MoveOutcome::NeedsCompletion`].
    pub async fn move_task(&mut self, id: &str, status: TaskStatus) -> Result<MoveOutcome, ApiError> {
        let Some(task) = self.task(id).cloned() else {
            return Ok(MoveOutcome::NotFound);
        };
        if status == TaskStatus::Completed {
            debug!(id, "completion requires details, not committing move");
            return Ok(MoveOutcome::NeedsCompletion(task));
        }

        let patch = with_completion_timestamp(TaskPatch::status(status));
        self.api
            .update_task(id, &patch)
            .await
            .inspect_err(|e| error!(id, %status, error = %e, "failed to move task"))?;
        let moved = self.merge_local(id, &patch).unwrap_or(task);
        self.timeline.record(
            TimelineAction::TaskMoved,
            Some(format!("Moved to {}", status.label())),
            Some(id.to_string()),
            None,
        );
        self.notify(
            format!("Task {}", status.label().to_lowercase()),
            format!("\"{}\" moved to {}.", moved.title, status.label()),
        );
        Ok(MoveOutcome::Moved(moved))
    }

    /// Commits a task as completed with the details collected for it.
    ///
    /// This is the only way a task reaches `completed`. Afterwards the task's
    /// accomplishment is created unless it already has one; a failure there is
    /// logged and does not undo the completion.
    pub async fn complete_task(&mut self, id: &str, data: &CompletionData) -> Result<Option<Task>, ApiError> {
        let Some(task) = self.task(id).cloned() else {
            return Ok(None);
        };

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            actual_minutes: Some(data.time_taken),
            completed_at: Some(Some(Utc::now())),
            notes: Some(completion_notes(task.notes.as_deref(), data)),
            ..Default::default()
        };
        self.api
            .update_task(id, &patch)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to complete task"))?;
        let completed = self.merge_local(id, &patch).unwrap_or(task);
        self.timeline.record(
            TimelineAction::TaskMoved,
            Some(format!("Moved to {}", TaskStatus::Completed.label())),
            Some(id.to_string()),
            None,
        );
        self.notify("Task completed", format!("\"{}\" moved to Completed.", completed.title));

        if self.has_accomplishment(id).await {
            debug!(id, "task already has an accomplishment");
        } else {
            let input = NewAccomplishment {
                task_id: Some(id.to_string()),
                title: format!("Completed: {}", completed.title),
                description: completed.description.clone(),
                time_taken: Some(data.time_taken),
                challenges: non_blank(&data.challenges),
                comments: non_blank(&data.comments),
                attachments: data.attachments.clone(),
            };
            if self.add_accomplishment(input).await.is_err() {
                warn!(id, "task completed without an accomplishment");
            }
        }
        Ok(Some(completed))
    }

    /// Whether the task already has an accomplishment, locally or on the
    /// server. When the server cannot be asked, answers `true` so no
    /// duplicate gets created.
    async fn has_accomplishment(&mut self, task_id: &str) -> bool {
        if self.accomplishment_for_task(task_id).is_some() {
            return true;
        }
        match self.load_accomplishments_for_task(task_id).await {
            Ok(found) => !found.is_empty(),
            Err(_) => true,
        }
    }

    /// Deletes a loaded task. Unknown ids are ignored without a remote call.
    ///
    /// The task stays in memory if the server refuses the delete.
    pub async fn delete_task(&mut self, id: &str) -> Result<bool, ApiError> {
        let Some(task) = self.task(id).cloned() else {
            return Ok(false);
        };
        self.api
            .delete_task(id)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to delete task"))?;
        self.timeline.record(
            TimelineAction::TaskDeleted,
            Some(format!("Deleted task: {}", task.title)),
            Some(id.to_string()),
            None,
        );
        self.notify("Task deleted", format!("\"{}\" has been removed.", task.title));
        self.tasks.retain(|t| t.id != id);
        Ok(true)
    }

    fn merge_local(&mut self, id: &str, patch: &TaskPatch) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        patch.apply_to(task);
        task.updated_at = Utc::now().max(task.updated_at);
        Some(task.clone())
    }

    pub async fn load_accomplishments(&mut self) -> Result<(), ApiError> {
        self.accomplishments = self
            .api
            .list_accomplishments()
            .await
            .inspect_err(|e| error!(error = %e, "failed to load accomplishments"))?;
        Ok(())
    }

    /// Fetches a task's accomplishments and replaces the loaded ones.
    pub async fn load_accomplishments_for_task(&mut self, task_id: &str) -> Result<Vec<Accomplishment>, ApiError> {
        let found = self
            .api
            .list_accomplishments_by_task(task_id)
            .await
            .inspect_err(|e| error!(task_id, error = %e, "failed to load accomplishments"))?;
        self.accomplishments
            .retain(|a| a.task_id.as_deref() != Some(task_id));
        self.accomplishments.extend(found.iter().cloned());
        Ok(found)
    }

    pub async fn add_accomplishment(&mut self, input: NewAccomplishment) -> Result<Accomplishment, ApiError> {
        let accomplishment = self
            .api
            .create_accomplishment(&input)
            .await
            .inspect_err(|e| error!(title = %input.title, error = %e, "failed to create accomplishment"))?;
        self.accomplishments.push(accomplishment.clone());
        self.timeline.record(
            TimelineAction::AccomplishmentAdded,
            Some(format!("Added accomplishment: {}", accomplishment.title)),
            accomplishment.task_id.clone(),
            Some(accomplishment.id.clone()),
        );
        self.notify(
            "Accomplishment added",
            format!("\"{}\" has been logged.", accomplishment.title),
        );
        Ok(accomplishment)
    }

    /// Updates a loaded accomplishment. Unknown ids are ignored.
    pub async fn update_accomplishment(
        &mut self,
        id: &str,
        patch: AccomplishmentPatch,
    ) -> Result<Option<Accomplishment>, ApiError> {
        let Some(current) = self.accomplishments.iter().find(|a| a.id == id).cloned() else {
            return Ok(None);
        };
        let updated = self
            .api
            .update_accomplishment(&current, &patch)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to update accomplishment"))?;
        if let Some(slot) = self.accomplishments.iter_mut().find(|a| a.id == id) {
            *slot = updated.clone();
        }
        self.timeline.record(
            TimelineAction::AccomplishmentUpdated,
            Some("Updated accomplishment details".to_string()),
            None,
            Some(id.to_string()),
        );
        Ok(Some(updated))
    }

    /// Deletes a loaded accomplishment. Unknown ids are ignored.
    pub async fn delete_accomplishment(&mut self, id: &str) -> Result<bool, ApiError> {
        let Some(current) = self.accomplishments.iter().find(|a| a.id == id).cloned() else {
            return Ok(false);
        };
        self.api
            .delete_accomplishment(id)
            .await
            .inspect_err(|e| error!(id, error = %e, "failed to delete accomplishment"))?;
        self.accomplishments.retain(|a| a.id != id);
        self.timeline.record(
            TimelineAction::AccomplishmentDeleted,
            Some(format!("Deleted accomplishment: {}", current.title)),
            current.task_id.clone(),
            Some(id.to_string()),
        );
        Ok(true)
    }

    /// Deletes every accomplishment of a task. Returns how many loaded ones
    /// were dropped from memory.
    pub async fn delete_accomplishments_for_task(&mut self, task_id: &str) -> Result<usize, ApiError> {
        self.api
            .delete_accomplishments_by_task(task_id)
            .await
            .inspect_err(|e| error!(task_id, error = %e, "failed to delete accomplishments"))?;
        let before = self.accomplishments.len();
        self.accomplishments
            .retain(|a| a.task_id.as_deref() != Some(task_id));
        let removed = before - self.accomplishments.len();
        self.timeline.record(
            TimelineAction::AccomplishmentDeleted,
            Some("Deleted all accomplishments of the task".to_string()),
            Some(task_id.to_string()),
            None,
        );
        Ok(removed)
    }

    pub async fn load_projects(&mut self) -> Result<(), ApiError> {
        self.projects = self
            .api
            .list_projects()
            .await
            .inspect_err(|e| error!(error = %e, "failed to load projects"))?;
        Ok(())
    }

    pub async fn add_project(&mut self, input: NewProject) -> Result<Project, ApiError> {
        let project = self
            .api
            .create_project(&input)
            .await
            .inspect_err(|e| error!(name = %input.name, error = %e, "failed to create project"))?;
        self.projects.push(project.clone());
        self.notify("Project created", format!("\"{}\" is ready for tasks.", project.name));
        Ok(project)
    }

    /// Replaces the stats snapshot. On failure the previous snapshot stays.
    pub async fn fetch_stats(&mut self, date: NaiveDate) -> Result<DashboardStats, ApiError> {
        let stats = self
            .api
            .dashboard_stats(date)
            .await
            .inspect_err(|e| error!(%date, error = %e, "failed to fetch dashboard stats"))?;
        self.stats = Some(stats.clone());
        Ok(stats)
    }

    pub async fn weekly_stats(&self, date: NaiveDate) -> Result<Vec<WeeklyStat>, ApiError> {
        self.api
            .weekly_stats(date)
            .await
            .inspect_err(|e| error!(%date, error = %e, "failed to fetch weekly stats"))
    }

    pub async fn summary(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ProjectSummary>, ApiError> {
        self.api
            .summary_table(start, end)
            .await
            .inspect_err(|e| error!(%start, %end, error = %e, "failed to fetch summary"))
    }
}

/// Keeps `completed_at` in step with a status change: set when completing,
/// cleared for any other status.
fn with_completion_timestamp(mut patch: TaskPatch) -> TaskPatch {
    match patch.status {
        Some(TaskStatus::Completed) if patch.completed_at.is_none() => {
            patch.completed_at = Some(Some(Utc::now()));
        }
        Some(status) if status != TaskStatus::Completed => {
            patch.completed_at = Some(None);
        }
        _ => {}
    }
    patch
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
