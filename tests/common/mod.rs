#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use focusboard::api::BoardApi;
use focusboard::error::ApiError;
use focusboard::models::{
    Accomplishment, AccomplishmentPatch, Attachment, DashboardStats, NewAccomplishment, NewProject, NewTask,
    Project, ProjectSummary, Task, TaskPatch, TaskPriority, TaskStatus, WeeklyStat,
};
use focusboard::store::BoardStore;

/// In-memory stand-in for the board backend.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub tasks: Vec<Task>,
    pub accomplishments: Vec<Accomplishment>,
    pub projects: Vec<Project>,
    pub stats: DashboardStats,
    pub weekly: Vec<WeeklyStat>,
    pub summary: Vec<ProjectSummary>,
    pub task_patches: Vec<(String, TaskPatch)>,
    pub calls: Vec<&'static str>,
    pub failing: HashSet<&'static str>,
    next_id: u64,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let api = Self::default();
        api.state.lock().unwrap().tasks = tasks;
        Arc::new(api)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Makes every later call of `op` fail with HTTP 500.
    pub fn fail(&self, op: &'static str) {
        self.state().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.state().failing.remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.len()
    }

    pub fn add_accomplishment(&self, accomplishment: Accomplishment) {
        self.state().accomplishments.push(accomplishment);
    }

    fn enter(&self, op: &'static str, message: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        state.calls.push(op);
        if state.failing.contains(op) {
            return Err(ApiError::Request { message, status: 500 });
        }
        Ok(state)
    }
}

impl FakeState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("srv-{}", self.next_id)
    }
}

#[async_trait]
impl BoardApi for FakeApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let state = self.enter("list_tasks", "Failed to get tasks")?;
        Ok(state.tasks.clone())
    }

    async fn list_tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, ApiError> {
        let state = self.enter("list_tasks_by_date", "Failed to get tasks")?;
        Ok(state.tasks.iter().filter(|t| t.date == date).cloned().collect())
    }

    async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        let state = self.enter("get_task", "Failed to get task")?;
        state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::Request { message: "Failed to get task", status: 404 })
    }

    async fn create_task(&self, input: &NewTask) -> Result<Task, ApiError> {
        let mut state = self.enter("create_task", "Failed to create task")?;
        let now = Utc::now();
        let task = Task {
            id: state.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status,
            priority: input.priority,
            estimated_minutes: input.estimated_minutes,
            actual_minutes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            notes: input.notes.clone(),
            date: input.date,
            project_id: input.project_id.clone(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<(), ApiError> {
        let mut state = self.enter("update_task", "Failed to update task")?;
        state.task_patches.push((id.to_string(), patch.clone()));
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::Request { message: "Failed to update task", status: 404 })?;
        patch.apply_to(task);
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        let mut state = self.enter("delete_task", "Failed to delete task")?;
        state.tasks.retain(|t| t.id != id);
        Ok(serde_json::json!({ "message": "Task deleted" }))
    }

    async fn list_accomplishments(&self) -> Result<Vec<Accomplishment>, ApiError> {
        let state = self.enter("list_accomplishments", "Failed to get accomplishments")?;
        Ok(state.accomplishments.clone())
    }

    async fn list_accomplishments_by_task(&self, task_id: &str) -> Result<Vec<Accomplishment>, ApiError> {
        let state = self.enter("list_accomplishments_by_task", "Failed to get accomplishments")?;
        Ok(state
            .accomplishments
            .iter()
            .filter(|a| a.task_id.as_deref() == Some(task_id))
            .cloned()
            .collect())
    }

    async fn create_accomplishment(&self, input: &NewAccomplishment) -> Result<Accomplishment, ApiError> {
        let mut state = self.enter("create_accomplishment", "Failed to create accomplishment")?;
        let now = Utc::now();
        let mut attachments = Vec::new();
        for a in &input.attachments {
            attachments.push(Attachment { id: state.next_id(), kind: a.kind, title: a.title.clone(), url: a.url.clone() });
        }
        let accomplishment = Accomplishment {
            id: state.next_id(),
            task_id: input.task_id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            time_taken: input.time_taken,
            challenges: input.challenges.clone(),
            comments: input.comments.clone(),
            attachments,
            created_at: now,
            updated_at: now,
        };
        state.accomplishments.push(accomplishment.clone());
        Ok(accomplishment)
    }

    async fn update_accomplishment(
        &self,
        current: &Accomplishment,
        patch: &AccomplishmentPatch,
    ) -> Result<Accomplishment, ApiError> {
        let mut state = self.enter("update_accomplishment", "Failed to update accomplishment")?;
        let mut updated = current.clone();
        if let Some(t) = &patch.title { updated.title = t.clone(); }
        if let Some(d) = &patch.description { updated.description = d.clone(); }
        if let Some(m) = patch.time_taken { updated.time_taken = Some(m); }
        if let Some(c) = &patch.challenges { updated.challenges = Some(c.clone()); }
        if let Some(c) = &patch.comments { updated.comments = Some(c.clone()); }
        updated.updated_at = Utc::now();
        if let Some(slot) = state.accomplishments.iter_mut().find(|a| a.id == current.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_accomplishment(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        let mut state = self.enter("delete_accomplishment", "Failed to delete accomplishment")?;
        state.accomplishments.retain(|a| a.id != id);
        Ok(serde_json::Value::Null)
    }

    async fn delete_accomplishments_by_task(&self, task_id: &str) -> Result<serde_json::Value, ApiError> {
        let mut state = self.enter("delete_accomplishments_by_task", "Failed to delete accomplishments")?;
        state.accomplishments.retain(|a| a.task_id.as_deref() != Some(task_id));
        Ok(serde_json::Value::Null)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let state = self.enter("list_projects", "Failed to get projects")?;
        Ok(state.projects.clone())
    }

    async fn create_project(&self, input: &NewProject) -> Result<Project, ApiError> {
        let mut state = self.enter("create_project", "Failed to create project")?;
        let project = Project { id: state.next_id(), name: input.name.clone(), description: input.description.clone() };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn dashboard_stats(&self, _date: NaiveDate) -> Result<DashboardStats, ApiError> {
        let state = self.enter("dashboard_stats", "Failed to get dashboard stats")?;
        Ok(state.stats.clone())
    }

    async fn weekly_stats(&self, _date: NaiveDate) -> Result<Vec<WeeklyStat>, ApiError> {
        let state = self.enter("weekly_stats", "Failed to get weekly stats")?;
        Ok(state.weekly.clone())
    }

    async fn summary_table(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<ProjectSummary>, ApiError> {
        let state = self.enter("summary_table", "Failed to get summary table")?;
        Ok(state.summary.clone())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn task(id: &str, title: &str, status: TaskStatus, date: NaiveDate) -> Task {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status,
        priority: TaskPriority::Medium,
        estimated_minutes: 30,
        actual_minutes: None,
        created_at: created,
        updated_at: created,
        completed_at: (status == TaskStatus::Completed).then_some(created),
        notes: None,
        date,
        project_id: Some("p1".to_string()),
    }
}

pub fn accomplishment(id: &str, task_id: Option<&str>, title: &str) -> Accomplishment {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    Accomplishment {
        id: id.to_string(),
        task_id: task_id.map(str::to_string),
        title: title.to_string(),
        description: String::new(),
        time_taken: None,
        challenges: None,
        comments: None,
        attachments: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

/// A store over `api` with the tasks of `date` loaded.
pub async fn loaded_store(api: &Arc<FakeApi>, date: NaiveDate) -> BoardStore {
    let mut store = BoardStore::new(api.clone(), date);
    store.refresh_tasks().await.unwrap();
    store
}
