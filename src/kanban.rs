//! Kanban board interactions: dropping cards on columns and the completion
//! gate.
//!
//! Every column is reachable from every other one. Dropping a card on
//! `completed` does not commit anything; it yields a [`PendingCompletion`]
//! that is committed once the completion details are submitted.

use crate::error::ApiError;
use crate::models::{AttachmentKind, NewAttachment, Task, TaskStatus};
use crate::store::{BoardStore, MoveOutcome};

/// Details collected when a task is completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionData {
    /// Minutes actually spent.
    pub time_taken: u32,
    pub challenges: String,
    pub comments: String,
    pub attachments: Vec<NewAttachment>,
}

/// A task waiting for its completion details.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCompletion {
    pub task_id: String,
    pub title: String,
    pub estimated_minutes: u32,
}

impl From<&Task> for PendingCompletion {
    fn from(task: &Task) -> Self {
        PendingCompletion {
            task_id: task.id.clone(),
            title: task.title.clone(),
            estimated_minutes: task.estimated_minutes,
        }
    }
}

impl PendingCompletion {
    /// A form pre-filled with the task's estimate.
    pub fn form(&self) -> CompletionForm {
        CompletionForm { time_taken: self.estimated_minutes, ..Default::default() }
    }
}

/// Editable completion details, the state behind the completion dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionForm {
    pub time_taken: u32,
    pub challenges: String,
    pub comments: String,
    attachments: Vec<NewAttachment>,
}

impl CompletionForm {
    /// Adds an attachment. A blank title is rejected; a blank URL is dropped.
    pub fn add_attachment(&mut self, kind: AttachmentKind, title: &str, url: Option<&str>) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let url = url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string);
        self.attachments.push(NewAttachment { kind, title: title.to_string(), url });
        true
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<NewAttachment> {
        if index < self.attachments.len() {
            Some(self.attachments.remove(index))
        } else {
            None
        }
    }

    pub fn attachments(&self) -> &[NewAttachment] {
        &self.attachments
    }

    pub fn submit(self) -> CompletionData {
        CompletionData {
            time_taken: self.time_taken,
            challenges: self.challenges,
            comments: self.comments,
            attachments: self.attachments,
        }
    }
}

/// Notes stored on a completed task: the original notes followed by the
/// challenges, comments and attachment titles. Empty sections are left out;
/// sections are separated by a blank line.
pub fn completion_notes(original: Option<&str>, data: &CompletionData) -> String {
    let mut sections = Vec::new();
    if let Some(notes) = original.map(str::trim).filter(|n| !n.is_empty()) {
        sections.push(notes.to_string());
    }
    let challenges = data.challenges.trim();
    if !challenges.is_empty() {
        sections.push(format!("Challenges: {}", challenges));
    }
    let comments = data.comments.trim();
    if !comments.is_empty() {
        sections.push(format!("Comments: {}", comments));
    }
    if !data.attachments.is_empty() {
        let titles: Vec<&str> = data.attachments.iter().map(|a| a.title.as_str()).collect();
        sections.push(format!("Attachments: {}", titles.join(", ")));
    }
    sections.join("\n\n")
}

/// What happened to a dropped card.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Unknown task, or dropped on its own column.
    Ignored,
    Moved(Task),
    AwaitingCompletion(PendingCompletion),
}

/// Drops a task on the column for `target`.
pub async fn drop_task(store: &mut BoardStore, task_id: &str, target: TaskStatus) -> Result<DropOutcome, ApiError> {
    match store.task(task_id) {
        None => return Ok(DropOutcome::Ignored),
        Some(task) if task.status == target => return Ok(DropOutcome::Ignored),
        Some(_) => {}
    }
    Ok(match store.move_task(task_id, target).await? {
        MoveOutcome::NotFound => DropOutcome::Ignored,
        MoveOutcome::Moved(task) => DropOutcome::Moved(task),
        MoveOutcome::NeedsCompletion(task) => DropOutcome::AwaitingCompletion(PendingCompletion::from(&task)),
    })
}

/// Commits a pending completion with the submitted details.
pub async fn submit_completion(
    store: &mut BoardStore,
    pending: &PendingCompletion,
    data: CompletionData,
) -> Result<Option<Task>, ApiError> {
    store.complete_task(&pending.task_id, &data).await
}

/// Tasks shown in the column for `status`, in collection order.
pub fn column_tasks(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// The column next to `status`, if there is one.
pub fn neighbor(status: TaskStatus, direction: Direction) -> Option<TaskStatus> {
    let index = TaskStatus::ALL.iter().position(|s| *s == status)?;
    match direction {
        Direction::Left => index.checked_sub(1).map(|i| TaskStatus::ALL[i]),
        Direction::Right => TaskStatus::ALL.get(index + 1).copied(),
    }
}
