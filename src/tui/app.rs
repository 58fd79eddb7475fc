use chrono::Duration;
use ratatui::widgets::TableState;

use crate::commands::parse_attachment;
use crate::error::ApiError;
use crate::kanban::{column_tasks, drop_task, neighbor, submit_completion, CompletionForm, Direction, DropOutcome, PendingCompletion};
use crate::models::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus, WeeklyStat};
use crate::store::BoardStore;
use crate::timeline::TimelineFilter;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Completing,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Board,
    Dashboard,
    Timeline,
    Accomplishments,
}

impl ViewMode {
    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Board => "Board",
            ViewMode::Dashboard => "Dashboard",
            ViewMode::Timeline => "Timeline",
            ViewMode::Accomplishments => "Accomplishments",
        }
    }
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub project: Option<String>,
    pub estimate: Option<u32>,
    pub step: usize, // 0: Title, 1: Project, 2: Estimate, 3: Column
}

/// State of the completion dialog shown when a card lands on Completed.
pub struct CompleteState {
    pub pending: PendingCompletion,
    pub form: CompletionForm,
    pub step: usize, // 0: Time, 1: Challenges, 2: Comments, 3..: Attachments
}

/// Last message shown in the status bar.
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct App<'a> {
    pub store: &'a mut BoardStore,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub column: usize,
    pub column_states: [TableState; 4],
    pub timeline_state: TableState,
    pub accomplishment_state: TableState,
    pub timeline_filter: TimelineFilter,
    pub timeline_search: String,
    pub add_state: AddState,
    pub completion: Option<CompleteState>,
    pub weekly: Vec<WeeklyStat>,
    pub status: Option<StatusLine>,
    pub default_estimate: u32,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut BoardStore, default_estimate: u32) -> App<'a> {
        App {
            store,
            view_mode: ViewMode::Board,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            column: 0,
            column_states: Default::default(),
            timeline_state: TableState::default(),
            accomplishment_state: TableState::default(),
            timeline_filter: TimelineFilter::All,
            timeline_search: String::new(),
            add_state: AddState::default(),
            completion: None,
            weekly: Vec::new(),
            status: None,
            default_estimate,
        }
    }

    pub fn current_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.column]
    }

    /// Tasks shown in a column.
    pub fn column_tasks(&self, column: usize) -> Vec<&Task> {
        column_tasks(self.store.tasks(), TaskStatus::ALL[column])
    }

    pub fn selected_task(&self) -> Option<Task> {
        let i = self.column_states[self.column].selected()?;
        self.column_tasks(self.column).get(i).map(|t| (*t).clone())
    }

    /// Loads the selected day's tasks plus everything the other views show.
    pub async fn reload(&mut self) {
        let date = self.store.selected_date();
        if let Err(e) = self.store.refresh_tasks().await {
            self.show_error(&e);
        }
        if let Err(e) = self.store.load_projects().await {
            self.show_error(&e);
        }
        if let Err(e) = self.store.load_accomplishments().await {
            self.show_error(&e);
        }
        if let Err(e) = self.store.fetch_stats(date).await {
            self.show_error(&e);
        }
        match self.store.weekly_stats(date).await {
            Ok(w) => self.weekly = w,
            Err(e) => self.show_error(&e),
        }
        self.clamp_selection();
    }

    /// Moves the board to another day.
    pub async fn shift_day(&mut self, days: i64) {
        let date = self.store.selected_date() + Duration::days(days);
        if let Err(e) = self.store.set_selected_date(date).await {
            self.show_error(&e);
        }
        if let Err(e) = self.store.fetch_stats(date).await {
            self.show_error(&e);
        }
        if let Ok(w) = self.store.weekly_stats(date).await {
            self.weekly = w;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        for column in 0..TaskStatus::ALL.len() {
            let len = self.column_tasks(column).len();
            clamp(&mut self.column_states[column], len);
        }
        let len = self.timeline_rows();
        clamp(&mut self.timeline_state, len);
        let len = self.store.accomplishments().len();
        clamp(&mut self.accomplishment_state, len);
    }

    /// Number of timeline entries matching the current filter.
    pub fn timeline_rows(&self) -> usize {
        self.store.timeline().filter(self.timeline_filter, &self.timeline_search).len()
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        let (state, len) = self.active_list();
        if len == 0 { return; }
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        let (state, len) = self.active_list();
        if len == 0 { return; }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn active_list(&mut self) -> (&mut TableState, usize) {
        match self.view_mode {
            ViewMode::Board | ViewMode::Dashboard => {
                let len = self.column_tasks(self.column).len();
                (&mut self.column_states[self.column], len)
            }
            ViewMode::Timeline => {
                let len = self.timeline_rows();
                (&mut self.timeline_state, len)
            }
            ViewMode::Accomplishments => {
                let len = self.store.accomplishments().len();
                (&mut self.accomplishment_state, len)
            }
        }
    }

    pub fn focus_column(&mut self, direction: Direction) {
        if let Some(status) = neighbor(self.current_status(), direction) {
            self.column = column_index(status);
            let len = self.column_tasks(self.column).len();
            clamp(&mut self.column_states[self.column], len);
        }
    }

    /// Drags the selected card to the neighbouring column.
    pub async fn drag_selected(&mut self, direction: Direction) {
        if let Some(target) = neighbor(self.current_status(), direction) {
            self.drop_selected(target).await;
        }
    }

    /// Drops the selected card on a column. Dropping on Completed opens the
    /// completion dialog instead of moving the card.
    pub async fn drop_selected(&mut self, target: TaskStatus) {
        let Some(task) = self.selected_task() else { return; };
        match drop_task(self.store, &task.id, target).await {
            Ok(DropOutcome::Ignored) => {}
            Ok(DropOutcome::Moved(moved)) => {
                self.pull_notifications();
                self.select_task(&moved);
            }
            Ok(DropOutcome::AwaitingCompletion(pending)) => self.start_completion(pending),
            Err(e) => self.show_error(&e),
        }
    }

    fn select_task(&mut self, task: &Task) {
        self.column = column_index(task.status);
        let index = self.column_tasks(self.column).iter().position(|t| t.id == task.id);
        self.column_states[self.column].select(index);
        self.clamp_selection();
    }

    fn start_completion(&mut self, pending: PendingCompletion) {
        let form = pending.form();
        self.input_buffer = form.time_taken.to_string();
        self.completion = Some(CompleteState { pending, form, step: 0 });
        self.input_mode = InputMode::Completing;
    }

    /// Closes the completion dialog. The card stays where it was.
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.completion = None;
    }

    /// Deletes the selected task.
    pub async fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else { return; };
        match self.store.delete_task(&task.id).await {
            Ok(_) => self.pull_notifications(),
            Err(e) => self.show_error(&e),
        }
        self.clamp_selection();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        if self.store.projects().is_empty() {
            self.show_message("Create a project first (focusboard project add <name>).", true);
            return;
        }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn start_edit_title(&mut self) {
        if let Some(task) = self.selected_task() {
            self.input_mode = InputMode::Editing;
            self.input_buffer = task.title;
        }
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Searching;
        self.input_buffer = self.timeline_search.clone();
    }

    /// Applies the search buffer while it is typed.
    pub fn update_search(&mut self) {
        self.timeline_search = self.input_buffer.clone();
        let len = self.timeline_rows();
        clamp(&mut self.timeline_state, len);
    }

    pub fn cycle_filter(&mut self) {
        self.timeline_filter = self.timeline_filter.next();
        let len = self.timeline_rows();
        clamp(&mut self.timeline_state, len);
    }

    pub fn cycle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Board => ViewMode::Dashboard,
            ViewMode::Dashboard => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Accomplishments,
            ViewMode::Accomplishments => ViewMode::Board,
        };
        self.clamp_selection();
    }

    /// Handles Enter based on the current mode.
    pub async fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input().await,
            InputMode::Editing => self.handle_editing_input().await,
            InputMode::Completing => self.handle_completion_input().await,
            InputMode::Searching => {
                self.update_search();
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            InputMode::Normal => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    async fn handle_adding_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Title
                if !value.is_empty() {
                    self.add_state.title = value;
                    self.add_state.step += 1;
                    self.input_buffer = self.store.projects().first().map(|p| p.id.clone()).unwrap_or_default();
                }
            }
            1 => { // Project, by id or name
                let project = self
                    .store
                    .projects()
                    .iter()
                    .find(|p| p.id == value || p.name.eq_ignore_ascii_case(&value))
                    .map(|p| p.id.clone());
                if project.is_some() {
                    self.add_state.project = project;
                    self.add_state.step += 1;
                    self.input_buffer = self.default_estimate.to_string();
                }
            }
            2 => { // Estimate
                if let Ok(m) = value.parse::<u32>() {
                    self.add_state.estimate = Some(m);
                    self.add_state.step += 1;
                    self.input_buffer = TaskStatus::Planned.to_string();
                } else if value.is_empty() {
                    self.add_state.estimate = Some(self.default_estimate);
                    self.add_state.step += 1;
                    self.input_buffer = TaskStatus::Planned.to_string();
                }
            }
            3 => { // Column
                let status = match value.parse::<TaskStatus>() {
                    Ok(s @ (TaskStatus::Planned | TaskStatus::InProgress)) => s,
                    _ if value.is_empty() => TaskStatus::Planned,
                    _ => return,
                };
                let input = NewTask {
                    title: self.add_state.title.clone(),
                    description: String::new(),
                    status,
                    priority: TaskPriority::default(),
                    estimated_minutes: self.add_state.estimate.unwrap_or(self.default_estimate),
                    notes: None,
                    date: self.store.selected_date(),
                    project_id: self.add_state.project.clone(),
                };
                match self.store.add_task(input).await {
                    Ok(task) => {
                        self.pull_notifications();
                        self.select_task(&task);
                    }
                    Err(e) => self.show_error(&e),
                }
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            _ => {}
        }
    }

    /// Handles input for the "Edit Title" mode.
    async fn handle_editing_input(&mut self) {
        let title = self.input_buffer.trim().to_string();
        if title.is_empty() { return; }
        if let Some(task) = self.selected_task() {
            let patch = TaskPatch { title: Some(title), ..Default::default() };
            if let Err(e) = self.store.update_task(&task.id, patch).await {
                self.show_error(&e);
            }
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles input for the completion dialog. Attachments are entered one
    /// per line as `KIND:TITLE[:URL]`; an empty line submits.
    async fn handle_completion_input(&mut self) {
        let Some(state) = self.completion.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let value = self.input_buffer.trim().to_string();
        match state.step {
            0 => { // Time taken
                match value.parse::<u32>() {
                    Ok(m) => state.form.time_taken = m,
                    Err(_) if value.is_empty() => {}
                    Err(_) => return,
                }
                state.step += 1;
                self.input_buffer.clear();
            }
            1 => { // Challenges
                state.form.challenges = value;
                state.step += 1;
                self.input_buffer.clear();
            }
            2 => { // Comments
                state.form.comments = value;
                state.step += 1;
                self.input_buffer.clear();
            }
            _ if !value.is_empty() => { // Attachment
                match parse_attachment(&value) {
                    Ok(a) => {
                        state.form.add_attachment(a.kind, &a.title, a.url.as_deref());
                        self.input_buffer.clear();
                    }
                    Err(e) => self.show_message(&e, true),
                }
            }
            _ => {
                let Some(state) = self.completion.take() else { return; };
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                match submit_completion(self.store, &state.pending, state.form.submit()).await {
                    Ok(Some(task)) => {
                        self.pull_notifications();
                        self.select_task(&task);
                    }
                    Ok(None) => self.show_message("Task no longer on the board.", true),
                    Err(e) => self.show_error(&e),
                }
            }
        }
    }

    /// Drops the last attachment of the open completion dialog.
    pub fn remove_last_attachment(&mut self) {
        if let Some(state) = self.completion.as_mut() {
            let len = state.form.attachments().len();
            if len > 0 {
                state.form.remove_attachment(len - 1);
            }
        }
    }

    /// Moves pending store notifications to the status bar, oldest first.
    pub fn pull_notifications(&mut self) {
        let notifications = self.store.take_notifications();
        if notifications.is_empty() {
            return;
        }
        let text = notifications
            .iter()
            .map(|n| format!("{}: {}", n.title, n.message))
            .collect::<Vec<_>>()
            .join(" | ");
        self.show_message(&text, false);
    }

    fn show_error(&mut self, error: &ApiError) {
        self.show_message(&error.to_string(), true);
    }

    pub fn show_message(&mut self, text: &str, is_error: bool) {
        self.status = Some(StatusLine { text: text.to_string(), is_error });
    }
}

fn column_index(status: TaskStatus) -> usize {
    TaskStatus::ALL.iter().position(|s| *s == status).unwrap_or(0)
}

fn clamp(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if let Some(i) = state.selected() {
        if i >= len {
            state.select(Some(len - 1));
        }
    } else {
        state.select(Some(0));
    }
}
