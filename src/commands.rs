use chrono::{Duration, Local, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::config::{config_path, load_config, save_config};
use crate::kanban::{submit_completion, CompletionForm, PendingCompletion};
use crate::models::{
    AccomplishmentPatch, AttachmentKind, DashboardStats, NewAccomplishment, NewAttachment, NewProject, NewTask,
    TaskPatch, TaskPriority, TaskStatus,
};
use crate::stats::{compute_stats, format_minutes};
use crate::store::{BoardStore, MoveOutcome, UpdateOutcome};

/// Parses a day given on the command line.
///
/// Accepts `YYYY-MM-DD`, `today`, `yesterday` and `tomorrow`; no input means today.
pub fn parse_day(input: Option<&str>) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    match input.map(str::trim) {
        None | Some("") | Some("today") => Ok(today),
        Some("yesterday") => Ok(today - Duration::days(1)),
        Some("tomorrow") => Ok(today + Duration::days(1)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e)),
    }
}

/// Parses `KIND:TITLE[:URL]`, e.g. `pr:Fix login:https://example.com/pr/1`.
pub fn parse_attachment(spec: &str) -> Result<NewAttachment, String> {
    let mut parts = spec.splitn(3, ':');
    let kind: AttachmentKind = parts.next().unwrap_or_default().parse()?;
    let title = parts.next().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(format!("Attachment '{}' needs a title (KIND:TITLE[:URL]).", spec));
    }
    let url = parts.next().map(str::trim).filter(|u| !u.is_empty()).map(str::to_string);
    Ok(NewAttachment { kind, title: title.to_string(), url })
}

fn print_notifications(store: &mut BoardStore, silent: bool) {
    for n in store.take_notifications() {
        if !silent { println!("{}: {}", n.title, n.message); }
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Planned => Color::Blue,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Discarded => Color::Grey,
    }
}

/// Creates a task on the given day.
///
/// New tasks start in `planned` or `in_progress`; the estimate falls back to
/// `default_estimate` minutes.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_add(
    store: &mut BoardStore,
    title: String,
    project: String,
    estimate: Option<u32>,
    date: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    description: Option<String>,
    notes: Option<String>,
    default_estimate: u32,
    silent: bool,
) {
    if title.trim().is_empty() {
        if !silent { eprintln!("Task title must not be empty."); }
        return;
    }
    let date = match parse_day(date.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let priority = match priority.as_deref().map(str::parse::<TaskPriority>).transpose() {
        Ok(p) => p.unwrap_or_default(),
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let status = match status.as_deref().map(str::parse::<TaskStatus>).transpose() {
        Ok(Some(s @ (TaskStatus::Planned | TaskStatus::InProgress))) => s,
        Ok(None) => TaskStatus::Planned,
        Ok(Some(s)) => {
            if !silent { eprintln!("New tasks start as planned or in_progress, not {}.", s); }
            return;
        }
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };

    let input = NewTask {
        title: title.trim().to_string(),
        description: description.unwrap_or_default(),
        status,
        priority,
        estimated_minutes: estimate.unwrap_or(default_estimate),
        notes: notes.filter(|n| !n.trim().is_empty()),
        date,
        project_id: Some(project),
    };
    match store.add_task(input).await {
        Ok(task) => {
            print_notifications(store, silent);
            if !silent { println!("Task added (id = {})", task.id); }
        }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

/// Lists the tasks of a day (or all tasks) in board order.
pub async fn cmd_list(store: &mut BoardStore, date: Option<String>, all: bool) {
    let result = if all {
        store.load_all_tasks().await
    } else {
        match parse_day(date.as_deref()) {
            Ok(d) => store.set_selected_date(d).await,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        }
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        return;
    }

    let mut tasks: Vec<_> = store.tasks().to_vec();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    let column = |s: TaskStatus| TaskStatus::ALL.iter().position(|c| *c == s).unwrap_or(0);
    tasks.sort_by(|a, b| {
        column(a.status)
            .cmp(&column(b.status))
            .then(b.priority.cmp(&a.priority))
            .then(a.date.cmp(&b.date))
    });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Est").add_attribute(Attribute::Bold),
            Cell::new("Actual").add_attribute(Attribute::Bold),
        ]);

    for t in &tasks {
        let priority_color = match t.priority {
            TaskPriority::High => Color::Red,
            TaskPriority::Medium => Color::Yellow,
            TaskPriority::Low => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.title),
            Cell::new(t.project_id.clone().unwrap_or_default()),
            Cell::new(t.date),
            Cell::new(t.status.label()).fg(status_color(t.status)),
            Cell::new(t.priority).fg(priority_color),
            Cell::new(format_minutes(u64::from(t.estimated_minutes))),
            Cell::new(t.actual_minutes.map(|m| format_minutes(u64::from(m))).unwrap_or_else(|| "-".into())),
        ]);
    }

    println!("{table}");
    let stats = compute_stats(&tasks);
    println!(
        "{} tasks, {:.0}% completed, {} estimated, {} spent",
        stats.total_tasks(),
        stats.completion_rate,
        format_minutes(stats.total_estimated_minutes),
        format_minutes(stats.total_actual_minutes),
    );
}

/// Edits a task's details.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_edit(
    store: &mut BoardStore,
    id: String,
    title: Option<String>,
    description: Option<String>,
    estimate: Option<u32>,
    priority: Option<String>,
    notes: Option<String>,
    silent: bool,
) {
    let priority = match priority.as_deref().map(str::parse::<TaskPriority>).transpose() {
        Ok(p) => p,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    if title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        if !silent { eprintln!("Task title must not be empty."); }
        return;
    }
    let patch = TaskPatch {
        title: title.map(|t| t.trim().to_string()),
        description,
        priority,
        estimated_minutes: estimate,
        notes,
        ..Default::default()
    };
    if patch.is_empty() {
        if !silent { eprintln!("Nothing to change."); }
        return;
    }
    if let Err(e) = store.ensure_task(&id).await {
        if !silent { eprintln!("{}", e); }
        return;
    }
    match store.update_task(&id, patch).await {
        Ok(UpdateOutcome::Updated(_)) => { if !silent { println!("Task {} updated.", id); } }
        Ok(UpdateOutcome::NeedsCompletion) => {
            if !silent { eprintln!("Use `focusboard complete {}` to complete a task.", id); }
        }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

/// Moves a task to another column. Completing goes through [`cmd_complete`].
pub async fn cmd_move(store: &mut BoardStore, id: String, status: String, silent: bool) {
    let status = match status.parse::<TaskStatus>() {
        Ok(s) => s,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    if let Err(e) = store.ensure_task(&id).await {
        if !silent { eprintln!("{}", e); }
        return;
    }
    match store.move_task(&id, status).await {
        Ok(MoveOutcome::Moved(_)) => print_notifications(store, silent),
        Ok(MoveOutcome::NeedsCompletion(_)) => {
            if !silent {
                eprintln!("Completing a task needs completion details. Use `focusboard complete {}`.", id);
            }
        }
        Ok(MoveOutcome::NotFound) => { if !silent { eprintln!("Task {} not found.", id); } }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

/// Completes a task with the time it took, challenges, comments and proofs.
///
/// Without `time` the task's estimate is used.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_complete(
    store: &mut BoardStore,
    id: String,
    time: Option<u32>,
    challenges: Option<String>,
    comments: Option<String>,
    attach: Vec<String>,
    silent: bool,
) {
    let task = match store.ensure_task(&id).await {
        Ok(t) => t,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    if task.status == TaskStatus::Completed {
        if !silent { eprintln!("Task {} is already completed.", id); }
        return;
    }

    let pending = PendingCompletion::from(&task);
    let mut form: CompletionForm = pending.form();
    if let Some(t) = time { form.time_taken = t; }
    form.challenges = challenges.unwrap_or_default();
    form.comments = comments.unwrap_or_default();
    for spec in &attach {
        match parse_attachment(spec) {
            Ok(a) => { form.add_attachment(a.kind, &a.title, a.url.as_deref()); }
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return;
            }
        }
    }

    match submit_completion(store, &pending, form.submit()).await {
        Ok(Some(_)) => print_notifications(store, silent),
        Ok(None) => { if !silent { eprintln!("Task {} not found.", id); } }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

/// Deletes a task. This cannot be undone.
pub async fn cmd_delete(store: &mut BoardStore, id: String, silent: bool) {
    if let Err(e) = store.ensure_task(&id).await {
        if !silent { eprintln!("Task {} not found: {}", id, e); }
        return;
    }
    match store.delete_task(&id).await {
        Ok(true) => print_notifications(store, silent),
        Ok(false) => { if !silent { eprintln!("Task {} not found.", id); } }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

fn stats_table(stats: &DashboardStats) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Planned"), Cell::new(stats.planned_tasks).fg(status_color(TaskStatus::Planned))]);
    table.add_row(vec![Cell::new("In Progress"), Cell::new(stats.in_progress_tasks).fg(status_color(TaskStatus::InProgress))]);
    table.add_row(vec![Cell::new("Completed"), Cell::new(stats.completed_tasks).fg(status_color(TaskStatus::Completed))]);
    table.add_row(vec![Cell::new("Discarded"), Cell::new(stats.discarded_tasks).fg(status_color(TaskStatus::Discarded))]);
    table.add_row(vec!["Estimated".to_string(), format_minutes(stats.total_estimated_minutes)]);
    table.add_row(vec!["Actual".to_string(), format_minutes(stats.total_actual_minutes)]);
    table.add_row(vec!["Completion".to_string(), format!("{:.1}%", stats.completion_rate)]);
    table
}

/// Shows dashboard statistics, from the server or derived from the day's tasks.
pub async fn cmd_stats(store: &mut BoardStore, date: Option<String>, local: bool) {
    let date = match parse_day(date.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let stats = if local {
        if let Err(e) = store.set_selected_date(date).await {
            eprintln!("{}", e);
            return;
        }
        store.local_stats()
    } else {
        match store.fetch_stats(date).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        }
    };
    println!("Stats for {}", date);
    println!("{}", stats_table(&stats));
}

/// Shows planned vs. completed counts for the week around a date.
pub async fn cmd_weekly(store: &mut BoardStore, date: Option<String>) {
    let date = match parse_day(date.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let week = match store.weekly_stats(date).await {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    if week.is_empty() {
        println!("No weekly stats found.");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Day", "Planned", "Completed"]);
    for day in week {
        table.add_row(vec![
            Cell::new(day.day),
            Cell::new(day.planned),
            Cell::new(day.completed).fg(Color::Green),
        ]);
    }
    println!("{table}");
}

/// Shows the per-project highlights for a date range.
pub async fn cmd_summary(store: &mut BoardStore, from: String, to: String) {
    let (start, end) = match (parse_day(Some(from.as_str())), parse_day(Some(to.as_str()))) {
        (Ok(s), Ok(e)) => (s, e),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{}", e);
            return;
        }
    };
    if start > end {
        eprintln!("Start date {} is after end date {}.", start, end);
        return;
    }
    let summary = match store.summary(start, end).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    if summary.is_empty() {
        println!("No highlights between {} and {}.", start, end);
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Project", "Delivery Details", "Accomplishments", "Approach"]);
    for project in summary {
        if project.rows.is_empty() {
            table.add_row(vec![project.project_name.clone(), "-".into(), "-".into(), "-".into()]);
        }
        for row in project.rows {
            table.add_row(vec![project.project_name.clone(), row.delivery_details, row.accomplishments, row.approach]);
        }
    }
    println!("{table}");
}

pub async fn cmd_project_add(store: &mut BoardStore, name: String, description: Option<String>, silent: bool) {
    if name.trim().is_empty() {
        if !silent { eprintln!("Project name must not be empty."); }
        return;
    }
    let input = NewProject {
        name: name.trim().to_string(),
        description: description.filter(|d| !d.trim().is_empty()),
    };
    match store.add_project(input).await {
        Ok(p) => {
            print_notifications(store, silent);
            if !silent { println!("Project added (id = {})", p.id); }
        }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

pub async fn cmd_project_list(store: &mut BoardStore) {
    if let Err(e) = store.load_projects().await {
        eprintln!("{}", e);
        return;
    }
    if store.projects().is_empty() {
        println!("No projects found.");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Name", "Description"]);
    for p in store.projects() {
        table.add_row(vec![p.id.clone(), p.name.clone(), p.description.clone().unwrap_or_else(|| "-".into())]);
    }
    println!("{table}");
}

/// Logs an accomplishment by hand, optionally linked to a task.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_accomplishment_add(
    store: &mut BoardStore,
    title: String,
    task: Option<String>,
    description: Option<String>,
    time: Option<u32>,
    challenges: Option<String>,
    comments: Option<String>,
    attach: Vec<String>,
    silent: bool,
) {
    if title.trim().is_empty() {
        if !silent { eprintln!("Accomplishment title must not be empty."); }
        return;
    }
    let attachments = match attach.iter().map(|a| parse_attachment(a)).collect::<Result<Vec<_>, _>>() {
        Ok(a) => a,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let input = NewAccomplishment {
        task_id: task,
        title: title.trim().to_string(),
        description: description.unwrap_or_default(),
        time_taken: time,
        challenges: challenges.filter(|c| !c.trim().is_empty()),
        comments: comments.filter(|c| !c.trim().is_empty()),
        attachments,
    };
    match store.add_accomplishment(input).await {
        Ok(a) => {
            print_notifications(store, silent);
            if !silent { println!("Accomplishment added (id = {})", a.id); }
        }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

pub async fn cmd_accomplishment_list(store: &mut BoardStore, task: Option<String>) {
    let result = match &task {
        Some(id) => store.load_accomplishments_for_task(id).await.map(|_| ()),
        None => store.load_accomplishments().await,
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        return;
    }
    let items: Vec<_> = store
        .accomplishments()
        .iter()
        .filter(|a| task.is_none() || a.task_id == task)
        .collect();
    if items.is_empty() {
        println!("No accomplishments found.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Title", "Task", "Time", "Challenges", "Comments", "Proofs"]);
    for a in items {
        let proofs: Vec<String> = a.attachments.iter().map(|p| format!("[{}] {}", p.kind, p.title)).collect();
        table.add_row(vec![
            a.id.clone(),
            a.title.clone(),
            a.task_id.clone().unwrap_or_else(|| "-".into()),
            a.time_taken.map(|m| format_minutes(u64::from(m))).unwrap_or_else(|| "-".into()),
            a.challenges.clone().unwrap_or_default(),
            a.comments.clone().unwrap_or_default(),
            proofs.join("\n"),
        ]);
    }
    println!("{table}");
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_accomplishment_edit(
    store: &mut BoardStore,
    id: String,
    title: Option<String>,
    description: Option<String>,
    time: Option<u32>,
    challenges: Option<String>,
    comments: Option<String>,
    silent: bool,
) {
    let patch = AccomplishmentPatch {
        title: title.filter(|t| !t.trim().is_empty()),
        description,
        time_taken: time,
        challenges,
        comments,
        attachments: None,
    };
    if patch == AccomplishmentPatch::default() {
        if !silent { eprintln!("Nothing to change."); }
        return;
    }
    if let Err(e) = store.load_accomplishments().await {
        if !silent { eprintln!("{}", e); }
        return;
    }
    match store.update_accomplishment(&id, patch).await {
        Ok(Some(_)) => { if !silent { println!("Accomplishment {} updated.", id); } }
        Ok(None) => { if !silent { eprintln!("Accomplishment {} not found.", id); } }
        Err(e) => { if !silent { eprintln!("{}", e); } }
    }
}

/// Deletes one accomplishment, or every accomplishment of a task.
pub async fn cmd_accomplishment_delete(store: &mut BoardStore, id: Option<String>, task: Option<String>, silent: bool) {
    match (id, task) {
        (_, Some(task_id)) => match store.delete_accomplishments_for_task(&task_id).await {
            Ok(_) => { if !silent { println!("Accomplishments of task {} removed.", task_id); } }
            Err(e) => { if !silent { eprintln!("{}", e); } }
        },
        (Some(id), None) => {
            if let Err(e) = store.load_accomplishments().await {
                if !silent { eprintln!("{}", e); }
                return;
            }
            match store.delete_accomplishment(&id).await {
                Ok(true) => { if !silent { println!("Accomplishment {} removed.", id); } }
                Ok(false) => { if !silent { eprintln!("Accomplishment {} not found.", id); } }
                Err(e) => { if !silent { eprintln!("{}", e); } }
            }
        }
        (None, None) => { if !silent { eprintln!("Give an accomplishment id or --task."); } }
    }
}

pub fn cmd_config_show() {
    match load_config() {
        Ok(c) => {
            println!("Config file: {}", config_path().display());
            println!("API URL: {}", c.api_base_url);
            println!(
                "Request timeout: {}",
                c.request_timeout_secs.map(|s| format!("{}s", s)).unwrap_or_else(|| "none".into())
            );
            println!("Default estimate: {}", format_minutes(u64::from(c.default_estimate_minutes)));
        }
        Err(e) => eprintln!("{}", e),
    }
}

pub fn cmd_config_set_url(url: String) {
    if reqwest::Url::parse(url.trim()).is_err() {
        eprintln!("Invalid URL '{}'.", url);
        return;
    }
    let mut config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    config.api_base_url = url.trim().to_string();
    if let Err(e) = save_config(&config) {
        eprintln!("{}", e);
    } else {
        println!("API URL set to {}", config.api_base_url);
    }
}
