use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use chrono::{Local, Utc};
use crate::models::{DashboardStats, TaskPriority, TaskStatus};
use crate::stats::format_minutes;
use crate::timeline::{day_label, group_by_day};
use super::app::{App, InputMode, ViewMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // View
            Constraint::Length(1), // Status
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Board => render_board(f, app, chunks[0]),
        ViewMode::Dashboard => render_dashboard(f, app, chunks[0]),
        ViewMode::Timeline => render_timeline(f, app, chunks[0]),
        ViewMode::Accomplishments => render_accomplishments(f, app, chunks[0]),
    }

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        f.render_widget(Paragraph::new(status.text.as_str()).style(Style::default().fg(color)), chunks[1]);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Board => "q: Quit | h/l: Column | j/k: Task | H/L: Drag | 1-4: Drop | a: Add | e: Title | d: Del | [/]: Day | v: View",
            ViewMode::Dashboard => "q: Quit | [/]: Day | r: Reload | v: View",
            ViewMode::Timeline => "q: Quit | j/k: Scroll | f: Filter | /: Search | v: View",
            ViewMode::Accomplishments => "q: Quit | j/k: Scroll | r: Reload | v: View",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
        InputMode::Completing => "Enter: Next | empty Enter on attachments: Complete | Backspace on empty: drop attachment | Esc: Cancel",
        InputMode::Searching => "Type to search | Enter/Esc: Done",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    match app.input_mode {
        InputMode::Completing => render_completion(f, app),
        InputMode::Editing | InputMode::Adding | InputMode::Searching => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);

            let title = match app.input_mode {
                InputMode::Adding => match app.add_state.step {
                    0 => "Add Task: Enter Title",
                    1 => "Add Task: Enter Project (id or name)",
                    2 => "Add Task: Enter Estimate (minutes)",
                    3 => "Add Task: Starting Column (planned / in_progress)",
                    _ => "Add Task",
                },
                InputMode::Editing => "Edit Title",
                _ => "Search Timeline",
            };

            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(title));

            f.render_widget(input, area);
        }
        InputMode::Normal => {}
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Planned => Color::Blue,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Discarded => Color::DarkGray,
    }
}

fn render_board(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4].as_ref())
        .split(area);
    let date = app.store.selected_date();

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let rows: Vec<Row> = app
            .column_tasks(i)
            .iter()
            .map(|t| {
                let style = match t.priority {
                    TaskPriority::High => Style::default().fg(Color::Red),
                    TaskPriority::Medium => Style::default(),
                    TaskPriority::Low => Style::default().fg(Color::Gray),
                };
                let time = match t.actual_minutes {
                    Some(actual) => format!("{}/{}", format_minutes(u64::from(actual)), format_minutes(u64::from(t.estimated_minutes))),
                    None => format_minutes(u64::from(t.estimated_minutes)),
                };
                Row::new(vec![Cell::from(t.title.clone()), Cell::from(time)]).style(style)
            })
            .collect();
        let count = rows.len();

        let focused = i == app.column;
        let border = if focused {
            Style::default().fg(status_color(*status)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(status_color(*status))
        };
        let title = if i == 0 {
            format!("{} ({}) - {}", status.label(), count, date)
        } else {
            format!("{} ({})", status.label(), count)
        };
        let highlight = if focused {
            Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(9)])
            .block(Block::default().borders(Borders::ALL).border_style(border).title(title))
            .row_highlight_style(highlight)
            .highlight_symbol(if focused { ">> " } else { "   " });

        f.render_stateful_widget(table, columns[i], &mut app.column_states[i]);
    }
}

fn stats_rows(stats: &DashboardStats) -> Vec<Row<'static>> {
    vec![
        Row::new(vec![Cell::from("Planned"), Cell::from(stats.planned_tasks.to_string())]),
        Row::new(vec![Cell::from("In Progress"), Cell::from(stats.in_progress_tasks.to_string())]),
        Row::new(vec![Cell::from("Completed"), Cell::from(stats.completed_tasks.to_string())]),
        Row::new(vec![Cell::from("Discarded"), Cell::from(stats.discarded_tasks.to_string())]),
        Row::new(vec![Cell::from("Estimated"), Cell::from(format_minutes(stats.total_estimated_minutes))]),
        Row::new(vec![Cell::from("Actual"), Cell::from(format_minutes(stats.total_actual_minutes))]),
        Row::new(vec![Cell::from("Completion"), Cell::from(format!("{:.1}%", stats.completion_rate))]),
    ]
}

fn render_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)].as_ref())
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(halves[0]);
    let widths = [Constraint::Length(14), Constraint::Min(8)];
    let header = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let date = app.store.selected_date();

    let local = Table::new(stats_rows(&app.store.local_stats()), widths)
        .header(Row::new(vec!["Metric", "Value"]).style(header).bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(format!("On the board - {}", date)));
    f.render_widget(local, top[0]);

    match app.store.stats_snapshot() {
        Some(stats) => {
            let server = Table::new(stats_rows(stats), widths)
                .header(Row::new(vec!["Metric", "Value"]).style(header).bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Server"));
            f.render_widget(server, top[1]);
        }
        None => {
            let empty = Paragraph::new("No stats loaded.")
                .block(Block::default().borders(Borders::ALL).title("Server"));
            f.render_widget(empty, top[1]);
        }
    }

    let rows: Vec<Row> = app
        .weekly
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.day.clone()),
                Cell::from(d.planned.to_string()),
                Cell::from(d.completed.to_string()).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    let weekly = Table::new(rows, [Constraint::Length(12), Constraint::Length(10), Constraint::Length(10)])
        .header(Row::new(vec!["Day", "Planned", "Completed"]).style(header).bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("This Week"));
    f.render_widget(weekly, halves[1]);
}

fn render_timeline(f: &mut Frame, app: &mut App, area: Rect) {
    let today = Local::now().date_naive();
    let entries = app.store.timeline().filter(app.timeline_filter, &app.timeline_search);
    let mut rows: Vec<Row> = Vec::new();
    // Headings are not selectable, so the selection index maps to entries.
    let selected = app.timeline_state.selected();
    let mut index = 0;
    for (day, group) in group_by_day(&entries) {
        rows.push(
            Row::new(vec![Cell::from(day_label(day, today)), Cell::from(""), Cell::from("")])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
        for entry in group {
            let style = if Some(index) == selected {
                Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let ago = (Utc::now() - entry.timestamp).num_minutes();
            let when = if ago < 1 {
                "just now".to_string()
            } else if ago < 60 {
                format!("{}m ago", ago)
            } else {
                entry.timestamp.with_timezone(&Local).format("%H:%M").to_string()
            };
            rows.push(
                Row::new(vec![
                    Cell::from(format!("  {}", when)),
                    Cell::from(entry.action.label()),
                    Cell::from(entry.description.clone().unwrap_or_default()),
                ])
                .style(style),
            );
            index += 1;
        }
    }

    let title = if app.timeline_search.is_empty() {
        format!("Timeline - {} ({})", app.timeline_filter.label(), index)
    } else {
        format!("Timeline - {} matching \"{}\" ({})", app.timeline_filter.label(), app.timeline_search, index)
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    if index == 0 {
        f.render_widget(Paragraph::new("No activity yet.").block(block), area);
        return;
    }
    let table = Table::new(rows, [Constraint::Length(18), Constraint::Length(24), Constraint::Min(20)]).block(block);
    f.render_widget(table, area);
}

fn render_accomplishments(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .store
        .accomplishments()
        .iter()
        .map(|a| {
            let proofs: Vec<String> = a.attachments.iter().map(|p| format!("[{}] {}", p.kind, p.title)).collect();
            Row::new(vec![
                Cell::from(a.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string()),
                Cell::from(a.title.clone()),
                Cell::from(a.time_taken.map(|m| format_minutes(u64::from(m))).unwrap_or_else(|| "-".into())),
                Cell::from(a.challenges.clone().unwrap_or_default()),
                Cell::from(proofs.join(", ")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(24),
        Constraint::Length(30),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Date", "Title", "Time", "Challenges", "Proofs"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Accomplishments"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.accomplishment_state);
}

fn render_completion(f: &mut Frame, app: &App) {
    let Some(state) = &app.completion else { return; };
    let area = centered_rect(70, 14, f.area());
    f.render_widget(Clear, area);

    let prompt = match state.step {
        0 => "Time taken (minutes)",
        1 => "Challenges faced",
        2 => "Comments",
        _ => "Attachment KIND:TITLE[:URL] (empty to finish)",
    };
    let label = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(vec![Span::styled("Time: ", label), Span::raw(format_minutes(u64::from(state.form.time_taken)))]),
        Line::from(vec![Span::styled("Challenges: ", label), Span::raw(state.form.challenges.clone())]),
        Line::from(vec![Span::styled("Comments: ", label), Span::raw(state.form.comments.clone())]),
        Line::from(Span::styled("Attachments:", label)),
    ];
    for a in state.form.attachments() {
        let url = a.url.as_deref().map(|u| format!(" <{}>", u)).unwrap_or_default();
        lines.push(Line::from(format!("  [{}] {}{}", a.kind, a.title, url)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("{}: ", prompt), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(app.input_buffer.clone(), Style::default().fg(Color::Yellow)),
    ]));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Complete \"{}\"", state.pending.title)),
    );
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
