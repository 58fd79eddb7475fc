pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputMode, ViewMode};
use ui::ui;

use crate::kanban::Direction;
use crate::models::TaskStatus;
use crate::store::BoardStore;

pub async fn run_tui(store: &mut BoardStore, default_estimate: u32) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(store, default_estimate);
    app.reload().await;

    // Run loop
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<'_>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue; };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('v') => app.cycle_view(),
                KeyCode::Char('[') => app.shift_day(-1).await,
                KeyCode::Char(']') => app.shift_day(1).await,
                KeyCode::Char('r') => app.reload().await,
                _ => match app.view_mode {
                    ViewMode::Board => match key.code {
                        KeyCode::Left | KeyCode::Char('h') => app.focus_column(Direction::Left),
                        KeyCode::Right | KeyCode::Char('l') => app.focus_column(Direction::Right),
                        KeyCode::Char('H') => app.drag_selected(Direction::Left).await,
                        KeyCode::Char('L') => app.drag_selected(Direction::Right).await,
                        KeyCode::Char(c @ '1'..='4') => {
                            let column = c as usize - '1' as usize;
                            app.drop_selected(TaskStatus::ALL[column]).await
                        }
                        KeyCode::Char('a') => app.start_add(),
                        KeyCode::Char('e') => app.start_edit_title(),
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected().await,
                        _ => {}
                    },
                    ViewMode::Timeline => match key.code {
                        KeyCode::Char('f') => app.cycle_filter(),
                        KeyCode::Char('/') => app.start_search(),
                        _ => {}
                    },
                    ViewMode::Dashboard | ViewMode::Accomplishments => {}
                },
            },
            InputMode::Editing | InputMode::Adding | InputMode::Completing | InputMode::Searching => match key.code {
                KeyCode::Enter => app.handle_input().await,
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => {
                    app.input_buffer.push(c);
                    if app.input_mode == InputMode::Searching { app.update_search(); }
                }
                KeyCode::Backspace => {
                    if app.input_buffer.pop().is_none() && app.input_mode == InputMode::Completing {
                        app.remove_last_attachment();
                    }
                    if app.input_mode == InputMode::Searching { app.update_search(); }
                }
                _ => {}
            }
        }
    }
}
