use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Database;
use crate::ui::app::{App, ConfigRow, ImportStep, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

// Rows taken by the step indicator, path box and list borders above the file list
const BROWSER_CHROME: usize = 6;
// Table border plus header row
const TABLE_CHROME: usize = 3;

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let mut app = App::new();
    app.refresh_all(db)?;
    app.refresh_file_browser();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("TUI exited with error: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            let handled = match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db),
                InputMode::Command => handle_command_input(key, app, db),
                InputMode::Filter => handle_filter_input(key, app),
                InputMode::Confirm => handle_confirm_input(key, app, db),
            };
            // A failed action shouldn't take the whole session down
            if let Err(e) = handled {
                log::error!("{e:#}");
                app.input_mode = InputMode::Normal;
                app.set_status(format!("Error: {e:#}"));
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') if in_step(app, ImportStep::SelectFile) => {
            app.input_mode = InputMode::Filter;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('J') if in_step(app, ImportStep::Configure) => {
            let total = app.import_preview.transactions.len() + app.import_preview.transfers.len();
            if app.preview_scroll + 1 < total {
                app.preview_scroll += 1;
            }
        }
        KeyCode::Char('K') if in_step(app, ImportStep::Configure) => {
            app.preview_scroll = app.preview_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Import)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Review)?,
        KeyCode::Tab | KeyCode::BackTab => {
            let next = match app.screen {
                Screen::Import => Screen::Review,
                Screen::Review => Screen::Import,
            };
            switch_screen(app, db, next)?;
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') | KeyCode::Right
            if in_step(app, ImportStep::Configure) =>
        {
            app.adjust_config(1);
        }
        KeyCode::Char('-') | KeyCode::Char('h') | KeyCode::Left
            if in_step(app, ImportStep::Configure) =>
        {
            app.adjust_config(-1);
        }
        KeyCode::Char('.') if in_step(app, ImportStep::SelectFile) => {
            app.file_browser_show_hidden = !app.file_browser_show_hidden;
            app.refresh_file_browser();
        }
        KeyCode::Backspace if in_step(app, ImportStep::SelectFile) => browse_up(app),
        KeyCode::Char('n') if in_step(app, ImportStep::Report) => app.reset_import(),
        KeyCode::Char('a') if app.screen == Screen::Review => app.cycle_review_account(db)?,
        KeyCode::Enter => handle_enter(app, db)?,
        KeyCode::Esc => handle_escape(app),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_filter_input(key: KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Char(c) => {
            app.file_browser_filter.push(c);
            app.file_browser_index = 0;
            app.file_browser_scroll = 0;
        }
        KeyCode::Backspace => {
            app.file_browser_filter.pop();
            app.file_browser_index = 0;
            app.file_browser_scroll = 0;
        }
        KeyCode::Esc => {
            app.file_browser_filter.clear();
            app.file_browser_index = 0;
            app.file_browser_scroll = 0;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            // A filter that narrows to one entry (besides `..`) opens it directly
            let filtered = app.file_browser_filtered();
            if let [_, only] = filtered.as_slice() {
                app.file_browser_index = 1;
                if let Some(path) = app.file_browser_entries.get(*only).cloned() {
                    open_browser_entry(app, path);
                }
            }
        }
        KeyCode::Down => {
            app.input_mode = InputMode::Normal;
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            match app.pending_action.take() {
                Some(PendingAction::ExecuteImport) => {
                    app.execute_import(db)?;
                }
                Some(PendingAction::DeleteProfile { name }) => {
                    if db.delete_profile(&name)? {
                        app.refresh_reference_data(db)?;
                        app.set_status(format!("Deleted profile '{name}'"));
                    } else {
                        app.set_status(format!("Profile '{name}' not found"));
                    }
                }
                None => {}
            }
        }
        _ => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn in_step(app: &App, step: ImportStep) -> bool {
    app.screen == Screen::Import && app.import_step == step
}

fn browser_page(app: &App) -> usize {
    app.visible_rows.saturating_sub(BROWSER_CHROME).max(1)
}

fn review_page(app: &App) -> usize {
    app.visible_rows.saturating_sub(TABLE_CHROME).max(1)
}

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    if screen == Screen::Review {
        app.refresh_review(db)?;
    }
    app.set_status(screen.to_string());
    Ok(())
}

fn handle_move_down(app: &mut App) {
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                let len = app.file_browser_filtered().len();
                let page = browser_page(app);
                scroll_down(
                    &mut app.file_browser_index,
                    &mut app.file_browser_scroll,
                    len,
                    page,
                );
            }
            ImportStep::Configure => {
                if app.config_index + 1 < ConfigRow::all().len() {
                    app.config_index += 1;
                }
            }
            ImportStep::Report => {}
        },
        Screen::Review => {
            let page = review_page(app);
            scroll_down(
                &mut app.review_index,
                &mut app.review_scroll,
                app.review_transactions.len(),
                page,
            );
        }
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                scroll_up(&mut app.file_browser_index, &mut app.file_browser_scroll)
            }
            ImportStep::Configure => app.config_index = app.config_index.saturating_sub(1),
            ImportStep::Report => {}
        },
        Screen::Review => scroll_up(&mut app.review_index, &mut app.review_scroll),
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                scroll_to_top(&mut app.file_browser_index, &mut app.file_browser_scroll)
            }
            ImportStep::Configure => app.config_index = 0,
            ImportStep::Report => {}
        },
        Screen::Review => scroll_to_top(&mut app.review_index, &mut app.review_scroll),
    }
}

fn handle_goto_bottom(app: &mut App) {
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                let len = app.file_browser_filtered().len();
                let page = browser_page(app);
                scroll_to_bottom(
                    &mut app.file_browser_index,
                    &mut app.file_browser_scroll,
                    len,
                    page,
                );
            }
            ImportStep::Configure => {
                app.config_index = ConfigRow::all().len().saturating_sub(1);
            }
            ImportStep::Report => {}
        },
        Screen::Review => {
            let page = review_page(app);
            scroll_to_bottom(
                &mut app.review_index,
                &mut app.review_scroll,
                app.review_transactions.len(),
                page,
            );
        }
    }
}

fn browse_up(app: &mut App) {
    if let Some(parent) = app.file_browser_path.parent().map(|p| p.to_path_buf()) {
        app.file_browser_path = parent;
        app.refresh_file_browser();
    }
}

fn open_browser_entry(app: &mut App, path: std::path::PathBuf) {
    if path.is_dir() {
        app.file_browser_path = path;
        app.refresh_file_browser();
    } else if let Err(e) = app.load_import_file(&path) {
        app.set_status(format!("Error loading file: {e:#}"));
    }
}

fn handle_enter(app: &mut App, db: &mut Database) -> Result<()> {
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                if let Some(path) = app.selected_browser_entry() {
                    open_browser_entry(app, path);
                }
            }
            ImportStep::Configure => {
                let preview = &app.import_preview;
                if preview.transactions.is_empty() && preview.transfers.is_empty() {
                    app.set_status("Nothing to import with these settings");
                    return Ok(());
                }
                app.confirm_message = format!(
                    "Import {} transactions and {} transfers?",
                    preview.transactions.len(),
                    preview.transfers.len()
                );
                app.pending_action = Some(PendingAction::ExecuteImport);
                app.input_mode = InputMode::Confirm;
            }
            ImportStep::Report => switch_screen(app, db, Screen::Review)?,
        },
        Screen::Review => {}
    }
    Ok(())
}

fn handle_escape(app: &mut App) {
    app.status_message.clear();
    match app.screen {
        Screen::Import => match app.import_step {
            ImportStep::SelectFile => {
                if !app.file_browser_filter.is_empty() {
                    app.file_browser_filter.clear();
                    app.file_browser_index = 0;
                    app.file_browser_scroll = 0;
                }
            }
            ImportStep::Configure => {
                app.import_step = ImportStep::SelectFile;
                app.set_status("Import cancelled");
            }
            ImportStep::Report => app.reset_import(),
        },
        Screen::Review => {
            app.screen = Screen::Import;
        }
    }
}
