//! Terminal setup and the main event loop for the TUI.

use std::io;
use std::path::Path;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use super::app::{App, Mode};
use super::ui::draw;

/// Launch the TUI against the given database file.
pub fn run_tui(db_path: &Path) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db_path.to_path_buf());
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.mode {
                Mode::Normal => {
                    // Status messages are one-shot.
                    app.message = None;
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        KeyCode::Left | KeyCode::Char('h') => app.prev_page(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_page(),
                        KeyCode::Tab => app.cycle_filter(),
                        KeyCode::Char(' ') | KeyCode::Char('c') => app.toggle_selected(),
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                        KeyCode::Char('a') => app.start_add(),
                        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
                        _ => {}
                    }
                }
                Mode::Adding | Mode::Editing => {
                    if app.picker_open {
                        match key.code {
                            KeyCode::Down | KeyCode::Char('j') => app.picker_next(),
                            KeyCode::Up | KeyCode::Char('k') => app.picker_previous(),
                            KeyCode::Char(' ') => app.picker_toggle(),
                            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => app.close_picker(),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Enter => app.commit_input(),
                            KeyCode::Esc => app.cancel_input(),
                            KeyCode::Tab => app.open_picker(),
                            KeyCode::Char(c) => app.input.handle_char(c),
                            KeyCode::Backspace => app.input.handle_backspace(),
                            KeyCode::Delete => app.input.handle_delete(),
                            KeyCode::Left => app.input.move_cursor_left(),
                            KeyCode::Right => app.input.move_cursor_right(),
                            _ => {}
                        }
                    }
                }
            }
        }
    }
}
