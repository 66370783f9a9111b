//! Rendering for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::fields::StatusFilter;
use crate::store::{format_refs, format_state};

use super::app::{App, Mode};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // filter tabs + count
            Constraint::Min(0),    // table
            Constraint::Length(1), // pagination
            Constraint::Length(3), // help / status
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_pagination(f, app, chunks[2]);
    draw_help(f, app, chunks[3]);

    if app.mode != Mode::Normal {
        draw_input(f, app);
        if app.picker_open {
            draw_picker(f, app);
        }
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tabs = [StatusFilter::All, StatusFilter::Active, StatusFilter::Completed]
        .iter()
        .map(|s| {
            if *s == app.filter {
                format!("[{}]", s.label())
            } else {
                format!(" {} ", s.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let line = format!("{}   {} todo(s)", tabs, app.filtered().len());
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::Cyan)),
        area,
    );
}

fn draw_table(f: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.visible();
    let rows: Vec<Row> = visible
        .iter()
        .filter_map(|id| app.store.get(*id))
        .map(|t| {
            let style = if t.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if !app.store.unmet_references(t).is_empty() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(format_state(t.completed)),
                Cell::from(format_refs(&t.references)),
                Cell::from(t.text.clone()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "State", "Refs", "Text"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title("Todos"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_pagination(f: &mut Frame, app: &App, area: Rect) {
    let info = app.page_info();
    let line = format!("page {} / {}", info.number, info.total_pages);
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(msg) = &app.message {
        msg.clone()
    } else {
        match app.mode {
            Mode::Normal => {
                "q: Quit | a: Add | e: Edit | Space: Toggle | d: Del | Tab: Filter | h/l: Page | j/k: Move"
                    .to_string()
            }
            Mode::Adding | Mode::Editing => {
                "Enter: Save | Esc: Cancel | Tab: References".to_string()
            }
        }
    };
    let style = if app.message.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 4, f.area());
    f.render_widget(Clear, area);
    let title = match app.edit_id {
        Some(id) => format!("Edit todo {}", id),
        None => "Add todo".to_string(),
    };
    let body = format!("{}\nrefs: {}", app.input.value, format_refs(&app.draft_refs));
    let input = Paragraph::new(body)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn draw_picker(f: &mut Frame, app: &App) {
    let candidates = app.picker_candidates();
    let height = (candidates.len() as u16 + 2).min(12);
    let area = centered_rect(50, height, f.area());
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = candidates
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let text = app
                .store
                .get(*id)
                .map(|t| t.text.clone())
                .unwrap_or_default();
            let checked = if app.draft_refs.contains(id) { "[x]" } else { "[ ]" };
            let prefix = if i == app.picker_cursor { ">" } else { " " };
            ListItem::new(format!("{} {} {} {}", prefix, checked, id, text))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("References (Space: toggle, Enter: done)"),
    );
    f.render_widget(list, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let pad = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(height),
            Constraint::Length(pad),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
