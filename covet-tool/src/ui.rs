//! TUI rendering with ratatui.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Form, FormField};

/// Render the screen.
pub fn render(frame: &mut Frame, app: &mut App) {
    let has_form = app.form.is_some();
    let constraints = if has_form {
        vec![
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Item list
            Constraint::Length(5), // Entry form
            Constraint::Length(3), // Help / error bar
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    if has_form {
        render_form(frame, app, chunks[2]);
    }
    render_help(frame, app, *chunks.last().expect("layout has chunks"));
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Covet - {} item(s) - sort: {} ",
        app.row_count(),
        app.sort_label()
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White))
        .title(title);

    frame.render_widget(block, area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Wishlist ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = app.visible_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("Nothing coveted yet. Press a to add an item.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|fields| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    fields.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", fields.price),
                    Style::default().fg(Color::Green),
                )),
                Line::from(Span::styled(
                    format!("  {}", fields.details),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };
    let title = if form.target.is_some() {
        " Edit item "
    } else {
        " Add item "
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = [
        (FormField::Title, "Title"),
        (FormField::Price, "Price"),
        (FormField::Details, "Details"),
    ]
    .into_iter()
    .map(|(field, label)| form_line(form, field, label))
    .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn form_line<'a>(form: &'a Form, field: FormField, label: &'a str) -> Line<'a> {
    let focused = form.field == field;
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(Span::styled(
        format!("{marker}{label}: {}{cursor}", form.input(field)),
        style,
    ))
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = &app.last_error {
        let para = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(para, inner);
        return;
    }

    let help_spans = if app.form.is_some() {
        vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Next/Submit  "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Next field  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]
    } else {
        vec![
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Navigate  "),
            Span::styled("a", Style::default().fg(Color::Yellow)),
            Span::raw(" Add  "),
            Span::styled("e", Style::default().fg(Color::Yellow)),
            Span::raw(" Edit  "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(" Delete  "),
            Span::styled("s", Style::default().fg(Color::Yellow)),
            Span::raw(" Sort  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" Reload  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]
    };

    let help = Paragraph::new(Line::from(help_spans));
    frame.render_widget(help, inner);
}
