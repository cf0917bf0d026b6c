use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use super::app::{Dialog, EditorView, PanelApp, PickerView, TabView};

pub fn render(frame: &mut Frame, app: &PanelApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Length(3), // Search
            Constraint::Min(1),    // List and details
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let view = app.current_tab().view();

    render_tabs(frame, app, chunks[0]);
    render_search(frame, &view, chunks[1]);
    render_body(frame, &view, chunks[2]);
    render_status_bar(frame, app, &view, chunks[3]);

    match &view.dialog {
        Some(Dialog::Editor(editor)) => render_editor(frame, editor),
        Some(Dialog::Confirm { name, error, busy }) => render_confirm(frame, name, *error, *busy),
        None => {}
    }
    if let Some(picker) = &view.picker {
        render_picker(frame, picker);
    }
}

fn render_tabs(frame: &mut Frame, app: &PanelApp, area: Rect) {
    let titles = app
        .tabs
        .iter()
        .map(|tab| Line::from(tab.resource().label()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.current)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("|");

    frame.render_widget(tabs, area);
}

fn render_search(frame: &mut Frame, view: &TabView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Search {}", view.resource.path()));

    let (text, style) = if view.query.is_empty() {
        ("Type to filter by name...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (view.query.to_string(), Style::default())
    };

    frame.render_widget(Paragraph::new(text).style(style).block(block), area);
}

fn render_body(frame: &mut Frame, view: &TabView, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_list(frame, view, columns[0]);
    render_details(frame, view, columns[1]);
}

fn render_list(frame: &mut Frame, view: &TabView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(view.resource.label());

    if let Some(failure) = view.failure {
        let text = Text::from(vec![
            Line::from(Span::styled(
                format!("Failed to load {}.", view.resource.path()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(failure.to_string(), Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(Span::styled("F5: Retry", Style::default().fg(Color::DarkGray))),
        ]);
        frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
        return;
    }

    if view.rows.is_empty() {
        let message = match view.phase {
            "idle" | "loading" => format!("Loading {}...", view.resource.path()),
            _ if !view.query.is_empty() => format!("No {} match \"{}\".", view.resource.path(), view.query),
            _ => format!("No {} yet. F2 adds one.", view.resource.path()),
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items = view
        .rows
        .iter()
        .map(|row| ListItem::new(row.as_str()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(view.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_details(frame: &mut Frame, view: &TabView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");

    let lines = view
        .details
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
                Span::raw(value.as_str()),
            ])
        })
        .collect::<Vec<_>>();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &PanelApp, view: &TabView, area: Rect) {
    if let Some(notice) = view.notice {
        let bar = Paragraph::new(notice.to_string()).style(Style::default().fg(Color::Red));
        frame.render_widget(bar, area);
        return;
    }

    let help = if view.picker.is_some() {
        "↑/↓: Navigate  Enter: Select  Esc: Back"
    } else {
        match view.dialog {
            Some(Dialog::Editor(_)) => {
                "↑/↓: Field  Enter: Pick/Submit  Ctrl+S: Submit  Esc: Cancel"
            }
            Some(Dialog::Confirm { .. }) => "y: Delete  n/Esc: Keep",
            None => "↑/↓: Select  F2: Add  Enter: Edit  Del: Delete  F5: Refresh  Tab: Next  Esc: Quit",
        }
    };

    let status = format!("{}  [{}]  {}", help, view.phase, app.base_url);
    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, area);
}

/// Rows under the fields: a blank separator and the error or action line.
const EDITOR_FOOTER: u16 = 2;

fn render_editor(frame: &mut Frame, editor: &EditorView) {
    let height = (editor.fields.len() as u16 + EDITOR_FOOTER + 4).min(frame.area().height);
    let area = centered_rect_fixed(70, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title(editor.title.as_str());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(EDITOR_FOOTER)])
        .split(inner);
    let (fields_area, footer_area) = (rows[0], rows[1]);

    let label_width = editor
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    // Only a window of the fields fits on short terminals; keep the focus in it.
    let window = fields_area.height as usize;
    let offset = editor
        .focus
        .saturating_sub(window / 2)
        .min(editor.fields.len().saturating_sub(window));

    let lines = editor
        .fields
        .iter()
        .enumerate()
        .skip(offset)
        .take(window)
        .map(|(i, field)| {
            let label_style = if i == editor.focus {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mut spans = vec![
                Span::styled(format!("{:>width$}: ", field.label, width = label_width), label_style),
                Span::raw(field.value),
            ];
            if let Some(hint) = &field.hint {
                spans.push(Span::styled(
                    format!("  ({})", hint),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(Text::from(lines)), fields_area);

    let status = if let Some(error) = editor.error {
        Span::styled(error.to_string(), Style::default().fg(Color::Red))
    } else if editor.busy {
        Span::styled(
            "Saving...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )
    } else if editor.fields.len() > window {
        Span::styled(
            format!("Enter: {}  ({}/{})", editor.action, editor.focus + 1, editor.fields.len()),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            format!("Enter: {}", editor.action),
            Style::default().fg(Color::DarkGray),
        )
    };
    let footer = Paragraph::new(Text::from(vec![Line::from(""), Line::from(status)]))
        .wrap(Wrap { trim: false });
    frame.render_widget(footer, footer_area);

    if !editor.busy && editor.focus >= offset && editor.focus < offset + window {
        let cursor_x = fields_area.x + label_width as u16 + 2 + editor.cursor_column as u16;
        let cursor_y = fields_area.y + (editor.focus - offset) as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_confirm(frame: &mut Frame, name: &str, error: Option<&str>, busy: bool) {
    let area = centered_rect_fixed(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(format!("Delete \"{}\"?", name)),
        Line::from(""),
    ];
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    } else if busy {
        lines.push(Line::from(Span::styled(
            "Deleting...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "y: Delete  n: Keep",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title("Confirm Delete");
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_picker(frame: &mut Frame, picker: &PickerView) {
    let area = centered_rect(40, 50, frame.area());
    frame.render_widget(Clear, area);

    let items = picker
        .options
        .iter()
        .map(|option| ListItem::new(format!("#{:<4} {}", option.id, option.name)))
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(picker.title.as_str()))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(picker.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect_fixed(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);
    horizontal_center(percent_x, vertical[1])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    horizontal_center(percent_x, vertical[1])
}

fn horizontal_center(percent_x: u16, r: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(r)[1]
}
