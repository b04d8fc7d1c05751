use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, EditContext, InputField, Mode, TextField};
use crate::column_view::ColumnView;
use crate::types::{Priority, StatusColumn};

const NORMAL_HELP: &str =
    " i: new  e: edit  d: delete  </>: move  h/l: column  j/k: task  /: filter  q: quit ";
const INSERT_HELP: &str = " Enter: save  Tab: switch field  Esc: cancel ";
const ERROR_HELP: &str = " Enter/Esc: dismiss ";

pub fn render(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);

    if let Some(error) = app.error.as_deref() {
        render_error(frame, chunks[1], app, error);
    } else {
        render_columns(frame, chunks[1], app);
    }

    render_footer(frame, chunks[2], app);

    if app.mode == Mode::Insert && app.error.is_none() {
        render_input_overlay(frame, app);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let header = Block::default()
        .title(format!(" {} ", app.board.board().title))
        .title_alignment(Alignment::Left)
        .style(Style::default().fg(app.theme.base.header));

    let count_info = format!(" {} tasks ", app.board.task_count());
    let header_right = Block::default()
        .title(count_info)
        .title_alignment(Alignment::Right)
        .style(Style::default().fg(app.theme.base.text_muted));

    frame.render_widget(header, area);
    frame.render_widget(header_right, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let help = if app.error.is_some() {
        ERROR_HELP
    } else {
        match app.mode {
            Mode::Normal => NORMAL_HELP,
            Mode::Insert => INSERT_HELP,
        }
    };
    let footer = Block::default()
        .title(help)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.base.text_muted));
    frame.render_widget(footer, area);
}

/// A pending persistence error takes over the board area until acknowledged.
fn render_error(frame: &mut Frame<'_>, area: Rect, app: &App, error: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(app.theme.base.danger))
        .title(" Error ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(error.to_string())
            .style(Style::default().fg(app.theme.base.text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_columns(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let columns = app.board.columns();
    if columns.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = (0..columns.len())
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();

    let column_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, column) in columns.iter().enumerate() {
        let Some(view) = app.column_views.get(i) else {
            continue;
        };
        let is_focused = i == app.focused_column;
        render_column(frame, column_chunks[i], app, view, column, is_focused);
    }
}

fn render_column(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &App,
    view: &ColumnView,
    column: &StatusColumn,
    is_focused: bool,
) {
    let items = view.visible_items();

    let mut title = format!(" {} ({}) ", column.name, items.len());
    if let Some(query) = view.filter_query() {
        title = format!(" {} ({}) /{} ", column.name, items.len(), query);
    }

    let border_type = if is_focused {
        BorderType::Double
    } else {
        BorderType::Plain
    };
    let border_color = if is_focused {
        app.theme.interactive.focus
    } else {
        app.theme.interactive.border
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(Style::default().fg(app.theme.column_color(&column.color)))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if items.is_empty() {
        let placeholder = if view.filter_query().is_some() {
            "No matching tasks"
        } else {
            "No tasks"
        };
        frame.render_widget(
            Paragraph::new(placeholder)
                .style(Style::default().fg(app.theme.base.text_muted))
                .alignment(Alignment::Center),
            inner_area,
        );
        return;
    }

    let mut y_offset = 0;
    for (j, item) in items.iter().enumerate().skip(view.scroll_offset()) {
        if y_offset + 2 > inner_area.height {
            break;
        }

        let is_selected = is_focused && j == view.selected_index();
        let prefix = if is_selected { "▸" } else { " " };
        let title_color = if is_selected {
            app.theme.interactive.selected_fg
        } else {
            app.theme.base.text
        };

        let line1 = Line::from(vec![
            Span::styled(
                prefix,
                Style::default().fg(app.theme.interactive.selected_marker),
            ),
            Span::styled(
                priority_badge(item.priority),
                Style::default().fg(priority_color(app, item.priority)),
            ),
            Span::raw(" "),
            Span::styled(item.title.as_str(), Style::default().fg(title_color)),
        ]);

        let detail = if item.description.is_empty() {
            String::new()
        } else {
            format!("   {}", item.description)
        };
        let line2 = Line::from(Span::styled(
            detail,
            Style::default().fg(app.theme.base.text_muted),
        ));

        let task_area = Rect {
            x: inner_area.x,
            y: inner_area.y + y_offset,
            width: inner_area.width,
            height: 2,
        };
        frame.render_widget(Paragraph::new(vec![line1, line2]), task_area);

        y_offset += 3;
    }
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "○",
        Priority::Medium => "◐",
        Priority::High => "●",
    }
}

fn priority_color(app: &App, priority: Priority) -> Color {
    match priority {
        Priority::Low => app.theme.base.text_muted,
        Priority::Medium => app.theme.base.accent,
        Priority::High => app.theme.base.danger,
    }
}

fn render_input_overlay(frame: &mut Frame<'_>, app: &App) {
    let area = centered_rect(70, 40, frame.area());
    frame.render_widget(Clear, area);

    let title = match app.edit_context {
        EditContext::Editing { .. } => " Edit Task ",
        _ => " New Task ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(app.theme.dialog.border))
        .title(title)
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(inner_area);

    render_input_field(
        frame,
        layout[0],
        app,
        &app.input.title,
        app.input.focused == InputField::Title,
    );
    render_input_field(
        frame,
        layout[1],
        app,
        &app.input.description,
        app.input.focused == InputField::Description,
    );
}

fn render_input_field(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &App,
    field: &TextField,
    is_focused: bool,
) {
    let border_color = if is_focused {
        app.theme.dialog.input_focus
    } else {
        app.theme.dialog.input_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(field.prompt)
        .border_style(Style::default().fg(border_color));

    let (text, text_color) = if field.value().is_empty() {
        (field.placeholder, app.theme.base.text_muted)
    } else {
        (field.value(), app.theme.base.text)
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(text_color))
            .block(block),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
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
