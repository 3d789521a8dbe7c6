// Dashboard view - renders the widget grid, logs panel, and status bar
//
// Pure display: reads container surface snapshots and app state, draws
// them. All content decisions happened earlier, inside the templates.

use super::app::App;
use crate::logging::LogLevel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Widgets per grid row
const GRID_COLUMNS: usize = 3;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Length(1), Constraint::Min(8)];
    if app.show_logs {
        constraints.push(Constraint::Length(8));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_title_bar(f, chunks[0], app);
    draw_widget_grid(f, chunks[1], app);
    if app.show_logs {
        draw_logs_panel(f, chunks[2], app);
    }
    draw_status_bar(f, *chunks.last().expect("status bar chunk"), app);
}

fn draw_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Paragraph::new(" glance — live dashboard  (q quit, l logs)").style(app.theme.title);
    f.render_widget(title, area);
}

/// Lay the containers out in rows of up to GRID_COLUMNS panels
fn draw_widget_grid(f: &mut Frame, area: Rect, app: &App) {
    let containers = app.containers.lock().unwrap().clone();
    if containers.is_empty() {
        let placeholder = Paragraph::new("starting…").style(app.theme.dim);
        f.render_widget(placeholder, area);
        return;
    }

    let rows = containers.chunks(GRID_COLUMNS).collect::<Vec<_>>();
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Ratio(1, rows.len() as u32);
            rows.len()
        ])
        .split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cell_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, row.len() as u32); row.len()])
            .split(*row_area);

        for (container, cell) in row.iter().zip(cell_areas.iter()) {
            let surface = container.snapshot();
            let inner_width = cell.width.saturating_sub(2) as usize;

            let lines: Vec<Line> = surface
                .lines()
                .iter()
                .map(|line| Line::from(truncate_to_width(line, inner_width)))
                .collect();

            let panel = Paragraph::new(lines).style(app.theme.text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(surface.title.clone())
                    .border_style(app.theme.border),
            );
            f.render_widget(panel, *cell);
        }
    }
}

fn draw_logs_panel(f: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log_buffer
        .tail(visible)
        .into_iter()
        .map(|entry| {
            let style = match entry.level {
                LogLevel::Error => app.theme.error,
                LogLevel::Warn => app.theme.warn,
                _ => app.theme.dim,
            };
            Line::styled(
                format!(
                    "{} {:5} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.level.as_str(),
                    entry.message
                ),
                style,
            )
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" logs ")
            .border_style(app.theme.border),
    );
    f.render_widget(panel, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let stats = &app.stats;
    let activity = app.last_activity.as_deref().unwrap_or("waiting for data");

    let text = format!(
        " {} │ renders {} │ ok {:.0}% │ push {} │ poll {} │ {}",
        app.uptime(),
        stats.renders,
        stats.success_rate(),
        stats.pushes,
        stats.poll_ticks,
        activity,
    );

    let bar = Paragraph::new(text).style(app.theme.text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border),
    );
    f.render_widget(bar, area);
}

/// Clip a line to the panel's inner width, unicode-aware
fn truncate_to_width(line: &str, width: usize) -> String {
    if line.width() <= width {
        return line.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let w = UnicodeWidthStr::width(ch.to_string().as_str());
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
