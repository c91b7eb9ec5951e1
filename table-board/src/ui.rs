//! Board rendering

use crate::app::{App, GRID_COLUMNS};
use ratatui::{prelude::*, widgets::*};
use table_client::{MENU, TableCard};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

pub fn draw<A>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Table grid
            Constraint::Length(8), // Logs
            Constraint::Length(1), // Key help
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_logs(f, app, chunks[2]);

    let help = if app.open_card().is_some() {
        " ↑/↓ move · Space toggle · Enter save · Esc cancel "
    } else {
        " ←↑↓→ select table · a add order · c clear · PgUp/PgDn logs · q quit "
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    if let Some(card) = app.open_card() {
        draw_dialog(f, app, card);
    }
    if let Some(notice) = app.notices.front() {
        draw_notice(f, notice, app.notices.len() - 1);
    }
}

fn draw_header<A>(f: &mut Frame, app: &App<A>, area: Rect) {
    let live = if app.push_connected {
        Span::styled(" LIVE ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(" OFFLINE ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    };
    let mut spans = vec![Span::raw(" Table Management "), Span::raw(" | "), live];
    if app.pending_writes > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!(" saving ({}) ", app.pending_writes),
            Style::default().fg(Color::Yellow),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(title, area);
}

fn draw_grid<A>(f: &mut Frame, app: &App<A>, area: Rect) {
    let rows = app.cards.len().div_ceil(GRID_COLUMNS).max(1);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
        let cell_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);

        for (col, cell) in cell_areas.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            let Some(card) = app.cards.get(index) else {
                break;
            };
            let orders = app.store.table(index).unwrap_or_default();

            let border = if index == app.focus {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).add_modifier(Modifier::DIM)
            };
            let body = Paragraph::new(TableCard::summary(orders))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(format!(" {} ", card.title()))
                        .borders(Borders::ALL)
                        .border_style(border),
                );
            f.render_widget(body, *cell);
        }
    }
}

fn draw_logs<A>(f: &mut Frame, app: &App<A>, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title(" Logs ")
                .border_style(Style::default().fg(Color::White).add_modifier(Modifier::DIM))
                .borders(Borders::ALL),
        )
        .output_separator('|')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style(Style::default().fg(Color::White))
        .state(&app.logger_state);
    f.render_widget(logs, area);
}

fn draw_dialog<A>(f: &mut Frame, app: &App<A>, card: &TableCard) {
    let area = centered_rect(40, MENU.len() as u16 + 2, f.area());

    let lines: Vec<Line> = MENU
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let mark = if card.is_selected(item) { "[x]" } else { "[ ]" };
            let style = if row == app.menu_cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::styled(format!(" {mark} {item}"), style)
        })
        .collect();

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" Select Menu Items for {} ", card.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn draw_notice(f: &mut Frame, notice: &str, queued: usize) {
    let area = centered_rect(40, 5, f.area());
    let hint = if queued > 0 {
        format!("Press Enter to dismiss ({queued} more)")
    } else {
        "Press Enter to dismiss".to_string()
    };
    let text = vec![
        Line::from(notice.to_string()),
        Line::from(""),
        Line::styled(hint, Style::default().fg(Color::DarkGray)),
    ];
    let popup = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

/// Rect of `width` x `height` centered in `area`, clamped to it
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
