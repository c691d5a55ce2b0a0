// File: src/tui/view.rs
use crate::color_utils;
use crate::controller::{Dialog, RESET_SENTINEL};
use crate::model::{Child, ConnectionMode};
use crate::progress::{self, GOAL, Progress, ROW_SIZE, ROWS};
use crate::tui::state::AppState;
use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Gauge, Paragraph, Wrap,
        canvas::{Canvas, Points},
    },
};

// Chip colours for the two children (palette blue and pink).
const CHILD_COLORS: [color_utils::Rgb; 2] = [(0x3b, 0x82, 0xf6), (0xec, 0x48, 0x99)];

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let now = Instant::now();
    let view = state.controller.snapshot();
    let progress = Progress::of(view.events.len());

    let banner_height = if state.banner.is_some() { 1 } else { 0 };
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Min(ROWS as u16 + 2),
            Constraint::Length(3),
        ])
        .split(f.area());

    // --- Banner ---
    if let Some(banner) = &state.banner {
        let color = match state.mode {
            ConnectionMode::Remote => Color::Green,
            _ => Color::Yellow,
        };
        let p = Paragraph::new(banner.text.as_str())
            .style(Style::default().fg(Color::Black).bg(color))
            .alignment(Alignment::Center);
        f.render_widget(p, v_chunks[0]);
    }

    // --- Progress ---
    let gauge_color = if progress.complete {
        Color::Green
    } else {
        Color::Yellow
    };
    let title = if view.loaded {
        " Progress ".to_string()
    } else {
        " Progress (Loading...) ".to_string()
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(progress.fraction.clamp(0.0, 1.0))
        .label(progress.label());
    f.render_widget(gauge, v_chunks[1]);

    // --- Grid + Today ---
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(v_chunks[2]);

    let mut grid_lines = Vec::with_capacity(ROWS);
    for row in 0..ROWS {
        let first = row * ROW_SIZE;
        let label = progress::row_label(first).unwrap_or(row + 1);
        let row_done = view.events.len() >= first + ROW_SIZE;
        let label_style = if row_done {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(format!("{:>3} ", label), label_style)];

        for index in first..first + ROW_SIZE {
            let filled = index < view.events.len();
            let text = if filled { "[★]" } else { "[ ]" };
            let mut style = if filled {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            if state.is_highlighted(index, now) {
                style = style.fg(Color::LightYellow).add_modifier(Modifier::BOLD);
            }
            if index == state.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        grid_lines.push(Line::from(spans));
    }

    let grid = Paragraph::new(grid_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Stars ({} / {}) ", view.events.len(), GOAL)),
    );
    f.render_widget(grid, h_chunks[0]);

    let today = state.controller.today();
    let mut today_lines = vec![
        Line::from(Span::styled(
            format!("{}", today.format("%A %-d %B")),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for child in Child::ALL {
        let has_star = view.events.iter().any(|e| e.is_for(child, today));
        let disabled = state.controller.is_toggle_disabled(child);
        let rgb = CHILD_COLORS[child.index()];
        let fg = if color_utils::is_dark(rgb) {
            Color::White
        } else {
            Color::Black
        };
        let chip = Span::styled(
            format!(" {} ", state.child_name(child)),
            Style::default()
                .bg(Color::Rgb(rgb.0, rgb.1, rgb.2))
                .fg(fg)
                .add_modifier(Modifier::BOLD),
        );
        let status = if disabled {
            Span::styled(" saving...", Style::default().fg(Color::DarkGray))
        } else if has_star {
            Span::styled(" ★ star today", Style::default().fg(Color::Yellow))
        } else {
            Span::styled(" ☆ not yet", Style::default().fg(Color::DarkGray))
        };
        today_lines.push(Line::from(vec![
            Span::raw(format!("[{}] ", child.index() + 1)),
            chip,
            status,
        ]));
        today_lines.push(Line::from(""));
    }
    let today_panel = Paragraph::new(today_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Today "));
    f.render_widget(today_panel, h_chunks[1]);

    // --- Footer ---
    let footer_area = v_chunks[3];
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(footer_area);
    let status = Paragraph::new(state.message.clone())
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(format!(" Status [{}] ", state.mode)),
        );
    let help = Paragraph::new("1/2:Toggle  Arrows:Move  Ret:Remove  R:Reset  q:Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);

    // --- Popups ---
    match &view.dialog {
        Dialog::None => {}
        Dialog::Remove { .. } => {
            let area = centered_rect(50, 25, f.area());
            let p = Paragraph::new(vec![
                Line::from("Remove this star?"),
                Line::from(""),
                Line::from("y/Enter: remove    n/Esc: keep"),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Remove star ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
            f.render_widget(Clear, area);
            f.render_widget(p, area);
        }
        Dialog::Reset { input } => {
            let area = centered_rect(60, 30, f.area());
            let valid = input == RESET_SENTINEL;
            let input_style = if valid {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            };
            let p = Paragraph::new(vec![
                Line::from("This erases every star for everyone."),
                Line::from(format!("Type {RESET_SENTINEL} to confirm:")),
                Line::from(""),
                Line::from(Span::styled(format!("> {input}"), input_style)),
                Line::from(""),
                Line::from(if valid {
                    "Enter: reset    Esc: cancel"
                } else {
                    "Esc: cancel"
                }),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Reset chart ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
            f.render_widget(Clear, area);
            f.render_widget(p, area);
        }
        Dialog::Celebration => {
            let area = centered_rect(50, 30, f.area());
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    "★ All 60 stars! ★",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!(
                    "Well done, {} and {}!",
                    state.child_name(Child::A),
                    state.child_name(Child::B)
                )),
                Line::from(""),
                Line::from("Enter: close"),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Celebration ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
            f.render_widget(Clear, area);
            f.render_widget(p, area);
        }
    }

    // --- Confetti overlay ---
    if !state.sprites.is_empty() {
        let (width, height) = state.confetti.size();
        let pieces = state.sprites.pieces();
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for piece in pieces {
                    let (r, g, b) = piece.color;
                    ctx.draw(&Points {
                        coords: &piece.points,
                        color: Color::Rgb(r, g, b),
                    });
                }
            });
        let area = f.area();
        f.render_widget(canvas, area);
    }
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
