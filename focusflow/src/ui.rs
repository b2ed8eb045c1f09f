use crate::app::{completion_text, App, AppMode};
use crate::boot::BANNER;
use focusflow_core::{format_mmss, SessionMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Where the animated panels ended up on the last frame.
#[derive(Default, Clone, Copy)]
pub struct UiLayout {
    pub timer: Rect,
    pub radio: Rect,
}

pub fn draw(f: &mut Frame, app: &App) -> UiLayout {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.config.theme.background)),
        area,
    );

    if app.mode == AppMode::Boot {
        draw_boot(f, area, app);
        return UiLayout::default();
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_timer(f, chunks[1], app);
    draw_radio(f, chunks[2], app);
    draw_quote(f, chunks[3], app);
    draw_status_bar(f, chunks[4], app);

    match app.mode {
        AppMode::ShowHelp => draw_help_overlay(f, app),
        AppMode::SessionOver(finished) => draw_alert_overlay(f, app, finished),
        _ => {}
    }

    UiLayout {
        timer: chunks[1],
        radio: chunks[2],
    }
}

fn draw_boot(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let mut lines: Vec<Line> = BANNER
        .lines()
        .map(|l| Line::styled(l.to_string(), Style::default().fg(theme.accent)))
        .collect();
    lines.push(Line::raw(""));
    for boot_line in app.boot.lines() {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", icons.prompt), Style::default().fg(theme.accent)),
            Span::styled(*boot_line, Style::default().fg(theme.primary)),
        ]));
    }
    if app.boot.is_finalizing() {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", icons.prompt), Style::default().fg(theme.accent)),
            Span::styled("FINALIZING...", Style::default().fg(theme.primary)),
        ]));
        lines.push(Line::styled(
            app.boot
                .progress_bar(&icons.progress_filled, &icons.progress_empty),
            Style::default().fg(theme.primary),
        ));
    }
    if app.boot.is_complete() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Press any key to begin",
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.muted))
        .style(Style::default().bg(theme.black));
    f.render_widget(
        Paragraph::new(lines).block(block),
        centered_rect(80, 90, area),
    );
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = vec![
        Line::from(vec![
            Span::raw(icons.header_left.clone()),
            Span::styled(
                "FOCUSFLOW",
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(icons.header_right.clone()),
        ]),
        Line::styled(
            format!("listening now {}", app.listeners.count()),
            Style::default().fg(theme.muted),
        ),
    ];
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let state = app.timer.state();
    let block = Block::default()
        .title(Span::styled(
            format!(" {} Pomodoro Timer ", icons.timer),
            Style::default().fg(theme.muted),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if state.is_running {
            theme.primary
        } else {
            theme.muted
        }));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let tabs: Vec<Span> = SessionMode::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, mode)| {
            let style = if *mode == state.mode {
                Style::default()
                    .fg(theme.background)
                    .bg(theme.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            [
                Span::styled(format!(" {}:{} ", i + 1, mode.label()), style),
                Span::raw("  "),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(tabs)).alignment(Alignment::Center),
        rows[0],
    );

    let state_icon = if state.is_running {
        &icons.play
    } else {
        &icons.pause
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", state_icon), Style::default().fg(theme.accent)),
            Span::styled(
                format_mmss(state.remaining_seconds),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center),
        rows[2],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme.primary).bg(theme.black))
            .label("")
            .ratio(app.timer.progress().clamp(0.0, 1.0)),
        rows[3],
    );
    f.render_widget(
        Paragraph::new(format!(
            "Completed Sessions: {}",
            state.completed_work_sessions
        ))
        .style(Style::default().fg(theme.muted))
        .alignment(Alignment::Center),
        rows[4],
    );
}

fn draw_radio(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let radio = &app.radio;
    let block = Block::default()
        .title(Span::styled(
            format!(" {} Radio ", icons.radio),
            Style::default().fg(theme.muted),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if radio.is_playing() {
            theme.accent
        } else {
            theme.muted
        }));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner_area);

    let title = match (radio.loading_message(), radio.current_station()) {
        (Some(message), _) => Span::styled(message, Style::default().fg(theme.yellow)),
        (None, Some(station)) => Span::styled(
            station.name.clone(),
            Style::default().fg(theme.foreground),
        ),
        (None, None) => Span::styled("No station selected", Style::default().fg(theme.muted)),
    };
    let play_icon = if radio.is_playing() {
        &icons.pause
    } else {
        &icons.play
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", play_icon), Style::default().fg(theme.accent)),
            title,
            Span::styled(format!("  {}", icons.next), Style::default().fg(theme.muted)),
        ])),
        rows[0],
    );

    let volume = usize::from(radio.volume());
    let filled = volume / 5;
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", icons.volume), Style::default().fg(theme.accent)),
            Span::styled(
                icons.progress_filled.repeat(filled),
                Style::default().fg(theme.primary),
            ),
            Span::styled(
                icons.progress_empty.repeat(20 - filled),
                Style::default().fg(theme.black),
            ),
            Span::styled(format!(" {:>3}", volume), Style::default().fg(theme.muted)),
        ])),
        rows[2],
    );
}

fn draw_quote(f: &mut Frame, area: Rect, app: &App) {
    if !app.quote_visible {
        return;
    }
    let Some(quote) = app.quote.as_deref() else {
        return;
    };
    let theme = &app.config.theme;
    let text = format!("\u{201c}{}\u{201d}", quote);
    let height = area.height.min(4);
    let area = Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    };
    f.render_widget(
        Paragraph::new(text)
            .style(
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered_rect(80, 100, area),
    );
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match app.mode {
        AppMode::Normal | AppMode::Boot => ("FOCUS", theme.green),
        AppMode::ShowHelp => ("HELP", theme.yellow),
        AppMode::SessionOver(_) => ("ALERT", theme.red),
    };
    let help = match app.mode {
        AppMode::Normal | AppMode::Boot => {
            "space:start/pause │ r:reset │ 1-3:mode │ p:play │ s:next │ +/-:vol │ ?:help │ q:quit"
        }
        AppMode::ShowHelp => "esc:close",
        AppMode::SessionOver(_) => "enter:ok",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.muted))),
        area,
    );
}

fn draw_alert_overlay(f: &mut Frame, app: &App, finished: SessionMode) {
    let theme = &app.config.theme;
    let (title, body) = completion_text(finished);
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} {} ", app.config.icons.bell, title))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.background));
    f.render_widget(
        Paragraph::new(vec![
            Line::raw(""),
            Line::styled(body, Style::default().fg(theme.foreground)),
            Line::raw(""),
            Line::styled(
                format!("Up next: {}", app.timer.mode()),
                Style::default().fg(theme.primary),
            ),
        ])
        .alignment(Alignment::Center)
        .block(block),
        area,
    );
}

fn draw_help_overlay(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let shortcuts = [
        (
            "Timer",
            vec![
                ("Space", "Start/pause"),
                ("r", "Reset session"),
                ("1 / 2 / 3", "Work / short break / long break"),
            ],
        ),
        (
            "Radio",
            vec![
                ("p", "Play/pause"),
                ("s", "Next station"),
                ("+ / -", "Volume up/down"),
            ],
        ),
        (
            "General",
            vec![
                ("n", "New quote"),
                ("h", "Hide/show quote"),
                ("?", "Toggle help"),
                ("q", "Quit"),
            ],
        ),
    ];

    let mut lines = Vec::new();
    for (section, keys) in shortcuts {
        lines.push(Line::styled(
            section,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), Style::default().fg(theme.primary)),
                Span::styled(action, Style::default().fg(theme.foreground)),
            ]));
        }
        lines.push(Line::raw(""));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.yellow))
                .style(Style::default().bg(theme.background)),
        ),
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
