use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, LineGauge, Paragraph, Tabs, Widget},
};

use pomotui::{
    runtime::TickScheduler,
    session::Phase,
    settings::SettingField,
    util::{ends_at, format_time},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

fn phase_color(phase: Phase) -> Color {
    if phase.is_break() {
        Color::Green
    } else {
        Color::Red
    }
}

fn mode_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Work => "Work",
        Phase::ShortBreak => "Short Break",
        Phase::LongBreak => "Long Break",
    }
}

impl<S: TickScheduler> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.controller.snapshot();
        let accent = phase_color(state.phase);

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let accent_bold_style = Style::default().patch(bold_style).fg(accent);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" pomotui ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(accent));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // phase title
                Constraint::Length(3), // countdown
                Constraint::Length(1), // sessions / ends at
                Constraint::Length(1), // progress
                Constraint::Length(1), // spacer
                Constraint::Length(1), // start/pause + reset
                Constraint::Length(1), // mode selector
                Constraint::Length(1), // spacer
                Constraint::Length(2), // work slider
                Constraint::Length(2), // short break slider
                Constraint::Length(2), // long break slider
                Constraint::Length(1), // status
                Constraint::Min(0),
                Constraint::Length(1), // help
            ])
            .split(inner);

        Paragraph::new(Span::styled(state.phase.to_string(), bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                format_time(state.remaining_secs),
                accent_bold_style,
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let mut info = vec![Span::raw(format!(
            "Completed Sessions: {}",
            state.completed_work_sessions
        ))];
        if state.is_running {
            info.push(Span::styled(
                format!("  ·  ends at {}", ends_at(&Local::now(), state.remaining_secs)),
                italic_style,
            ));
        }
        Paragraph::new(Line::from(info))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(accent))
            .ratio(state.progress())
            .label("")
            .render(chunks[3], buf);

        let toggle_label = if state.is_running { "Pause" } else { "Start" };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("[{}] ", toggle_label), accent_bold_style),
            Span::styled("(space)", dim_style),
            Span::raw("    "),
            Span::styled("[Reset] ", bold_style),
            Span::styled("(r)", dim_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        let selected_mode = Phase::ALL
            .iter()
            .position(|p| *p == state.phase)
            .unwrap_or(0);
        let tabs_style = if state.is_running {
            dim_style
        } else {
            Style::default()
        };
        Tabs::new(
            Phase::ALL
                .iter()
                .enumerate()
                .map(|(idx, p)| format!("{} {}", idx + 1, mode_label(*p))),
        )
        .select(selected_mode)
        .style(tabs_style)
        .highlight_style(accent_bold_style.add_modifier(Modifier::REVERSED))
        .render(centered(chunks[6], 44), buf);

        for (field, chunk) in SettingField::ALL.iter().zip(&chunks[8..11]) {
            render_slider(self, *field, *chunk, buf);
        }

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(chunks[11], buf);
        }

        Paragraph::new(Span::styled(
            "(1/2/3) mode  (tab) select  (←/→) adjust  (q)uit",
            italic_style.add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[13], buf);
    }
}

fn render_slider<S: TickScheduler>(app: &App<S>, field: SettingField, area: Rect, buf: &mut Buffer) {
    let state = app.controller.snapshot();
    let value = state.settings.get(field);
    let range = field.range();
    let span = (range.end() - range.start()).max(1);
    let ratio = f64::from(value - range.start()) / f64::from(span);

    let disabled = state.is_running;
    let selected = app.selected == field;
    let color = if disabled {
        Color::DarkGray
    } else {
        phase_color(field.phase())
    };

    let marker = if selected && !disabled { "▸ " } else { "  " };
    let mut label_style = Style::default().add_modifier(Modifier::BOLD);
    if disabled {
        label_style = label_style.add_modifier(Modifier::DIM);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    Paragraph::new(Span::styled(
        format!("{}{}: {} minutes", marker, field, value),
        label_style,
    ))
    .render(rows[0], buf);

    LineGauge::default()
        .filled_style(Style::default().fg(color))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .line_set(symbols::line::THICK)
        .label(format!("{}-{}", range.start(), range.end()))
        .ratio(ratio.clamp(0.0, 1.0))
        .render(rows[1], buf);
}

/// Horizontally centered sub-area at most `width` columns wide
fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
