use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{DailyProgress, History, PrayerType};
use crate::tui::theme;
use crate::utils::format::progress_bar;

/// Days shown in the weekly chart.
const CHART_DAYS: usize = 7;
/// Days listed under "recent activity".
const RECENT_DAYS: usize = 5;

pub fn render(frame: &mut Frame, area: Rect, history: &History, today: &DailyProgress) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(CHART_DAYS as u16 + 3),
            Constraint::Min(4),
        ])
        .split(area);

    render_headline(frame, chunks[0], today);
    render_chart(frame, chunks[1], history);
    render_recent(frame, chunks[2], history);
}

fn render_headline(frame: &mut Frame, area: Rect, today: &DailyProgress) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let done = today.prayers_done();
    let style = if today.is_complete() {
        theme::emerald()
    } else {
        theme::gold()
    };
    let line = Line::from(vec![
        Span::styled(format!("  {}", done), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" / {} today", PrayerType::ALL.len()), theme::dim()),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_chart(frame: &mut Frame, area: Rect, history: &History) {
    let block = Block::default()
        .title(Span::styled(" Last 7 Days ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let total = PrayerType::ALL.len() as u32;
    let mut lines = vec![Line::from("")];

    let days = history.recent(CHART_DAYS);
    if days.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing tracked yet. Mark a prayer from the Today view.",
            theme::dim(),
        )));
    }

    for day in &days {
        let done = day.prayers_done() as u32;
        let style = if day.is_complete() {
            theme::emerald()
        } else {
            theme::amber()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}  ", day.date.format("%a %d")), theme::dim()),
            Span::styled(progress_bar(done, total, 20), style),
            Span::styled(format!("  {}/{}", done, total), theme::bold()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent(frame: &mut Frame, area: Rect, history: &History) {
    let block = Block::default()
        .title(Span::styled(" Recent Activity ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = Vec::new();
    for day in history.recent(RECENT_DAYS).iter().rev() {
        let mut spans = vec![Span::styled(
            format!("  {}  ", day.date.format("%Y-%m-%d")),
            theme::bold().add_modifier(Modifier::DIM),
        )];
        for prayer in PrayerType::ALL {
            let style = if day.prayers.get(prayer) {
                theme::emerald()
            } else {
                theme::dim().add_modifier(Modifier::CROSSED_OUT)
            };
            spans.push(Span::styled(format!("{} ", prayer.display_name()), style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
