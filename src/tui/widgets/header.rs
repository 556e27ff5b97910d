use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::session::View;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    hijri: Option<&str>,
    gregorian: Option<&str>,
    place: &str,
    active: View,
) {
    let gregorian_str = gregorian
        .map(str::to_string)
        .unwrap_or_else(|| Local::now().format("%A, %b %d, %Y").to_string());

    let title_line = Line::from(vec![
        Span::styled("  مِيقَات  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("miqat", theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(place.to_string(), theme::dim()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = hijri {
        date_spans.push(Span::styled(hijri.to_string(), theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian_str, theme::dim()));

    let mut tab_spans = Vec::new();
    for (i, view) in View::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, view.title());
        let style = if *view == active {
            theme::emerald().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            theme::dim()
        };
        tab_spans.push(Span::styled(label, style));
        tab_spans.push(Span::raw(" "));
    }

    let text = vec![title_line, Line::from(date_spans), Line::from(tab_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
