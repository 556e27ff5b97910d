use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{Recommendation, RecommendationKind};
use crate::tui::theme;
use crate::utils::format::wrap_text;

fn kind_label(kind: RecommendationKind) -> (&'static str, ratatui::style::Style) {
    match kind {
        RecommendationKind::Dua => ("DUA", theme::emerald()),
        RecommendationKind::Verse => ("VERSE", theme::gold()),
        RecommendationKind::Habit => ("HABIT", theme::amber()),
        RecommendationKind::Quote => ("QUOTE", theme::dim()),
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    recommendations: &[Recommendation],
    busy: bool,
    configured: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Guidance ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    let width = area.width.saturating_sub(6) as usize;
    let mut lines: Vec<Line> = vec![Line::from("")];

    if busy {
        lines.push(Line::from(Span::styled(
            "  Reflecting on your recent prayers…",
            theme::amber(),
        )));
    } else if recommendations.is_empty() {
        let hint = if configured {
            "  No guidance yet. Press [r] to ask for some."
        } else {
            "  Guidance needs an API key. Set GEMINI_API_KEY or [guidance].api_key."
        };
        lines.push(Line::from(Span::styled(hint, theme::dim())));
    }

    if !busy {
        for rec in recommendations {
            let (label, style) = kind_label(rec.kind);
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", label), style.add_modifier(Modifier::BOLD)),
                Span::styled(rec.title.clone(), theme::bold()),
            ]));
            if let Some(arabic) = rec.arabic.as_deref().filter(|a| !a.trim().is_empty()) {
                lines.push(Line::from(Span::styled(format!("    {}", arabic), theme::gold())));
            }
            for chunk in wrap_text(rec.display_body(), width) {
                lines.push(Line::from(Span::styled(format!("    {}", chunk), theme::base())));
            }
            if let Some(source) = rec.source.as_deref().filter(|s| !s.trim().is_empty()) {
                lines.push(Line::from(Span::styled(
                    format!("    — {}", source),
                    theme::dim().add_modifier(Modifier::ITALIC),
                )));
            }
            for chunk in wrap_text(&rec.reasoning, width) {
                lines.push(Line::from(Span::styled(format!("    {}", chunk), theme::dim())));
            }
            lines.push(Line::from(""));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// One-line teaser of the first recommendation for the Today view.
pub fn render_preview(frame: &mut Frame, area: Rect, first: Option<&Recommendation>) {
    let block = Block::default()
        .title(Span::styled(" Guidance ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let line = match first {
        Some(rec) => {
            let (label, style) = kind_label(rec.kind);
            Line::from(vec![
                Span::styled(format!(" {} ", label), style.add_modifier(Modifier::BOLD)),
                Span::styled(rec.title.clone(), theme::bold()),
            ])
        }
        None => Line::from(vec![
            Span::styled(" How's your spiritual journey today? ", theme::dim()),
            Span::styled("[3]", theme::gold()),
        ]),
    };

    frame.render_widget(Paragraph::new(vec![line]).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn preview_shows_first_title_or_invitation() {
        let mut terminal = Terminal::new(TestBackend::new(60, 4)).unwrap();
        terminal
            .draw(|f| render_preview(f, f.area(), None))
            .unwrap();
        assert!(screen_text(&terminal).contains("How's your spiritual journey today?"));

        let rec = Recommendation {
            kind: RecommendationKind::Dua,
            title: "Morning remembrance".to_string(),
            content: "c".to_string(),
            arabic: None,
            translation: None,
            source: None,
            reasoning: "r".to_string(),
        };
        terminal
            .draw(|f| render_preview(f, f.area(), Some(&rec)))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("DUA"));
        assert!(text.contains("Morning remembrance"));
    }
}
