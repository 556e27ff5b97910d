use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::session::View;
use crate::tui::theme;

fn hints_for(view: View) -> &'static [(&'static str, &'static str)] {
    match view {
        View::Today => &[
            ("[↑↓]", " select  "),
            ("[m]", " mark  "),
            ("[c]", " method  "),
            ("[h]", " school  "),
            ("[R]", " refresh  "),
        ],
        View::Progress => &[],
        View::Guidance => &[("[r]", " new guidance  ")],
        View::Qibla => &[("[←→]", " turn  ")],
    }
}

pub fn render(frame: &mut Frame, area: Rect, view: View, status: Option<&str>) {
    let mut spans = Vec::new();

    if let Some(msg) = status {
        spans.push(Span::styled(format!("{}   ", msg), theme::amber()));
    }

    for (key, label) in hints_for(view) {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }
    for (key, label) in [("[Tab]", " view  "), ("[?]", " help  "), ("[Esc]", " quit")] {
        spans.push(Span::styled(key, theme::gold()));
        spans.push(Span::styled(label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
