use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{DailyProgress, PrayerType};
use crate::prayer_times::DailySchedule;
use crate::tui::theme;
use crate::utils::format::format_time;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: Option<&DailySchedule>,
    progress: &DailyProgress,
    next: Option<PrayerType>,
    focused_idx: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    let items: Vec<ListItem> = PrayerType::ALL
        .iter()
        .map(|prayer| {
            let is_focused = prayer.index() == focused_idx;
            let is_next = next == Some(*prayer);
            let done = progress.prayers.get(*prayer);

            let time_str = format_time(schedule.map(|s| s.time(*prayer)));

            let (icon, status_style) = if done {
                ("●", theme::emerald())
            } else {
                ("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let mut spans = vec![
                Span::styled(if is_focused { " ▸ " } else { "   " }, theme::gold()),
                Span::styled(format!("{:<8}", prayer.display_name()), name_style),
                Span::styled(format!("{:<7}", time_str), theme::dim()),
                Span::styled(icon, status_style),
                Span::styled(if done { "  performed" } else { "" }, theme::dim()),
            ];
            if is_next {
                spans.push(Span::styled(
                    "  NEXT",
                    theme::amber().add_modifier(Modifier::BOLD),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
