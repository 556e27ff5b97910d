use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::Coordinate;
use crate::qibla::bearing::compass_point;
use crate::qibla::relative_turn;
use crate::tui::theme;

const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];

fn arrow_for(degrees: f64) -> &'static str {
    let idx = ((degrees.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    ARROWS[idx]
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    location: Option<&Coordinate>,
    bearing: Option<f64>,
    heading: Option<f64>,
) {
    let block = Block::default()
        .title(Span::styled(" Qibla ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];

    match (location, bearing) {
        (Some(loc), Some(bearing)) => {
            lines.push(Line::from(vec![
                Span::styled("Bearing  ", theme::dim()),
                Span::styled(
                    format!("{:.0}° {}", bearing.round(), compass_point(bearing)),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(""));

            match heading {
                Some(heading) => {
                    let turn = relative_turn(bearing, heading);
                    lines.push(Line::from(Span::styled(
                        arrow_for(turn),
                        theme::emerald().add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(vec![
                        Span::styled("Heading  ", theme::dim()),
                        Span::styled(format!("{:.0}°", heading), theme::bold()),
                        Span::styled("   Turn  ", theme::dim()),
                        Span::styled(format!("{:.0}° clockwise", turn), theme::amber()),
                    ]));
                }
                None => {
                    lines.push(Line::from(Span::styled(
                        arrow_for(bearing),
                        theme::emerald().add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(Span::styled(
                        "Relative to true north. Use ←/→ to set your heading.",
                        theme::dim(),
                    )));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "{}  ({:.4}, {:.4})",
                    loc.label(),
                    loc.latitude,
                    loc.longitude
                ),
                theme::dim(),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled("Locating…", theme::dim())));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
