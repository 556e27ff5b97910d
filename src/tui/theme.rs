use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 20, 18);
pub const SURFACE: Color = Color::Rgb(20, 30, 27);
pub const BORDER: Color = Color::Rgb(40, 64, 56);
pub const TEXT: Color = Color::Rgb(226, 232, 222);
pub const TEXT_DIM: Color = Color::Rgb(118, 138, 128);
pub const GOLD: Color = Color::Rgb(196, 160, 68);
pub const EMERALD: Color = Color::Rgb(52, 168, 120);
pub const AMBER: Color = Color::Rgb(210, 138, 60);
pub const RED: Color = Color::Rgb(180, 82, 62);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn emerald() -> Style {
    Style::default().fg(EMERALD)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}
