use chrono::NaiveTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// "HH:MM", or the placeholder when no time is known.
pub fn format_time(t: Option<NaiveTime>) -> String {
    t.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Greedy word wrap by display width (wide glyphs count double).
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(8);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0;

    for word in text.split_whitespace() {
        let word_w = word.width();
        if current_w > 0 && current_w + 1 + word_w > width {
            lines.push(std::mem::take(&mut current));
            current_w = 0;
        }
        if current_w > 0 {
            current.push(' ');
            current_w += 1;
        }
        if word_w > width {
            // hard-split words longer than a whole line
            for ch in word.chars() {
                let w = ch.width().unwrap_or(0);
                if current_w + w > width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0;
                }
                current.push(ch);
                current_w += w;
            }
        } else {
            current.push_str(word);
            current_w += word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(59 * 60), "59m");
        assert_eq!(format_duration_secs(2 * 3600 + 5 * 60 + 30), "2h 5m");
    }

    #[test]
    fn placeholder_time() {
        assert_eq!(format_time(None), "--:--");
        assert_eq!(format_time(NaiveTime::from_hms_opt(5, 7, 0)), "05:07");
    }

    #[test]
    fn bars() {
        assert_eq!(progress_bar(5, 5, 5), "█████");
        assert_eq!(progress_bar(0, 5, 5), "░░░░░");
        assert_eq!(progress_bar(2, 5, 5), "██░░░");
        assert_eq!(progress_bar(1, 0, 3), "░░░");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("seek help through patience and prayer", 16);
        assert_eq!(lines, vec!["seek help", "through patience", "and prayer"]);
        assert!(lines.iter().all(|l| l.width() <= 16));
    }

    #[test]
    fn wraps_overlong_words() {
        let lines = wrap_text("abcdefghijklmnopqrst", 8);
        assert_eq!(lines, vec!["abcdefgh", "ijklmnop", "qrst"]);
    }
}
