use crate::models::{History, PrayerType};

/// How many of the most recent days are summarised for the model.
pub const RECENT_DAYS: usize = 3;

/// How many recommendations are requested per call.
pub const RECOMMENDATION_COUNT: usize = 3;

/// One line per recent day: `2026-10-18: Fajr, Dhuhr` or `2026-10-18: none`.
pub fn summarize_history(history: &History) -> String {
    if history.is_empty() {
        return "No prayers recorded yet.".to_string();
    }
    history
        .recent(RECENT_DAYS)
        .iter()
        .map(|day| {
            let done: Vec<&str> = day
                .prayers
                .completed()
                .iter()
                .map(|p| p.display_name())
                .collect();
            let done = if done.is_empty() {
                "none".to_string()
            } else {
                done.join(", ")
            };
            format!("{}: {}", day.date.format("%Y-%m-%d"), done)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(history: &History, next_prayer: PrayerType, user_name: &str) -> String {
    format!(
        "You are a gentle, knowledgeable companion helping a Muslim keep up their daily prayers.\n\
         \n\
         Person: {name}\n\
         Upcoming prayer: {next}\n\
         Prayers completed over the last {days} recorded days:\n\
         {history}\n\
         \n\
         Suggest exactly {count} things for this moment:\n\
         1. a dua, with its Arabic text and an English translation;\n\
         2. a Qur'anic verse, with its Arabic text, an English translation and the surah:ayah reference;\n\
         3. one practical habit or act of worship they can do today.\n\
         \n\
         If prayers were missed recently, encourage them kindly without blame. \
         If they have been consistent, acknowledge it and suggest something that deepens their practice. \
         For each item, explain in `reasoning` how it relates to the history above.",
        name = user_name,
        next = next_prayer.display_name(),
        days = RECENT_DAYS,
        history = summarize_history(history),
        count = RECOMMENDATION_COUNT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn summarises_only_the_last_three_days() {
        let mut history = History::new();
        history.toggle(day(14), PrayerType::Isha);
        history.toggle(day(15), PrayerType::Fajr);
        history.toggle(day(15), PrayerType::Asr);
        history.toggle(day(16), PrayerType::Fajr);
        history.toggle(day(16), PrayerType::Fajr);
        history.toggle(day(17), PrayerType::Maghrib);

        let summary = summarize_history(&history);
        assert_eq!(
            summary,
            "2026-10-15: Fajr, Asr\n2026-10-16: none\n2026-10-17: Maghrib"
        );
    }

    #[test]
    fn empty_history_is_stated_explicitly() {
        assert_eq!(summarize_history(&History::new()), "No prayers recorded yet.");
    }

    #[test]
    fn prompt_carries_context() {
        let mut history = History::new();
        history.toggle(day(18), PrayerType::Dhuhr);
        let prompt = build_prompt(&history, PrayerType::Asr, "Bilal");
        assert!(prompt.contains("Person: Bilal"));
        assert!(prompt.contains("Upcoming prayer: Asr"));
        assert!(prompt.contains("2026-10-18: Dhuhr"));
    }
}
