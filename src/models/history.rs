use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{DailyProgress, PrayerFlags, PrayerType};

/// Daily progress records keyed by calendar day, in first-seen order.
///
/// At most one record exists per day: writes to a known day update it in
/// place, writes to a new day append. On the wire this is a plain array of
/// records; duplicate days in stored data collapse onto the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DailyProgress>", into = "Vec<DailyProgress>")]
pub struct History {
    days: IndexMap<NaiveDate, PrayerFlags>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<DailyProgress> {
        self.days.get(&date).map(|prayers| DailyProgress {
            date,
            prayers: *prayers,
        })
    }

    /// The stored record for `date`, or an all-unmarked one. Never inserts.
    pub fn get_or_default(&self, date: NaiveDate) -> DailyProgress {
        self.get(date).unwrap_or_else(|| DailyProgress::new(date))
    }

    pub fn upsert(&mut self, record: DailyProgress) {
        self.days.insert(record.date, record.prayers);
    }

    /// Flip one prayer for `date` and commit the record. Returns the new flag.
    pub fn toggle(&mut self, date: NaiveDate, prayer: PrayerType) -> bool {
        let mut record = self.get_or_default(date);
        let now = record.prayers.toggle(prayer);
        self.upsert(record);
        now
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<DailyProgress> {
        let skip = self.days.len().saturating_sub(n);
        self.iter().skip(skip).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = DailyProgress> + '_ {
        self.days.iter().map(|(date, prayers)| DailyProgress {
            date: *date,
            prayers: *prayers,
        })
    }
}

impl From<Vec<DailyProgress>> for History {
    fn from(records: Vec<DailyProgress>) -> Self {
        let mut history = History::new();
        for record in records {
            history.upsert(record);
        }
        history
    }
}

impl From<History> for Vec<DailyProgress> {
    fn from(history: History) -> Self {
        history.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn lookup_of_unknown_day_does_not_insert() {
        let history = History::new();
        let record = history.get_or_default(day(1));
        assert_eq!(record.prayers_done(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn first_toggle_creates_exactly_one_record() {
        let mut history = History::new();
        assert!(history.toggle(day(3), PrayerType::Fajr));
        assert_eq!(history.len(), 1);
        let record = history.get(day(3)).unwrap();
        assert_eq!(record.prayers.completed(), vec![PrayerType::Fajr]);
    }

    #[test]
    fn double_toggle_restores_flag_without_duplicating_day() {
        let mut history = History::new();
        history.toggle(day(3), PrayerType::Isha);
        history.toggle(day(3), PrayerType::Isha);
        assert_eq!(history.len(), 1);
        assert!(!history.get(day(3)).unwrap().prayers.isha);
    }

    #[test]
    fn update_keeps_position_of_existing_day() {
        let mut history = History::new();
        history.toggle(day(1), PrayerType::Fajr);
        history.toggle(day(2), PrayerType::Fajr);
        history.toggle(day(1), PrayerType::Asr);
        let dates: Vec<_> = history.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2)]);
    }

    #[test]
    fn recent_slices_the_tail_in_order() {
        let mut history = History::new();
        for d in 1..=9 {
            history.toggle(day(d), PrayerType::Dhuhr);
        }
        let dates: Vec<_> = history.recent(3).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(7), day(8), day(9)]);
    }

    #[test]
    fn recent_on_short_history_returns_everything() {
        let mut history = History::new();
        history.toggle(day(5), PrayerType::Fajr);
        history.toggle(day(4), PrayerType::Fajr);
        let all: Vec<_> = history.iter().collect();
        assert_eq!(history.recent(7), all);
    }

    #[test]
    fn duplicate_days_in_stored_array_collapse() {
        let json = r#"[
            {"date":"2026-10-01","prayers":{"Fajr":true,"Dhuhr":false,"Asr":false,"Maghrib":false,"Isha":false}},
            {"date":"2026-10-02","prayers":{"Fajr":false,"Dhuhr":false,"Asr":false,"Maghrib":false,"Isha":false}},
            {"date":"2026-10-01","prayers":{"Fajr":true,"Dhuhr":true,"Asr":false,"Maghrib":false,"Isha":false}}
        ]"#;
        let history: History = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(day(1)).unwrap().prayers_done(), 2);
    }
}
