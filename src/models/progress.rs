use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PrayerType;

/// Per-day "performed" flags for the five prayers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerFlags {
    #[serde(rename = "Fajr", default)]
    pub fajr: bool,
    #[serde(rename = "Dhuhr", default)]
    pub dhuhr: bool,
    #[serde(rename = "Asr", default)]
    pub asr: bool,
    #[serde(rename = "Maghrib", default)]
    pub maghrib: bool,
    #[serde(rename = "Isha", default)]
    pub isha: bool,
}

impl PrayerFlags {
    pub fn get(&self, prayer: PrayerType) -> bool {
        match prayer {
            PrayerType::Fajr => self.fajr,
            PrayerType::Dhuhr => self.dhuhr,
            PrayerType::Asr => self.asr,
            PrayerType::Maghrib => self.maghrib,
            PrayerType::Isha => self.isha,
        }
    }

    fn slot(&mut self, prayer: PrayerType) -> &mut bool {
        match prayer {
            PrayerType::Fajr => &mut self.fajr,
            PrayerType::Dhuhr => &mut self.dhuhr,
            PrayerType::Asr => &mut self.asr,
            PrayerType::Maghrib => &mut self.maghrib,
            PrayerType::Isha => &mut self.isha,
        }
    }

    pub fn toggle(&mut self, prayer: PrayerType) -> bool {
        let slot = self.slot(prayer);
        *slot = !*slot;
        *slot
    }

    /// Completed prayers in canonical order.
    pub fn completed(&self) -> Vec<PrayerType> {
        PrayerType::ALL
            .into_iter()
            .filter(|p| self.get(*p))
            .collect()
    }

    pub fn count(&self) -> u8 {
        self.completed().len() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub prayers: PrayerFlags,
}

impl DailyProgress {
    /// A fresh record with nothing marked.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            prayers: PrayerFlags::default(),
        }
    }

    pub fn prayers_done(&self) -> u8 {
        self.prayers.count()
    }

    pub fn is_complete(&self) -> bool {
        self.prayers_done() as usize == PrayerType::ALL.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_only_the_named_flag() {
        let mut flags = PrayerFlags::default();
        assert!(flags.toggle(PrayerType::Asr));
        assert_eq!(flags.completed(), vec![PrayerType::Asr]);
        assert!(!flags.toggle(PrayerType::Asr));
        assert_eq!(flags, PrayerFlags::default());
    }

    #[test]
    fn flags_use_capitalised_keys_on_the_wire() {
        let mut flags = PrayerFlags::default();
        flags.toggle(PrayerType::Maghrib);
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["Maghrib"], true);
        assert_eq!(json["Fajr"], false);
    }

    #[test]
    fn complete_day_counts_five() {
        let mut day = DailyProgress::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        for p in PrayerType::ALL {
            day.prayers.toggle(p);
        }
        assert!(day.is_complete());
        assert_eq!(day.prayers_done(), 5);
    }
}
