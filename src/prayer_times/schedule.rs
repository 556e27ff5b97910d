use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::PrayerType;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Islamic calendar date as reported alongside the timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HijriDate {
    pub day: u32,
    pub month: u32,
    pub month_name: String,
    pub month_name_ar: Option<String>,
    pub year: i32,
    pub weekday: Option<String>,
}

impl HijriDate {
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name, self.year)
    }

    /// `formatted` with the weekday in front and the arabic month name after.
    pub fn long_form(&self) -> String {
        let mut text = self.formatted();
        if let Some(weekday) = &self.weekday {
            text = format!("{}, {}", weekday, text);
        }
        if let Some(ar) = &self.month_name_ar {
            text.push_str(" · ");
            text.push_str(ar);
        }
        text
    }
}

/// One day's prayer times in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
    pub sunrise: Option<NaiveTime>,
    pub imsak: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub midnight: Option<NaiveTime>,
    pub hijri: Option<HijriDate>,
    /// Gregorian date as the service printed it, e.g. "19 Oct 2026".
    pub readable_date: Option<String>,
}

impl DailySchedule {
    pub fn time(&self, prayer: PrayerType) -> NaiveTime {
        match prayer {
            PrayerType::Fajr => self.fajr,
            PrayerType::Dhuhr => self.dhuhr,
            PrayerType::Asr => self.asr,
            PrayerType::Maghrib => self.maghrib,
            PrayerType::Isha => self.isha,
        }
    }

    /// The five prayers in canonical order with their times.
    pub fn prayers(&self) -> [(PrayerType, NaiveTime); 5] {
        PrayerType::ALL.map(|p| (p, self.time(p)))
    }

    /// Every named mark for display, sunrise etc. included, sorted by time.
    pub fn all_marks(&self) -> Vec<(&'static str, NaiveTime)> {
        let mut marks: Vec<(&'static str, NaiveTime)> = self
            .prayers()
            .iter()
            .map(|(p, t)| (p.display_name(), *t))
            .collect();
        let extras = [
            ("Imsak", self.imsak),
            ("Sunrise", self.sunrise),
            ("Sunset", self.sunset),
        ];
        marks.extend(extras.into_iter().filter_map(|(n, t)| t.map(|t| (n, t))));
        marks.sort_by_key(|(_, t)| *t);
        marks
    }
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// First prayer whose time is strictly after `now` (minute resolution).
///
/// A prayer whose minute equals `now` has already begun and is skipped.
/// After Isha this wraps to Fajr, meaning tomorrow's.
pub fn next_prayer(schedule: &DailySchedule, now: NaiveTime) -> PrayerType {
    let now_min = minute_of_day(now);
    schedule
        .prayers()
        .into_iter()
        .find(|(_, t)| minute_of_day(*t) > now_min)
        .map(|(p, _)| p)
        .unwrap_or(PrayerType::Fajr)
}

/// Seconds from `now` until `prayer` next occurs.
///
/// Times already passed today are assumed to recur at the same clock time
/// tomorrow, which is close enough for a countdown.
pub fn seconds_until(schedule: &DailySchedule, prayer: PrayerType, now: NaiveTime) -> i64 {
    let diff = schedule
        .time(prayer)
        .signed_duration_since(now)
        .num_seconds();
    if diff > 0 { diff } else { diff + SECS_PER_DAY }
}

#[cfg(test)]
pub(crate) fn sample_schedule() -> DailySchedule {
    let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    DailySchedule {
        fajr: t(5, 0),
        dhuhr: t(12, 30),
        asr: t(15, 45),
        maghrib: t(18, 10),
        isha: t(19, 40),
        sunrise: Some(t(6, 40)),
        imsak: Some(t(4, 50)),
        sunset: Some(t(18, 8)),
        midnight: None,
        hijri: None,
        readable_date: None,
    }
}
