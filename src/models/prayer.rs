use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five obligatory prayers, in chronological order through the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrayerType {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerType {
    pub const ALL: [PrayerType; 5] = [
        PrayerType::Fajr,
        PrayerType::Dhuhr,
        PrayerType::Asr,
        PrayerType::Maghrib,
        PrayerType::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "fajr",
            PrayerType::Dhuhr => "dhuhr",
            PrayerType::Asr => "asr",
            PrayerType::Maghrib => "maghrib",
            PrayerType::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "Fajr",
            PrayerType::Dhuhr => "Dhuhr",
            PrayerType::Asr => "Asr",
            PrayerType::Maghrib => "Maghrib",
            PrayerType::Isha => "Isha",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            PrayerType::Fajr => 0,
            PrayerType::Dhuhr => 1,
            PrayerType::Asr => 2,
            PrayerType::Maghrib => 3,
            PrayerType::Isha => 4,
        }
    }
}

impl std::fmt::Display for PrayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerType::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerType::Dhuhr),
            "asr" => Ok(PrayerType::Asr),
            "maghrib" => Ok(PrayerType::Maghrib),
            "isha" => Ok(PrayerType::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer type: {}", s)),
        }
    }
}

/// Jurisprudential school; only affects the asr convention on the timing service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum School {
    /// Shafi'i, Hanbali and Maliki share the standard shadow length.
    #[default]
    Standard,
    Hanafi,
}

impl School {
    pub fn id(&self) -> u8 {
        match self {
            School::Standard => 0,
            School::Hanafi => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            School::Standard => "Shafi'i / Hanbali / Maliki",
            School::Hanafi => "Hanafi",
        }
    }
}

impl From<School> for u8 {
    fn from(school: School) -> u8 {
        school.id()
    }
}

impl TryFrom<u8> for School {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(School::Standard),
            1 => Ok(School::Hanafi),
            other => Err(format!("Unknown school id: {}", other)),
        }
    }
}

impl FromStr for School {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "standard" | "shafi" | "shafi'i" | "hanbali" | "maliki" => Ok(School::Standard),
            "1" | "hanafi" => Ok(School::Hanafi),
            _ => Err(anyhow::anyhow!("Unknown school: {}", s)),
        }
    }
}
