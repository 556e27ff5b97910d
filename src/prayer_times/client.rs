use std::collections::HashMap;

use chrono::{NaiveTime, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::settings::TimingConfig;
use crate::error::FetchError;
use crate::http::build_http_client;
use crate::models::{Coordinate, School};
use crate::prayer_times::schedule::{DailySchedule, HijriDate};

/// Client for the remote prayer-timing service.
pub struct TimingClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    status: Value,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
    #[serde(default)]
    date: Option<DateBlock>,
}

#[derive(Debug, Deserialize)]
struct DateBlock {
    #[serde(default)]
    readable: Option<String>,
    #[serde(default)]
    hijri: Option<HijriBlock>,
}

#[derive(Debug, Deserialize)]
struct HijriBlock {
    day: String,
    month: MonthBlock,
    year: String,
    #[serde(default)]
    weekday: Option<WeekdayBlock>,
}

#[derive(Debug, Deserialize)]
struct MonthBlock {
    number: u32,
    en: String,
    #[serde(default)]
    ar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeekdayBlock {
    en: String,
}

impl TimingClient {
    pub fn new(config: &TimingConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config.timeout())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Today's schedule at `location`.
    pub async fn fetch(
        &self,
        location: &Coordinate,
        method: u8,
        school: School,
    ) -> Result<DailySchedule, FetchError> {
        self.fetch_at(location, method, school, Utc::now().timestamp())
            .await
    }

    /// Schedule for the local day containing `timestamp` (unix seconds).
    pub async fn fetch_at(
        &self,
        location: &Coordinate,
        method: u8,
        school: School,
        timestamp: i64,
    ) -> Result<DailySchedule, FetchError> {
        let url = format!("{}/timings/{}", self.base_url, timestamp);
        info!(
            "Fetching prayer times for {:.4},{:.4} (method {}, school {})",
            location.latitude,
            location.longitude,
            method,
            school.id()
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("method", method.to_string()),
                ("school", school.id().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Prayer time request failed: {}", e);
                FetchError::Transport(e)
            })?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            error!("Prayer time service returned {}: {}", status, text);
            return Err(FetchError::status(status.as_u16(), &text));
        }

        let schedule = parse_timings(&text)?;
        debug!("Received schedule: {:?}", schedule);
        Ok(schedule)
    }
}

/// Normalise a timing-service payload into a [`DailySchedule`].
pub fn parse_timings(body: &str) -> Result<DailySchedule, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        let status = match &envelope.status {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return Err(FetchError::Service {
            code: envelope.code,
            status,
        });
    }

    let data: TimingsData = serde_json::from_value(envelope.data)?;
    let required = |name: &str| -> Result<NaiveTime, FetchError> {
        let raw = data
            .timings
            .get(name)
            .ok_or_else(|| FetchError::Parse(format!("missing timing '{}'", name)))?;
        parse_clock(raw)
    };
    let optional = |name: &str| data.timings.get(name).and_then(|raw| parse_clock(raw).ok());

    let (hijri, readable_date) = match data.date {
        Some(date) => (date.hijri.map(convert_hijri).transpose()?, date.readable),
        None => (None, None),
    };

    Ok(DailySchedule {
        fajr: required("Fajr")?,
        dhuhr: required("Dhuhr")?,
        asr: required("Asr")?,
        maghrib: required("Maghrib")?,
        isha: required("Isha")?,
        sunrise: optional("Sunrise"),
        imsak: optional("Imsak"),
        sunset: optional("Sunset"),
        midnight: optional("Midnight"),
        hijri,
        readable_date,
    })
}

/// "05:12" or "05:12 (BST)" → 05:12.
fn parse_clock(raw: &str) -> Result<NaiveTime, FetchError> {
    let token = raw.split_whitespace().next().unwrap_or("");
    NaiveTime::parse_from_str(token, "%H:%M")
        .map_err(|e| FetchError::Parse(format!("bad time '{}': {}", raw, e)))
}

fn convert_hijri(block: HijriBlock) -> Result<HijriDate, FetchError> {
    let day = block
        .day
        .trim()
        .parse()
        .map_err(|_| FetchError::Parse(format!("bad hijri day '{}'", block.day)))?;
    let year = block
        .year
        .trim()
        .parse()
        .map_err(|_| FetchError::Parse(format!("bad hijri year '{}'", block.year)))?;
    Ok(HijriDate {
        day,
        month: block.month.number,
        month_name: block.month.en,
        month_name_ar: block.month.ar,
        year,
        weekday: block.weekday.map(|w| w.en),
    })
}
