use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::str::FromStr;
use tokio::runtime::Runtime;

use crate::config::AppConfig;
use crate::guidance::GuidanceClient;
use crate::location::{resolve, source_from_config};
use crate::models::{PrayerType, RecommendationKind, School};
use crate::prayer_times::methods::{method_label, CALC_METHODS};
use crate::prayer_times::{seconds_until, TimingClient};
use crate::qibla::bearing::compass_point;
use crate::qibla::relative_turn;
use crate::session::Session;
use crate::utils::format::{format_duration_secs, format_time, progress_bar, wrap_text};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

const WRAP_WIDTH: usize = 72;

// ─── Shared steps ────────────────────────────────────────────────────────────

/// Resolve the location and fetch today's schedule into the session.
fn acquire_schedule(rt: &Runtime, session: &mut Session, config: &AppConfig) -> Result<()> {
    let source = source_from_config(config);
    let fallback = config.location.coordinate();
    let location = rt.block_on(resolve(source.as_ref(), &fallback));

    let Some(request) = session.set_location(location) else {
        return Ok(());
    };
    let client = TimingClient::new(&config.timing).context("Building timing client")?;
    let result = rt
        .block_on(client.fetch(&request.location, request.method, request.school))
        .map_err(|e| e.to_string());
    session.apply_timing(request.seq, result);
    Ok(())
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(rt: &Runtime, session: &mut Session, config: &AppConfig) -> Result<()> {
    acquire_schedule(rt, session, config)?;

    let today = Session::today();
    let now_time = Local::now().time();
    let progress = session.today_progress();
    let place = session
        .location()
        .map(|l| l.label())
        .unwrap_or_else(|| "unknown location".to_string());

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        place,
        today.format("%Y-%m-%d")
    );

    let Some(schedule) = session.schedule() else {
        println!();
        for prayer in PrayerType::ALL {
            println_colored!(DIM, "  {:<10}  {}", prayer.display_name(), format_time(None));
        }
        println!();
        println_colored!(
            RED,
            "  No schedule available: {}",
            session.schedule_error().unwrap_or("unknown error")
        );
        println!();
        return Ok(());
    };

    if let Some(hijri) = &schedule.hijri {
        println_colored!(AMBER, "  {}", hijri.long_form());
    }
    println!();

    let next = session.next_prayer_at(now_time);
    for (name, time) in schedule.all_marks() {
        let prayer = PrayerType::from_str(name).ok();
        let done = prayer.map(|p| progress.prayers.get(p)).unwrap_or(false);
        let marker = match prayer {
            Some(_) if done => "✓",
            Some(_) => "○",
            None => " ",
        };
        let line = format!("  {:<10}  {}  {}", name, format_time(Some(time)), marker);
        if prayer.is_some() && prayer == next {
            println_colored!(AMBER, "{}  ← next", line);
        } else if time <= now_time {
            println_colored!(DIM, "{}", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
    }
    if let Some(midnight) = schedule.midnight {
        println_colored!(DIM, "  {:<10}  {}", "Midnight", format_time(Some(midnight)));
    }

    if let Some(next) = next {
        let secs = seconds_until(schedule, next, now_time);
        println!();
        println_colored!(
            AMBER,
            "  Next: {} in {}",
            next.display_name(),
            format_duration_secs(secs)
        );
    }
    println!();
    Ok(())
}

// ─── Mark prayer ─────────────────────────────────────────────────────────────

pub fn handle_mark(session: &mut Session, prayer_str: &str, date: Option<&str>) -> Result<()> {
    let prayer = PrayerType::from_str(prayer_str).map_err(|_| {
        anyhow!(
            "Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha",
            prayer_str
        )
    })?;
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| anyhow!("Invalid date '{}'. Use YYYY-MM-DD", d))?,
        None => Session::today(),
    };

    let performed = session.toggle_on(date, prayer)?;
    if performed {
        println_colored!(
            GREEN,
            "  ✓ {} marked as performed ({})",
            prayer.display_name(),
            date.format("%Y-%m-%d")
        );
    } else {
        println_colored!(
            DIM,
            "  ○ {} unmarked ({})",
            prayer.display_name(),
            date.format("%Y-%m-%d")
        );
    }
    let done = session.progress_on(date).prayers_done();
    println_colored!(DIM, "  {}/5 for the day", done);
    Ok(())
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn handle_history(session: &Session, days: usize) -> Result<()> {
    let recent = session.history().recent(days);

    println!();
    println_colored!(GOLD, "  Consistency — last {} recorded days", days);
    println!();

    if recent.is_empty() {
        println_colored!(DIM, "  Nothing recorded yet. Try `miqat mark fajr`.");
        println!();
        return Ok(());
    }

    for day in &recent {
        let done = day.prayers_done();
        let dots: String = PrayerType::ALL
            .iter()
            .map(|p| if day.prayers.get(*p) { '●' } else { '○' })
            .collect();
        let color = match done {
            5 => GREEN,
            1..=4 => AMBER,
            _ => DIM,
        };
        println_colored!(
            color,
            "  {}  {}  {}  {}  {}/5",
            day.date.format("%a"),
            day.date.format("%Y-%m-%d"),
            progress_bar(done as u32, 5, 10),
            dots,
            done
        );
    }

    let full = recent.iter().filter(|d| d.is_complete()).count();
    println!();
    println_colored!(BOLD, "  Complete days: {}/{}", full, recent.len());
    println!();
    Ok(())
}

// ─── Qibla ───────────────────────────────────────────────────────────────────

pub fn handle_qibla(
    rt: &Runtime,
    session: &mut Session,
    config: &AppConfig,
    heading: Option<f64>,
) -> Result<()> {
    let source = source_from_config(config);
    let location = rt.block_on(resolve(source.as_ref(), &config.location.coordinate()));
    session.store_location(location);
    let bearing = session
        .qibla_bearing()
        .ok_or_else(|| anyhow!("No location available"))?;

    println!();
    if let Some(loc) = session.location() {
        println_colored!(
            DIM,
            "  From {} ({:.4}, {:.4})",
            loc.label(),
            loc.latitude,
            loc.longitude
        );
    }
    println_colored!(
        GOLD,
        "  Qibla: {}° {} from true north",
        bearing.round() as i64,
        compass_point(bearing)
    );

    if let Some(h) = heading {
        session.heading().publish(h);
        if let Some(current) = session.heading().latest() {
            let turn = relative_turn(bearing, current);
            let (amount, direction) = if turn <= 180.0 {
                (turn, "clockwise")
            } else {
                (360.0 - turn, "counter-clockwise")
            };
            if amount.round() == 0.0 {
                println_colored!(GREEN, "  You are facing the qibla");
            } else {
                println_colored!(
                    AMBER,
                    "  Turn {}° {}",
                    amount.round() as i64,
                    direction
                );
            }
        }
    }
    println!();
    Ok(())
}

// ─── Guidance ────────────────────────────────────────────────────────────────

pub fn handle_guide(rt: &Runtime, session: &mut Session, config: &AppConfig) -> Result<()> {
    // The upcoming prayer shapes the prompt; a failed fetch just defaults it
    acquire_schedule(rt, session, config)?;

    let client = GuidanceClient::new(&config.guidance).context("Building guidance client")?;
    if !client.is_configured() {
        println_colored!(
            AMBER,
            "  No API key found. Set {} or `guidance.api_key` in {:?}",
            config.guidance.api_key_env,
            AppConfig::config_path()?
        );
        return Ok(());
    }

    let Some(request) = session.begin_guidance() else {
        return Ok(());
    };
    println_colored!(DIM, "  Reflecting on your recent prayers…");
    let recs = rt.block_on(client.fetch(
        &request.history,
        request.next_prayer,
        &request.user_name,
    ));
    session.apply_guidance(request.seq, recs);

    println!();
    if session.guidance().is_empty() {
        println_colored!(
            DIM,
            "  No guidance available right now. Run `miqat guide` again to retry."
        );
        println!();
        return Ok(());
    }

    for rec in session.guidance() {
        let color = match rec.kind {
            RecommendationKind::Dua | RecommendationKind::Verse => GREEN,
            RecommendationKind::Habit => AMBER,
            RecommendationKind::Quote => GOLD,
        };
        println_colored!(color, "  [{}] {}", rec.kind.as_str().to_uppercase(), rec.title);
        if let Some(arabic) = rec.arabic.as_deref().filter(|a| !a.trim().is_empty()) {
            println_colored!(BOLD, "    {}", arabic);
        }
        for line in wrap_text(rec.display_body(), WRAP_WIDTH) {
            println!("    {}", line);
        }
        if let Some(source) = &rec.source {
            println_colored!(DIM, "    — {}", source);
        }
        for line in wrap_text(&format!("Why: {}", rec.reasoning), WRAP_WIDTH) {
            println_colored!(DIM, "    {}", line);
        }
        println!();
    }
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub struct SettingsUpdate<'a> {
    pub name: Option<&'a str>,
    pub method: Option<u8>,
    pub school: Option<&'a str>,
    pub notifications: Option<&'a str>,
    pub reset: bool,
}

fn parse_switch(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("Expected on or off, got '{}'", s)),
    }
}

pub fn handle_settings(session: &mut Session, update: SettingsUpdate<'_>) -> Result<()> {
    if update.reset {
        session.reset_profile()?;
        println_colored!(AMBER, "  Profile and history reset");
    }
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(anyhow!("Name cannot be empty"));
        }
        session.set_name(name)?;
    }
    if let Some(method) = update.method {
        if !CALC_METHODS.iter().any(|(id, _)| *id == method) {
            println_colored!(
                AMBER,
                "  Note: method {} is not in the known list; passing it through as-is",
                method
            );
        }
        session.set_method(method)?;
    }
    if let Some(school) = update.school {
        session.set_school(School::from_str(school)?)?;
    }
    if let Some(flag) = update.notifications {
        session.set_notifications(parse_switch(flag)?)?;
    }

    let profile = session.profile();
    println!();
    println_colored!(GOLD, "  Profile");
    println!();
    println!("  Name:           {}", profile.name);
    println!(
        "  Method:         {} ({})",
        method_label(profile.calculation_method),
        profile.calculation_method
    );
    println!("  School:         {}", profile.school.display_name());
    println!(
        "  Notifications:  {}",
        if profile.notifications_enabled { "on" } else { "off" }
    );
    println!("  Days recorded:  {}", profile.history.len());
    println!();
    Ok(())
}

// ─── Methods & config ────────────────────────────────────────────────────────

pub fn handle_methods(session: &Session) -> Result<()> {
    let current = session.profile().calculation_method;
    println!();
    println_colored!(GOLD, "  Calculation methods");
    println!();
    for (id, name) in CALC_METHODS {
        if *id == current {
            println_colored!(GREEN, "  {:>3}  {}  ← current", id, name);
        } else {
            println!("  {:>3}  {}", id, name);
        }
    }
    println!();
    Ok(())
}

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init && !path.exists() {
        config.save()?;
        println_colored!(GREEN, "  ✓ Wrote {:?}", path);
    }
    println!();
    println_colored!(GOLD, "  Config: {:?}", path);
    if !path.exists() {
        println_colored!(DIM, "  (not created yet; showing defaults)");
    }
    println!();
    let mut shown = config.clone();
    if shown.guidance.api_key.is_some() {
        shown.guidance.api_key = Some("********".to_string());
    }
    for line in shown.to_toml()?.lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches() {
        assert!(parse_switch("ON").unwrap());
        assert!(!parse_switch("off").unwrap());
        assert!(parse_switch("maybe").is_err());
    }
}
