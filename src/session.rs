use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveTime};
use log::{debug, info, warn};
use rusqlite::Connection;

use crate::db::repository::ProfileRepo;
use crate::models::{Coordinate, DailyProgress, History, PrayerType, Profile, Recommendation, School};
use crate::prayer_times::{next_prayer, DailySchedule};
use crate::qibla::{qibla_bearing, HeadingFeed};

/// Screens of the companion. Only entering `Guidance` has side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Today,
    Progress,
    Guidance,
    Qibla,
}

impl View {
    pub const ALL: [View; 4] = [View::Today, View::Progress, View::Guidance, View::Qibla];

    pub fn title(&self) -> &'static str {
        match self {
            View::Today => "Today",
            View::Progress => "Progress",
            View::Guidance => "Guidance",
            View::Qibla => "Qibla",
        }
    }
}

/// Hands out increasing sequence numbers; only the latest one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Everything needed to run one timing fetch off the session thread.
#[derive(Debug, Clone)]
pub struct TimingRequest {
    pub seq: u64,
    pub location: Coordinate,
    pub method: u8,
    pub school: School,
}

/// Everything needed to run one guidance fetch off the session thread.
#[derive(Debug, Clone)]
pub struct GuidanceRequest {
    pub seq: u64,
    pub history: History,
    pub next_prayer: PrayerType,
    pub user_name: String,
}

/// The single owner of user state for one run of the program.
///
/// Every mutation of the profile is followed by an explicit save.
pub struct Session {
    conn: Connection,
    profile: Profile,
    location: Option<Coordinate>,
    schedule: Option<DailySchedule>,
    schedule_error: Option<String>,
    timing_requests: RequestTracker,
    guidance: Vec<Recommendation>,
    guidance_busy: bool,
    guidance_requests: RequestTracker,
    view: View,
    heading: HeadingFeed,
}

impl Session {
    pub fn open(conn: Connection) -> Result<Self> {
        let profile = ProfileRepo::load(&conn)?;
        info!(
            "Session opened for {} ({} days of history)",
            profile.name,
            profile.history.len()
        );
        Ok(Self {
            conn,
            profile,
            location: None,
            schedule: None,
            schedule_error: None,
            timing_requests: RequestTracker::default(),
            guidance: Vec::new(),
            guidance_busy: false,
            guidance_requests: RequestTracker::default(),
            view: View::Today,
            heading: HeadingFeed::new(),
        })
    }

    fn save(&self) -> Result<()> {
        ProfileRepo::save(&self.conn, &self.profile)
    }

    // ─── Profile ─────────────────────────────────────────────────────────────

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn history(&self) -> &History {
        &self.profile.history
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.profile.name = name.trim().to_string();
        self.save()
    }

    pub fn set_notifications(&mut self, enabled: bool) -> Result<()> {
        self.profile.notifications_enabled = enabled;
        self.save()
    }

    /// Changes the method and, when a location is known, asks for a refetch.
    pub fn set_method(&mut self, method: u8) -> Result<Option<TimingRequest>> {
        if self.profile.calculation_method == method {
            return Ok(None);
        }
        self.profile.calculation_method = method;
        self.save()?;
        Ok(self.issue_timing())
    }

    pub fn set_school(&mut self, school: School) -> Result<Option<TimingRequest>> {
        if self.profile.school == school {
            return Ok(None);
        }
        self.profile.school = school;
        self.save()?;
        Ok(self.issue_timing())
    }

    pub fn reset_profile(&mut self) -> Result<()> {
        ProfileRepo::clear(&self.conn)?;
        self.profile = Profile::default();
        Ok(())
    }

    // ─── Daily progress ──────────────────────────────────────────────────────

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn progress_on(&self, date: NaiveDate) -> DailyProgress {
        self.profile.history.get_or_default(date)
    }

    pub fn today_progress(&self) -> DailyProgress {
        self.progress_on(Self::today())
    }

    /// Flip `prayer` on `date` and persist. Returns the new flag.
    pub fn toggle_on(&mut self, date: NaiveDate, prayer: PrayerType) -> Result<bool> {
        let now = self.profile.history.toggle(date, prayer);
        debug!("{} on {} -> {}", prayer, date, now);
        if let Err(e) = self.save() {
            // keep memory in step with what is on disk
            self.profile.history.toggle(date, prayer);
            return Err(e);
        }
        Ok(now)
    }

    pub fn toggle_today(&mut self, prayer: PrayerType) -> Result<bool> {
        self.toggle_on(Self::today(), prayer)
    }

    // ─── Location & schedule ─────────────────────────────────────────────────

    pub fn location(&self) -> Option<&Coordinate> {
        self.location.as_ref()
    }

    pub fn set_location(&mut self, location: Coordinate) -> Option<TimingRequest> {
        self.store_location(location);
        self.issue_timing()
    }

    /// Record the position without asking for a new schedule.
    pub fn store_location(&mut self, location: Coordinate) {
        self.location = Some(location);
    }

    /// A new timing fetch that supersedes any still in flight.
    pub fn issue_timing(&mut self) -> Option<TimingRequest> {
        let location = self.location.clone()?;
        let seq = self.timing_requests.issue();
        Some(TimingRequest {
            seq,
            location,
            method: self.profile.calculation_method,
            school: self.profile.school,
        })
    }

    /// Accept a timing result if it answers the latest request.
    pub fn apply_timing(&mut self, seq: u64, result: Result<DailySchedule, String>) -> bool {
        if !self.timing_requests.is_current(seq) {
            debug!("Discarding stale timing response #{}", seq);
            return false;
        }
        match result {
            Ok(schedule) => {
                self.schedule = Some(schedule);
                self.schedule_error = None;
            }
            Err(e) => {
                warn!("No schedule available: {}", e);
                self.schedule = None;
                self.schedule_error = Some(e);
            }
        }
        true
    }

    pub fn schedule(&self) -> Option<&DailySchedule> {
        self.schedule.as_ref()
    }

    pub fn schedule_error(&self) -> Option<&str> {
        self.schedule_error.as_deref()
    }

    pub fn next_prayer_at(&self, now: NaiveTime) -> Option<PrayerType> {
        self.schedule.as_ref().map(|s| next_prayer(s, now))
    }

    pub fn next_prayer(&self) -> Option<PrayerType> {
        self.next_prayer_at(Local::now().time())
    }

    // ─── Guidance ────────────────────────────────────────────────────────────

    pub fn guidance(&self) -> &[Recommendation] {
        &self.guidance
    }

    pub fn guidance_busy(&self) -> bool {
        self.guidance_busy
    }

    /// Start a guidance fetch unless one is already outstanding.
    pub fn begin_guidance(&mut self) -> Option<GuidanceRequest> {
        if self.guidance_busy {
            debug!("Guidance request already in flight");
            return None;
        }
        self.guidance_busy = true;
        Some(GuidanceRequest {
            seq: self.guidance_requests.issue(),
            history: self.profile.history.clone(),
            next_prayer: self.next_prayer().unwrap_or(PrayerType::Dhuhr),
            user_name: self.profile.name.clone(),
        })
    }

    pub fn apply_guidance(&mut self, seq: u64, recommendations: Vec<Recommendation>) -> bool {
        if !self.guidance_requests.is_current(seq) {
            debug!("Discarding stale guidance response #{}", seq);
            return false;
        }
        self.guidance = recommendations;
        self.guidance_busy = false;
        true
    }

    // ─── Views ───────────────────────────────────────────────────────────────

    pub fn view(&self) -> View {
        self.view
    }

    /// Switch screens. Arriving at guidance with nothing held starts a fetch.
    pub fn enter_view(&mut self, view: View) -> Option<GuidanceRequest> {
        let arriving = self.view != view;
        self.view = view;
        if arriving && view == View::Guidance && self.guidance.is_empty() {
            return self.begin_guidance();
        }
        None
    }

    // ─── Qibla ───────────────────────────────────────────────────────────────

    pub fn heading(&self) -> &HeadingFeed {
        &self.heading
    }

    pub fn qibla_bearing(&self) -> Option<f64> {
        self.location.as_ref().map(qibla_bearing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::RecommendationKind;
    use crate::prayer_times::schedule::sample_schedule;

    fn session() -> Session {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        Session::open(conn).unwrap()
    }

    fn stored(session: &Session) -> Profile {
        ProfileRepo::load(&session.conn).unwrap()
    }

    fn rec(title: &str) -> Recommendation {
        Recommendation {
            kind: RecommendationKind::Habit,
            title: title.to_string(),
            content: "c".to_string(),
            arabic: None,
            translation: None,
            source: None,
            reasoning: "r".to_string(),
        }
    }

    #[test]
    fn tracker_only_accepts_latest() {
        let mut t = RequestTracker::default();
        let a = t.issue();
        let b = t.issue();
        assert!(b > a);
        assert!(!t.is_current(a));
        assert!(t.is_current(b));
    }

    #[test]
    fn toggle_persists_immediately() {
        let mut s = session();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(s.toggle_on(day, PrayerType::Maghrib).unwrap());
        let saved = stored(&s);
        assert_eq!(saved.history.len(), 1);
        assert!(saved.history.get(day).unwrap().prayers.maghrib);

        assert!(!s.toggle_on(day, PrayerType::Maghrib).unwrap());
        assert!(!stored(&s).history.get(day).unwrap().prayers.maghrib);
        assert_eq!(stored(&s).history.len(), 1);
    }

    #[test]
    fn viewing_a_day_does_not_create_it() {
        let s = session();
        assert_eq!(s.today_progress().prayers_done(), 0);
        assert!(s.history().is_empty());
    }

    #[test]
    fn no_timing_request_without_location() {
        let mut s = session();
        assert!(s.issue_timing().is_none());
        assert!(s.set_method(3).unwrap().is_none());
        assert_eq!(stored(&s).calculation_method, 3);
    }

    #[test]
    fn settings_change_reissues_timing() {
        let mut s = session();
        let first = s.set_location(Coordinate::new(51.5, -0.1)).unwrap();
        let second = s.set_school(School::Hanafi).unwrap().unwrap();
        assert!(second.seq > first.seq);
        assert_eq!(second.school, School::Hanafi);
        // unchanged value is a no-op
        assert!(s.set_school(School::Hanafi).unwrap().is_none());
    }

    #[test]
    fn stale_timing_response_is_discarded() {
        let mut s = session();
        let old = s.set_location(Coordinate::new(51.5, -0.1)).unwrap();
        let new = s.set_location(Coordinate::new(40.7, -74.0)).unwrap();

        assert!(s.apply_timing(new.seq, Ok(sample_schedule())));
        assert!(!s.apply_timing(old.seq, Err("late failure".to_string())));
        assert!(s.schedule().is_some());
        assert!(s.schedule_error().is_none());
    }

    #[test]
    fn failed_timing_clears_schedule() {
        let mut s = session();
        let r1 = s.set_location(Coordinate::new(51.5, -0.1)).unwrap();
        s.apply_timing(r1.seq, Ok(sample_schedule()));
        let r2 = s.issue_timing().unwrap();
        s.apply_timing(r2.seq, Err("HTTP 500".to_string()));
        assert!(s.schedule().is_none());
        assert_eq!(s.schedule_error(), Some("HTTP 500"));
        assert_eq!(s.next_prayer_at(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), None);
    }

    #[test]
    fn next_prayer_follows_schedule() {
        let mut s = session();
        let r = s.set_location(Coordinate::new(51.5, -0.1)).unwrap();
        s.apply_timing(r.seq, Ok(sample_schedule()));
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(s.next_prayer_at(at(13, 0)), Some(PrayerType::Asr));
        assert_eq!(s.next_prayer_at(at(20, 0)), Some(PrayerType::Fajr));
    }

    #[test]
    fn guidance_is_gated_while_busy() {
        let mut s = session();
        let req = s.begin_guidance().unwrap();
        assert!(s.guidance_busy());
        assert!(s.begin_guidance().is_none());
        assert_eq!(req.next_prayer, PrayerType::Dhuhr);
        assert_eq!(req.user_name, "Guest");

        assert!(s.apply_guidance(req.seq, vec![rec("a")]));
        assert!(!s.guidance_busy());
        assert_eq!(s.guidance().len(), 1);
    }

    #[test]
    fn entering_guidance_autoloads_once() {
        let mut s = session();
        let req = s.enter_view(View::Guidance).unwrap();
        // staying on the view does not trigger again
        assert!(s.enter_view(View::Guidance).is_none());
        s.apply_guidance(req.seq, vec![rec("a"), rec("b")]);

        s.enter_view(View::Today);
        assert!(s.enter_view(View::Guidance).is_none(), "already holding guidance");
    }

    #[test]
    fn empty_guidance_retriggers_on_next_visit() {
        let mut s = session();
        let req = s.enter_view(View::Guidance).unwrap();
        s.apply_guidance(req.seq, Vec::new());
        s.enter_view(View::Qibla);
        assert!(s.enter_view(View::Guidance).is_some());
    }

    #[test]
    fn qibla_needs_a_location() {
        let mut s = session();
        assert!(s.qibla_bearing().is_none());
        s.set_location(Coordinate::new(51.5074, -0.1278));
        let b = s.qibla_bearing().unwrap();
        assert!((b - 118.99).abs() < 0.5);
    }

    #[test]
    fn profile_edits_are_saved() {
        let mut s = session();
        s.set_name("  Zaynab ").unwrap();
        s.set_notifications(false).unwrap();
        let saved = stored(&s);
        assert_eq!(saved.name, "Zaynab");
        assert!(!saved.notifications_enabled);

        s.reset_profile().unwrap();
        assert_eq!(stored(&s), Profile::default());
        assert_eq!(s.profile(), &Profile::default());
    }

    #[test]
    fn failed_save_rolls_back_toggle() {
        let mut s = session();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        s.toggle_on(day, PrayerType::Fajr).unwrap();
        s.conn.execute("DROP TABLE app_meta", []).unwrap();

        assert!(s.toggle_on(day, PrayerType::Asr).is_err());
        let day_record = s.progress_on(day);
        assert!(day_record.prayers.get(PrayerType::Fajr));
        assert!(!day_record.prayers.get(PrayerType::Asr));
    }

    #[test]
    fn storing_a_location_issues_no_request() {
        let mut s = session();
        s.store_location(Coordinate::new(51.5074, -0.1278));
        assert!(s.qibla_bearing().is_some());
        // the first real request still gets the first sequence number
        let req = s.issue_timing().unwrap();
        assert_eq!(req.seq, 1);
        assert!(s.apply_timing(req.seq, Ok(sample_schedule())));
    }
}
