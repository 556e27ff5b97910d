use anyhow::{Context, Result};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::Profile;

/// Storage key of the serialized profile.
pub const PROFILE_KEY: &str = "profile";

// ─── Key-value store ─────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        Ok(value)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

pub struct ProfileRepo;

impl ProfileRepo {
    /// The stored profile, or defaults when absent or unreadable.
    pub fn load(conn: &Connection) -> Result<Profile> {
        let Some(raw) = MetaRepo::get(conn, PROFILE_KEY)? else {
            debug!("No stored profile; starting with defaults");
            return Ok(Profile::default());
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!("Stored profile could not be decoded ({}); starting with defaults", e);
                Ok(Profile::default())
            }
        }
    }

    pub fn save(conn: &Connection, profile: &Profile) -> Result<()> {
        let raw = serde_json::to_string(profile).context("Serializing profile")?;
        MetaRepo::set(conn, PROFILE_KEY, &raw)?;
        debug!("Profile saved ({} days of history)", profile.history.len());
        Ok(())
    }

    /// Forget the stored profile; the next load yields defaults.
    pub fn clear(conn: &Connection) -> Result<()> {
        MetaRepo::delete(conn, PROFILE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{PrayerType, School};
    use chrono::NaiveDate;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn absent_profile_loads_defaults() {
        let conn = memory_db();
        assert_eq!(ProfileRepo::load(&conn).unwrap(), Profile::default());
    }

    #[test]
    fn corrupt_profile_loads_defaults() {
        let conn = memory_db();
        MetaRepo::set(&conn, PROFILE_KEY, "{not json").unwrap();
        assert_eq!(ProfileRepo::load(&conn).unwrap(), Profile::default());
    }

    #[test]
    fn save_then_load_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miqat.db");

        let mut profile = Profile::default();
        profile.name = "Hamza".to_string();
        profile.school = School::Hanafi;
        let d = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        profile.history.toggle(d, PrayerType::Fajr);
        profile.history.toggle(d.succ_opt().unwrap(), PrayerType::Isha);

        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            ProfileRepo::save(&conn, &profile).unwrap();
            // second save overwrites rather than duplicating
            ProfileRepo::save(&conn, &profile).unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(ProfileRepo::load(&conn).unwrap(), profile);
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_meta", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn cleared_profile_loads_defaults() {
        let conn = memory_db();
        let mut profile = Profile::default();
        profile.name = "Maryam".to_string();
        ProfileRepo::save(&conn, &profile).unwrap();
        ProfileRepo::clear(&conn).unwrap();
        assert_eq!(MetaRepo::get(&conn, PROFILE_KEY).unwrap(), None);
        assert_eq!(ProfileRepo::load(&conn).unwrap(), Profile::default());
    }

    #[test]
    fn meta_delete_removes_key() {
        let conn = memory_db();
        MetaRepo::set(&conn, "k", "v").unwrap();
        MetaRepo::delete(&conn, "k").unwrap();
        assert_eq!(MetaRepo::get(&conn, "k").unwrap(), None);
    }
}
