use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::models::UserProfile;

const USER_DATA_KEY: &str = "user_data";
const SESSION_COOKIE_KEY: &str = "session_cookie";

/// Marker stored in place of a profile after logout.
const ABSENT: &str = "false";

/// Local key-value store for the session cache.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<(String, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM kv WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        if profile.is_empty() {
            return self.clear_profile();
        }
        let json = serde_json::to_string(profile)?;
        self.put(USER_DATA_KEY, &json)
    }

    /// The cached profile, or `None` when nothing usable is stored.
    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        let Some((value, _)) = self.get(USER_DATA_KEY)? else {
            return Ok(None);
        };
        if value == ABSENT {
            return Ok(None);
        }

        match serde_json::from_str::<UserProfile>(&value) {
            Ok(profile) if !profile.is_empty() => Ok(Some(profile)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached profile: {}", e);
                Ok(None)
            }
        }
    }

    pub fn clear_profile(&self) -> Result<()> {
        self.put(USER_DATA_KEY, ABSENT)
    }

    pub fn profile_cached_at(&self) -> Result<Option<DateTime<Utc>>> {
        let cached_at = self.get(USER_DATA_KEY)?.and_then(|(value, updated_at)| {
            if value == ABSENT {
                return None;
            }
            DateTime::parse_from_rfc3339(&updated_at)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });
        Ok(cached_at)
    }

    pub fn save_session_cookie(&self, cookie: &str) -> Result<()> {
        self.put(SESSION_COOKIE_KEY, cookie)
    }

    pub fn session_cookie(&self) -> Result<Option<String>> {
        Ok(self.get(SESSION_COOKIE_KEY)?.map(|(value, _)| value))
    }

    pub fn clear_session_cookie(&self) -> Result<()> {
        self.delete(SESSION_COOKIE_KEY)
    }
}
