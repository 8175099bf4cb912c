use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::config::AppConfig;
use crate::models::CyclingEvent;
use crate::utils;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open_default() -> rusqlite::Result<Self> {
        let path = AppConfig::load().database_path();
        utils::ensure_parent(&path);
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_at(path: &Path) -> rusqlite::Result<Self> {
        utils::ensure_parent(path);
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        // The UNIQUE indexes double as the race backstop for concurrent runs:
        // a check-then-insert that loses the race degrades into a skip.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                title_norm TEXT NOT NULL,
                event_type TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                duration_days INTEGER NOT NULL,
                location TEXT,
                country TEXT NOT NULL,
                source TEXT NOT NULL,
                source_url TEXT,
                source_url_norm TEXT,
                payload TEXT NOT NULL,
                first_seen_utc TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_events_identity
                ON events(title_norm, start_date, source);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_events_source_url
                ON events(source_url_norm)
                WHERE source_url_norm IS NOT NULL;",
        )?;
        Ok(())
    }

    /// Existence check by dedup key: a normalized source URL alone is a
    /// sufficient match; otherwise the (title, start date, source) composite.
    pub fn contains(&self, event: &CyclingEvent) -> rusqlite::Result<bool> {
        if let Some(url_norm) = event.source_url.as_deref().and_then(normalize_url) {
            let hit: Option<i64> = self
                .conn
                .query_row(
                    "SELECT 1 FROM events WHERE source_url_norm = ?1",
                    params![url_norm],
                    |row| row.get(0),
                )
                .optional()?;
            if hit.is_some() {
                return Ok(true);
            }
        }

        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM events
                 WHERE title_norm = ?1 AND start_date = ?2 AND source = ?3",
                params![
                    normalize_title(&event.title),
                    event.start_date,
                    event.source
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// Inserts one record; returns false when a unique index already holds the
    /// dedup key (another run got there first).
    pub fn insert_event(&self, event: &CyclingEvent) -> rusqlite::Result<bool> {
        let payload = serde_json::to_string(event).expect("event serialization");
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "INSERT INTO events (
                id, title, title_norm, event_type, start_date, end_date,
                duration_days, location, country, source, source_url,
                source_url_norm, payload, first_seen_utc
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT DO NOTHING",
            params![
                dedup_id(event),
                event.title,
                normalize_title(&event.title),
                event.event_type.as_str(),
                event.start_date,
                event.end_date,
                event.duration_days(),
                event.location,
                event.country,
                event.source,
                event.source_url,
                event.source_url.as_deref().and_then(normalize_url),
                payload,
                now,
            ],
        )?;
        Ok(changed > 0)
    }

    /// The upsert gate: per-record check-then-insert with precise accounting.
    /// Returns (inserted, skipped); a duplicate is a counted outcome, not an
    /// error.
    pub fn filter_and_persist(
        &self,
        records: &[CyclingEvent],
    ) -> rusqlite::Result<(usize, usize)> {
        let mut inserted = 0;
        let mut skipped = 0;
        for event in records {
            if self.contains(event)? || !self.insert_event(event)? {
                log::info!("duplicate, skipping: {} ({})", event.title, event.source);
                skipped += 1;
            } else {
                log::info!("inserted: {} ({})", event.title, event.source);
                inserted += 1;
            }
        }
        Ok((inserted, skipped))
    }

    pub fn count_events(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
    }

    pub fn list_events(&self) -> rusqlite::Result<Vec<CyclingEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM events ORDER BY start_date")?;
        let rows = stmt.query_map([], |row| {
            let payload: String = row.get(0)?;
            let event: CyclingEvent = serde_json::from_str(&payload).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    payload.len(),
                    rusqlite::types::Type::Text,
                    Box::new(err),
                )
            })?;
            Ok(event)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Case-insensitive, trimmed, internal whitespace collapsed. Keeps titles
/// differing only in formatting from inserting twice.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Comparable form of a listing URL: scheme and host lowercased, query string,
/// fragment, and trailing slashes dropped. The path keeps its case.
pub fn normalize_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut parsed = reqwest::Url::parse(trimmed).ok()?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    let mut out = parsed.to_string();
    while out.ends_with('/') && !out.ends_with("://") {
        out.pop();
    }
    Some(out)
}

fn dedup_id(event: &CyclingEvent) -> String {
    let mut hasher = Sha256::new();
    match event.source_url.as_deref().and_then(normalize_url) {
        Some(url_norm) => hasher.update(url_norm.as_bytes()),
        None => {
            hasher.update(normalize_title(&event.title).as_bytes());
            hasher.update(b"|");
            hasher.update(event.start_date.to_string().as_bytes());
            hasher.update(b"|");
            hasher.update(event.source.as_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDraft, EventType};
    use chrono::NaiveDate;

    fn event(title: &str, source_url: Option<&str>) -> CyclingEvent {
        let mut draft = EventDraft::new("alpenbrevet");
        draft.title = Some(title.to_string());
        draft.event_type = Some(EventType::Tour);
        draft.start_date = NaiveDate::from_ymd_opt(2026, 8, 29);
        draft.country = Some("Switzerland".to_string());
        draft.source_url = source_url.map(str::to_string);
        draft.build().unwrap()
    }

    #[test]
    fn title_normalization_collapses_case_and_whitespace() {
        for raw in ["Alpen Classic ", "alpen classic", "ALPEN  CLASSIC"] {
            assert_eq!(normalize_title(raw), "alpen classic");
        }
    }

    #[test]
    fn url_normalization_ignores_query_and_trailing_slash() {
        let a = normalize_url("https://alpenbrevet.ch/events/2026/").unwrap();
        let b = normalize_url("https://Alpenbrevet.ch/events/2026?utm_source=x#top").unwrap();
        assert_eq!(a, b);
        assert!(normalize_url("  ").is_none());
    }

    #[test]
    fn formatting_variants_form_one_duplicate_group() {
        let store = Store::open_in_memory().unwrap();
        let (inserted, skipped) = store
            .filter_and_persist(&[
                event("Alpen Classic ", None),
                event("alpen classic", None),
                event("ALPEN CLASSIC", None),
            ])
            .unwrap();
        assert_eq!((inserted, skipped), (1, 2));
        assert_eq!(store.count_events().unwrap(), 1);
    }

    #[test]
    fn source_url_alone_matches_existing_row() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_event(&event("Alpenbrevet 2026", Some("https://alpenbrevet.ch/e/1/")))
            .unwrap();
        // Different title and formatting, same listing URL.
        let dup = event(
            "Alpenbrevet (classic edition)",
            Some("https://alpenbrevet.ch/e/1?ref=newsletter"),
        );
        assert!(store.contains(&dup).unwrap());
    }

    #[test]
    fn second_persist_pass_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let batch = vec![event("Gravel Weekend", None)];
        assert_eq!(store.filter_and_persist(&batch).unwrap(), (1, 0));
        assert_eq!(store.filter_and_persist(&batch).unwrap(), (0, 1));
    }

    #[test]
    fn insert_reports_lost_race_as_skip() {
        let store = Store::open_in_memory().unwrap();
        let e = event("Gravel Weekend", None);
        assert!(store.insert_event(&e).unwrap());
        // Same dedup key straight at the unique index.
        assert!(!store.insert_event(&e).unwrap());
    }

    #[test]
    fn open_at_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "velo-scout-open-at-{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        {
            let store = Store::open_at(&path).unwrap();
            let batch = vec![event("Gravel Weekend", None)];
            assert_eq!(store.filter_and_persist(&batch).unwrap(), (1, 0));
        }
        let reopened = Store::open_at(&path).unwrap();
        let batch = vec![event("Gravel Weekend", None)];
        assert_eq!(reopened.filter_and_persist(&batch).unwrap(), (0, 1));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn round_trips_payload() {
        let store = Store::open_in_memory().unwrap();
        let e = event("Gravel Weekend", Some("https://ridegravel.ch/w/9"));
        store.insert_event(&e).unwrap();
        let listed = store.list_events().unwrap();
        assert_eq!(listed, vec![e]);
    }
}
