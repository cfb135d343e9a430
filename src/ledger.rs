//! Ledger operations
//!
//! Provides the four ledger commands on top of the store:
//! - `add`: validate input, resolve names, append one touchpoint
//! - `list`: most recent touchpoints
//! - `stats`: touchpoint volume per channel inside a window
//! - `gaps`: scholars without a touchpoint inside a window

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::{
    ChannelStats, EntityTable, GapReport, LoggedTouchpoint, NewTouchpoint, TouchpointRecord,
};
use crate::storage::{PgStore, ResolvedTouchpoint};
use crate::{Error, Result};

pub const DEFAULT_LIST_LIMIT: u32 = 20;
pub const DEFAULT_STATS_DAYS: u32 = 30;
pub const DEFAULT_GAP_DAYS: u32 = 14;

/// Date format accepted by `add --date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw `add` input as typed on the command line
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub program: String,
    pub scholar: String,
    pub staff: String,
    pub kind: String,
    pub channel: String,
    pub date: Option<String>,
    pub notes: Option<String>,
}

impl AddRequest {
    /// Check required fields and parse the date. `now` is used when no date is given.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewTouchpoint> {
        let required = [
            &self.program,
            &self.scholar,
            &self.staff,
            &self.kind,
            &self.channel,
        ];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(Error::Validation(
                "add requires --program, --scholar, --staff, --type, --channel".to_string(),
            ));
        }

        let occurred_at = match self.date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => parse_date(date)?,
            _ => now,
        };

        Ok(NewTouchpoint {
            program: self.program,
            scholar: self.scholar,
            staff: self.staff,
            kind: self.kind,
            channel: self.channel,
            occurred_at,
            notes: normalize_notes(self.notes),
        })
    }
}

/// Parse `YYYY-MM-DD` as midnight UTC
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::Validation(format!("invalid date: {}: {}", value, e)))?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Blank notes are stored as NULL
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

/// Start of a `days`-day stats window: midnight UTC of the day `days` days before `now`.
pub fn window_start(now: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    let day = now
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| Error::Validation(format!("window of {} days is out of range", days)))?;
    Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)))
}

/// Gap cutoff: exactly `days` days before `now`. A scholar whose latest
/// touchpoint is before this instant is reported.
pub fn gap_cutoff(now: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| Error::Validation(format!("window of {} days is out of range", days)))
}

/// Ledger operations over a store
pub struct Ledger<'a> {
    store: &'a PgStore,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a PgStore) -> Self {
        Self { store }
    }

    /// Validate, resolve the three names and insert one touchpoint.
    ///
    /// Nothing is written unless every name resolves.
    pub async fn add(&self, request: AddRequest) -> Result<LoggedTouchpoint> {
        let touchpoint = request.validate(Utc::now())?;

        let program_id = self.store.lookup_id(EntityTable::Programs, &touchpoint.program).await?;
        let scholar_id = self.store.lookup_id(EntityTable::Scholars, &touchpoint.scholar).await?;
        let staff_id = self.store.lookup_id(EntityTable::Staff, &touchpoint.staff).await?;

        let resolved = ResolvedTouchpoint {
            program_id,
            scholar_id,
            staff_id,
            touchpoint: &touchpoint,
        };
        let id = self.store.insert_touchpoint(&resolved).await?;
        tracing::info!(
            id,
            program_id,
            scholar_id,
            staff_id,
            "touchpoint logged"
        );

        Ok(LoggedTouchpoint {
            id,
            program_id,
            scholar_id,
            staff_id,
            occurred_at: touchpoint.occurred_at,
        })
    }

    pub async fn list(&self, limit: u32) -> Result<Vec<TouchpointRecord>> {
        self.store.recent_touchpoints(limit).await
    }

    pub async fn stats(&self, days: u32) -> Result<ChannelStats> {
        let since = window_start(Utc::now(), days)?;
        tracing::debug!(%since, days, "computing channel stats");
        let (total, by_channel) = self.store.channel_counts_since(since).await?;
        Ok(ChannelStats {
            days,
            since,
            total,
            by_channel,
        })
    }

    pub async fn gaps(&self, days: u32) -> Result<GapReport> {
        let since = gap_cutoff(Utc::now(), days)?;
        tracing::debug!(%since, days, "finding scholar gaps");
        let scholars = self.store.scholar_gaps(since).await?;
        Ok(GapReport {
            days,
            since,
            scholars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn request() -> AddRequest {
        AddRequest {
            program: "STEM Horizon".into(),
            scholar: "Nico Alvarez".into(),
            staff: "Jordan Lee".into(),
            kind: "Check-in".into(),
            channel: "Call".into(),
            date: None,
            notes: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_date() {
        let parsed = parse_date("2025-03-09").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2025, 3, 9));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (0, 0, 0));
    }

    #[test]
    fn test_parse_date_rejects_bad_input() {
        for bad in ["2025-13-01", "2025/03/09", "yesterday", "03-09-2025", ""] {
            let err = parse_date(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{}", bad);
            assert!(err.to_string().starts_with("invalid date"));
        }
    }

    #[test]
    fn test_validate_defaults_to_now() {
        let now = at(2026, 5, 1, 9);
        let tp = request().validate(now).unwrap();
        assert_eq!(tp.occurred_at, now);
        assert_eq!(tp.notes, None);
    }

    #[test]
    fn test_validate_uses_date() {
        let tp = AddRequest {
            date: Some("2026-04-15".into()),
            ..request()
        }
        .validate(at(2026, 5, 1, 9))
        .unwrap();
        assert_eq!(tp.occurred_at, Utc.with_ymd_and_hms(2026, 4, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_validate_requires_fields() {
        for blank in 0..5 {
            let mut req = request();
            match blank {
                0 => req.program = String::new(),
                1 => req.scholar = "  ".into(),
                2 => req.staff = String::new(),
                3 => req.kind = String::new(),
                _ => req.channel = String::new(),
            }
            let err = req.validate(Utc::now()).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }

    #[test]
    fn test_validate_bad_date() {
        let err = AddRequest {
            date: Some("15/04/2026".into()),
            ..request()
        }
        .validate(Utc::now())
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_normalize_notes() {
        assert_eq!(normalize_notes(None), None);
        assert_eq!(normalize_notes(Some("".into())), None);
        assert_eq!(normalize_notes(Some("   ".into())), None);
        assert_eq!(normalize_notes(Some("Called mom".into())), Some("Called mom".into()));
    }

    #[test]
    fn test_window_start() {
        let now = at(2026, 3, 10, 15);
        assert_eq!(window_start(now, 0).unwrap(), Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(window_start(now, 14).unwrap(), Utc.with_ymd_and_hms(2026, 2, 24, 0, 0, 0).unwrap());
        assert_eq!(window_start(now, 30).unwrap(), Utc.with_ymd_and_hms(2026, 2, 8, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_includes_touchpoint_dated_exactly_days_ago() {
        let now = at(2026, 3, 10, 15);
        let thirty_days_ago = crate::seed::fixture_time(now, 30);
        assert!(thirty_days_ago >= window_start(now, 30).unwrap());
        assert!(thirty_days_ago < window_start(now, 29).unwrap());
    }

    #[test]
    fn test_window_out_of_range() {
        assert!(matches!(window_start(Utc::now(), u32::MAX), Err(Error::Validation(_))));
    }

    #[test]
    fn test_gap_cutoff_is_exact_days_before_now() {
        let now = at(2026, 3, 10, 15);
        let cutoff = gap_cutoff(now, 14).unwrap();
        assert_eq!(cutoff, at(2026, 2, 24, 15));

        // Contact on the boundary day but before the time of day is stale
        let morning = at(2026, 2, 24, 10);
        assert!(morning >= window_start(now, 14).unwrap());
        assert!(morning < cutoff);

        assert_eq!(gap_cutoff(now, 0).unwrap(), now);
    }

    #[test]
    fn test_gap_cutoff_out_of_range() {
        let now = at(2026, 3, 10, 15);
        assert!(matches!(gap_cutoff(now, u32::MAX), Err(Error::Validation(_))));
        assert!(matches!(
            gap_cutoff(DateTime::<Utc>::MIN_UTC, 1),
            Err(Error::Validation(_))
        ));
    }

    /// Store for database tests, from `TOUCHPOINT_TEST_DSN`.
    async fn test_store() -> Option<PgStore> {
        let dsn = std::env::var("TOUCHPOINT_TEST_DSN").ok()?;
        Some(PgStore::connect(&dsn).await.unwrap())
    }

    // The database checks share one schema, so they run as a single test.
    #[tokio::test]
    async fn test_ledger_against_postgres() {
        let Some(store) = test_store().await else {
            eprintln!("TOUCHPOINT_TEST_DSN not set; skipping database test");
            return;
        };

        // Seeding twice does not duplicate rows
        let first = crate::seed::migrate_and_seed(&store).await.unwrap();
        let second = crate::seed::migrate_and_seed(&store).await.unwrap();
        assert_eq!(first, second);
        assert!(second.programs >= 3 && second.staff >= 3 && second.scholars >= 5);
        assert!(second.touchpoints >= 5);

        let ledger = Ledger::new(&store);

        // Stats total matches the breakdown
        let stats = ledger.stats(30).await.unwrap();
        assert_eq!(stats.total, stats.breakdown_total());
        assert!(stats.total >= 5);

        // Unknown scholar fails without writing
        let before = store.table_counts().await.unwrap();
        let err = ledger
            .add(AddRequest {
                scholar: "Unknown Name".into(),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { table: EntityTable::Scholars, .. }));
        assert_eq!(err.to_string(), "scholars not found: Unknown Name");
        assert_eq!(store.table_counts().await.unwrap().touchpoints, before.touchpoints);

        // Added rows reference exactly the named entities
        let logged = ledger
            .add(AddRequest {
                notes: Some("".into()),
                ..request()
            })
            .await
            .unwrap();
        let stored = store.touchpoint_keys(logged.id).await.unwrap().unwrap();
        assert_eq!(stored.program_id, store.lookup_id(EntityTable::Programs, "STEM Horizon").await.unwrap());
        assert_eq!(stored.scholar_id, store.lookup_id(EntityTable::Scholars, "Nico Alvarez").await.unwrap());
        assert_eq!(stored.staff_id, store.lookup_id(EntityTable::Staff, "Jordan Lee").await.unwrap());

        // List honours the limit and ordering
        let rows = ledger.list(3).await.unwrap();
        assert!(rows.len() <= 3);
        assert!(rows.windows(2).all(|w| w[0].occurred_at >= w[1].occurred_at));

        // A scholar with no touchpoints at all
        let program_id = store.lookup_id(EntityTable::Programs, "Bridge to Campus").await.unwrap();
        sqlx::query(
            "INSERT INTO gs_touchpoint_ledger.scholars (name, cohort, program_id) \
             VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING",
        )
        .bind("Rowan Ellis")
        .bind("2028")
        .bind(program_id)
        .execute(store.pool())
        .await
        .unwrap();

        // Nico was just contacted; gaps only report stale or never-contacted scholars
        let before_gaps = Utc::now();
        let report = ledger.gaps(14).await.unwrap();
        let after_gaps = Utc::now();
        assert!(report.since >= before_gaps - Duration::days(14));
        assert!(report.since <= after_gaps - Duration::days(14));
        assert!(report.scholars.iter().all(|g| g.scholar != "Nico Alvarez"));

        let first_dated = report
            .scholars
            .iter()
            .position(|g| !g.never_contacted())
            .unwrap_or(report.scholars.len());
        let (never, dated) = report.scholars.split_at(first_dated);
        assert!(never.iter().any(|g| g.scholar == "Rowan Ellis"));
        assert!(dated.iter().all(|g| !g.never_contacted()));
        assert!(dated
            .iter()
            .all(|g| g.last_touchpoint.is_some_and(|last| last < report.since)));
        assert!(dated
            .windows(2)
            .all(|w| w[0].last_touchpoint <= w[1].last_touchpoint));

        store.close().await;
    }
}
