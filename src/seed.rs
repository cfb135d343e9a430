//! Schema migration and fixture seeding
//!
//! Runs every DDL statement and fixture upsert inside one transaction, so a
//! failure part-way leaves the database untouched.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgConnection;

use crate::Result;
use crate::model::{EntityTable, TableCounts};
use crate::storage::{PgStore, lookup_id, schema, table_counts};

pub struct ProgramFixture {
    pub name: &'static str,
    pub region: &'static str,
}

pub struct StaffFixture {
    pub name: &'static str,
    pub role: &'static str,
}

pub struct ScholarFixture {
    pub name: &'static str,
    pub cohort: &'static str,
    pub program: &'static str,
}

pub struct TouchpointFixture {
    pub program: &'static str,
    pub scholar: &'static str,
    pub staff: &'static str,
    pub kind: &'static str,
    pub channel: &'static str,
    pub days_ago: i64,
    pub notes: &'static str,
}

pub const PROGRAMS: &[ProgramFixture] = &[
    ProgramFixture { name: "Future Scholars North", region: "Midwest" },
    ProgramFixture { name: "STEM Horizon", region: "South" },
    ProgramFixture { name: "Bridge to Campus", region: "West" },
];

pub const STAFF: &[StaffFixture] = &[
    StaffFixture { name: "Daria Mendez", role: "Scholar Success" },
    StaffFixture { name: "Jordan Lee", role: "Program Director" },
    StaffFixture { name: "Imani Patel", role: "Mentor Liaison" },
];

pub const SCHOLARS: &[ScholarFixture] = &[
    ScholarFixture { name: "Avery Green", cohort: "2026", program: "Future Scholars North" },
    ScholarFixture { name: "Nico Alvarez", cohort: "2025", program: "STEM Horizon" },
    ScholarFixture { name: "Priya Shah", cohort: "2027", program: "Bridge to Campus" },
    ScholarFixture { name: "Mateo Cruz", cohort: "2026", program: "Future Scholars North" },
    ScholarFixture { name: "Jules Martin", cohort: "2025", program: "STEM Horizon" },
];

pub const TOUCHPOINTS: &[TouchpointFixture] = &[
    TouchpointFixture {
        program: "Future Scholars North",
        scholar: "Avery Green",
        staff: "Daria Mendez",
        kind: "Check-in",
        channel: "Call",
        days_ago: 4,
        notes: "Reviewed midterm goals and internship applications.",
    },
    TouchpointFixture {
        program: "STEM Horizon",
        scholar: "Nico Alvarez",
        staff: "Jordan Lee",
        kind: "Mentor Match",
        channel: "Email",
        days_ago: 12,
        notes: "Shared three mentor matches for spring semester.",
    },
    TouchpointFixture {
        program: "Bridge to Campus",
        scholar: "Priya Shah",
        staff: "Imani Patel",
        kind: "Workshop",
        channel: "Zoom",
        days_ago: 20,
        notes: "Attended financial aid workshop.",
    },
    TouchpointFixture {
        program: "Future Scholars North",
        scholar: "Mateo Cruz",
        staff: "Daria Mendez",
        kind: "Campus Visit",
        channel: "In-person",
        days_ago: 30,
        notes: "Visited campus and met admissions.",
    },
    TouchpointFixture {
        program: "STEM Horizon",
        scholar: "Jules Martin",
        staff: "Imani Patel",
        kind: "Check-in",
        channel: "SMS",
        days_ago: 7,
        notes: "Confirmed scholarship application timeline.",
    },
];

/// Create the schema, tables and indexes
pub async fn migrate(conn: &mut PgConnection) -> Result<()> {
    for stmt in schema::all_schema_statements() {
        sqlx::query(stmt).execute(&mut *conn).await?;
    }
    tracing::info!("schema {} is up to date", schema::SCHEMA);
    Ok(())
}

/// Upsert every fixture row. Fixture touchpoints are dated relative to `now`.
pub async fn seed_fixtures(conn: &mut PgConnection, now: DateTime<Utc>) -> Result<()> {
    for program in PROGRAMS {
        sqlx::query(
            r#"
            INSERT INTO gs_touchpoint_ledger.programs (name, region)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET region = EXCLUDED.region
            "#,
        )
        .bind(program.name)
        .bind(program.region)
        .execute(&mut *conn)
        .await?;
    }

    for person in STAFF {
        sqlx::query(
            r#"
            INSERT INTO gs_touchpoint_ledger.staff (name, role)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(person.name)
        .bind(person.role)
        .execute(&mut *conn)
        .await?;
    }

    for scholar in SCHOLARS {
        let program_id = lookup_id(&mut *conn, EntityTable::Programs, scholar.program).await?;
        sqlx::query(
            r#"
            INSERT INTO gs_touchpoint_ledger.scholars (name, cohort, program_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
                SET cohort = EXCLUDED.cohort, program_id = EXCLUDED.program_id
            "#,
        )
        .bind(scholar.name)
        .bind(scholar.cohort)
        .bind(program_id)
        .execute(&mut *conn)
        .await?;
    }

    for tp in TOUCHPOINTS {
        let program_id = lookup_id(&mut *conn, EntityTable::Programs, tp.program).await?;
        let scholar_id = lookup_id(&mut *conn, EntityTable::Scholars, tp.scholar).await?;
        let staff_id = lookup_id(&mut *conn, EntityTable::Staff, tp.staff).await?;
        let occurred_at = fixture_time(now, tp.days_ago);

        // Touchpoints have no natural key; a fixture is identified by its
        // full content and only has its date refreshed on re-seed.
        sqlx::query(
            r#"
            WITH refreshed AS (
                UPDATE gs_touchpoint_ledger.touchpoints
                SET occurred_at = $6
                WHERE program_id = $1 AND scholar_id = $2 AND staff_id = $3
                  AND kind = $4 AND channel = $5 AND notes IS NOT DISTINCT FROM $7
                RETURNING id
            )
            INSERT INTO gs_touchpoint_ledger.touchpoints
                (program_id, scholar_id, staff_id, kind, channel, occurred_at, notes)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM refreshed)
            "#,
        )
        .bind(program_id)
        .bind(scholar_id)
        .bind(staff_id)
        .bind(tp.kind)
        .bind(tp.channel)
        .bind(occurred_at)
        .bind(tp.notes)
        .execute(&mut *conn)
        .await?;
    }

    tracing::info!(
        programs = PROGRAMS.len(),
        staff = STAFF.len(),
        scholars = SCHOLARS.len(),
        touchpoints = TOUCHPOINTS.len(),
        "fixtures seeded"
    );
    Ok(())
}

/// Migrate and seed in a single transaction, returning the resulting row counts
pub async fn migrate_and_seed(store: &PgStore) -> Result<TableCounts> {
    let mut tx = store.pool().begin().await?;
    migrate(&mut *tx).await?;
    seed_fixtures(&mut *tx, Utc::now()).await?;
    let counts = table_counts(&mut *tx).await?;
    tx.commit().await?;
    Ok(counts)
}

pub fn fixture_time(now: DateTime<Utc>, days_ago: i64) -> DateTime<Utc> {
    now - Duration::days(days_ago)
}
