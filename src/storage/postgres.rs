//! PostgreSQL storage implementation

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::model::{
    ChannelCount, EntityTable, NewTouchpoint, ScholarGap, TableCounts, TouchpointRecord,
};
use crate::{Error, Result};

use super::schema;

/// Touchpoint whose names have been resolved to keys
#[derive(Debug, Clone)]
pub struct ResolvedTouchpoint<'a> {
    pub program_id: i32,
    pub scholar_id: i32,
    pub staff_id: i32,
    pub touchpoint: &'a NewTouchpoint,
}

/// PostgreSQL-backed ledger storage
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a single-connection pool and verify the server answers.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(dsn)
            .await?;
        tracing::debug!("connected to database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to shut down
    pub async fn close(self) {
        self.pool.close().await;
    }

    // ========== Name Resolution ==========

    /// Resolve a name to its key, one round trip per call
    pub async fn lookup_id(&self, table: EntityTable, name: &str) -> Result<i32> {
        lookup_id(&self.pool, table, name).await
    }

    // ========== Touchpoint Operations ==========

    /// Insert a touchpoint and return its id
    pub async fn insert_touchpoint(&self, resolved: &ResolvedTouchpoint<'_>) -> Result<i32> {
        let tp = resolved.touchpoint;
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO gs_touchpoint_ledger.touchpoints
                (program_id, scholar_id, staff_id, kind, channel, occurred_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(resolved.program_id)
        .bind(resolved.scholar_id)
        .bind(resolved.staff_id)
        .bind(&tp.kind)
        .bind(&tp.channel)
        .bind(tp.occurred_at)
        .bind(tp.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Load a touchpoint's foreign keys
    #[cfg(test)]
    pub(crate) async fn touchpoint_keys(&self, id: i32) -> Result<Option<crate::model::LoggedTouchpoint>> {
        let row = sqlx::query_as::<_, (i32, i32, i32, i32, DateTime<Utc>)>(
            r#"
            SELECT id, program_id, scholar_id, staff_id, occurred_at
            FROM gs_touchpoint_ledger.touchpoints
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, program_id, scholar_id, staff_id, occurred_at)| crate::model::LoggedTouchpoint {
            id,
            program_id,
            scholar_id,
            staff_id,
            occurred_at,
        }))
    }

    /// Most recent touchpoints first
    pub async fn recent_touchpoints(&self, limit: u32) -> Result<Vec<TouchpointRecord>> {
        let rows = sqlx::query_as::<_, TouchpointRecord>(
            r#"
            SELECT t.id, p.name AS program, s.name AS scholar, st.name AS staff,
                   t.kind, t.channel, t.occurred_at, COALESCE(t.notes, '') AS notes
            FROM gs_touchpoint_ledger.touchpoints t
            JOIN gs_touchpoint_ledger.programs p ON p.id = t.program_id
            JOIN gs_touchpoint_ledger.scholars s ON s.id = t.scholar_id
            JOIN gs_touchpoint_ledger.staff st ON st.id = t.staff_id
            ORDER BY t.occurred_at DESC, t.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Total and per-channel counts since `since`, read from one snapshot
    /// so the total always matches the breakdown.
    pub async fn channel_counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<(i64, Vec<ChannelCount>)> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM gs_touchpoint_ledger.touchpoints
            WHERE occurred_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&mut *tx)
        .await?;

        let by_channel = sqlx::query_as::<_, ChannelCount>(
            r#"
            SELECT channel, COUNT(*) AS count
            FROM gs_touchpoint_ledger.touchpoints
            WHERE occurred_at >= $1
            GROUP BY channel
            ORDER BY COUNT(*) DESC, channel
            "#,
        )
        .bind(since)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((total, by_channel))
    }

    /// Scholars whose latest touchpoint is missing or before `since`
    pub async fn scholar_gaps(&self, since: DateTime<Utc>) -> Result<Vec<ScholarGap>> {
        let rows = sqlx::query_as::<_, ScholarGap>(
            r#"
            SELECT s.name AS scholar, s.cohort, p.name AS program,
                   MAX(t.occurred_at) AS last_touchpoint
            FROM gs_touchpoint_ledger.scholars s
            JOIN gs_touchpoint_ledger.programs p ON p.id = s.program_id
            LEFT JOIN gs_touchpoint_ledger.touchpoints t ON t.scholar_id = s.id
            GROUP BY s.id, s.name, s.cohort, p.name
            HAVING MAX(t.occurred_at) IS NULL OR MAX(t.occurred_at) < $1
            ORDER BY MAX(t.occurred_at) ASC NULLS FIRST, s.name
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get row counts for every ledger table
    pub async fn table_counts(&self) -> Result<TableCounts> {
        table_counts(&self.pool).await
    }
}

/// Resolve `name` in `table` with any executor, so the seeder can resolve
/// inside its transaction.
pub async fn lookup_id<'e, E>(executor: E, table: EntityTable, name: &str) -> Result<i32>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT id FROM {}.{} WHERE name = $1",
        schema::SCHEMA,
        table.as_str()
    );
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(name)
        .fetch_optional(executor)
        .await?;

    id.ok_or_else(|| Error::NotFound {
        table,
        name: name.to_string(),
    })
}

pub async fn table_counts<'e, E>(executor: E) -> Result<TableCounts>
where
    E: PgExecutor<'e>,
{
    let (programs, staff, scholars, touchpoints) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM gs_touchpoint_ledger.programs),
                (SELECT COUNT(*) FROM gs_touchpoint_ledger.staff),
                (SELECT COUNT(*) FROM gs_touchpoint_ledger.scholars),
                (SELECT COUNT(*) FROM gs_touchpoint_ledger.touchpoints)
            "#,
        )
        .fetch_one(executor)
        .await?;

    Ok(TableCounts {
        programs,
        staff,
        scholars,
        touchpoints,
    })
}
