//! Ledger records
//!
//! Programs, staff and scholars are reference data created by the seeder.
//! Touchpoints are appended by `ledger add` and never modified afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name-keyed tables that the resolver can look up.
///
/// The set is closed so a table name never comes from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityTable {
    Programs,
    Scholars,
    Staff,
}

impl EntityTable {
    /// Unqualified table name inside the ledger schema
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTable::Programs => "programs",
            EntityTable::Scholars => "scholars",
            EntityTable::Staff => "staff",
        }
    }
}

impl std::fmt::Display for EntityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated touchpoint waiting for its names to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTouchpoint {
    pub program: String,
    pub scholar: String,
    pub staff: String,
    pub kind: String,
    pub channel: String,
    pub occurred_at: DateTime<Utc>,
    /// `None` is stored as SQL NULL
    pub notes: Option<String>,
}

/// Result of a successful `add`: the new row and the keys it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedTouchpoint {
    pub id: i32,
    pub program_id: i32,
    pub scholar_id: i32,
    pub staff_id: i32,
    pub occurred_at: DateTime<Utc>,
}

/// One touchpoint joined with the names it references.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TouchpointRecord {
    pub id: i32,
    pub program: String,
    pub scholar: String,
    pub staff: String,
    pub kind: String,
    pub channel: String,
    pub occurred_at: DateTime<Utc>,
    /// Empty when the stored notes are NULL
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelCount {
    pub channel: String,
    pub count: i64,
}

/// Touchpoint volume inside a recency window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    pub days: u32,
    pub since: DateTime<Utc>,
    pub total: i64,
    /// Ordered by count descending
    pub by_channel: Vec<ChannelCount>,
}

impl ChannelStats {
    /// Sum of the per-channel breakdown
    pub fn breakdown_total(&self) -> i64 {
        self.by_channel.iter().map(|c| c.count).sum()
    }
}

/// A scholar whose latest touchpoint is missing or older than the window.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScholarGap {
    pub scholar: String,
    pub cohort: String,
    pub program: String,
    pub last_touchpoint: Option<DateTime<Utc>>,
}

impl ScholarGap {
    pub fn never_contacted(&self) -> bool {
        self.last_touchpoint.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub days: u32,
    pub since: DateTime<Utc>,
    /// Never-contacted scholars first, then oldest contact first
    pub scholars: Vec<ScholarGap>,
}

/// Row counts per ledger table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub programs: i64,
    pub staff: i64,
    pub scholars: i64,
    pub touchpoints: i64,
}

impl std::fmt::Display for TableCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ledger Statistics:")?;
        writeln!(f, "  Programs: {}", self.programs)?;
        writeln!(f, "  Staff: {}", self.staff)?;
        writeln!(f, "  Scholars: {}", self.scholars)?;
        writeln!(f, "  Touchpoints: {}", self.touchpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_table_names() {
        assert_eq!(EntityTable::Programs.as_str(), "programs");
        assert_eq!(EntityTable::Scholars.as_str(), "scholars");
        assert_eq!(EntityTable::Staff.to_string(), "staff");
    }

    #[test]
    fn test_breakdown_total() {
        let stats = ChannelStats {
            days: 30,
            since: Utc::now(),
            total: 5,
            by_channel: vec![
                ChannelCount { channel: "Call".into(), count: 3 },
                ChannelCount { channel: "SMS".into(), count: 2 },
            ],
        };
        assert_eq!(stats.breakdown_total(), stats.total);
    }
}
