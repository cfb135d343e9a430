//! Storage Layer - PostgreSQL-backed persistence
//!
//! Everything lives in the `gs_touchpoint_ledger` schema:
//! - programs(name, region)
//! - staff(name, role)
//! - scholars(name, cohort, program_id)
//! - touchpoints(program_id, scholar_id, staff_id, kind, channel, occurred_at, notes)

pub mod postgres;
pub mod schema;

pub use postgres::{PgStore, ResolvedTouchpoint, lookup_id, table_counts};
