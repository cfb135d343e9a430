//! # Touchpoint Ledger
//!
//! Records interactions ("touchpoints") between program staff and scholars
//! in a mentorship program, backed by PostgreSQL.
//!
//! Touchpoint Ledger provides:
//! - Connection bootstrap from `GS_TOUCHPOINT_DSN`, `PG*` variables or a config file
//! - Schema migration and fixture seeding
//! - Name-to-key resolution for programs, scholars and staff
//! - Ledger operations: add, list, stats and gaps

pub mod config;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod output;
pub mod seed;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use ledger::{AddRequest, Ledger};
pub use model::{EntityTable, TouchpointRecord};
pub use storage::PgStore;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{table} not found: {name}")]
    NotFound { table: EntityTable, name: String },

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}
