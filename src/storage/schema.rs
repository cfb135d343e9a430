//! Database schema definitions

/// Schema that holds every ledger table
pub const SCHEMA: &str = "gs_touchpoint_ledger";

pub const CREATE_SCHEMA: &str = "CREATE SCHEMA IF NOT EXISTS gs_touchpoint_ledger";

/// SQL to create the programs table
pub const CREATE_PROGRAMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gs_touchpoint_ledger.programs (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    region TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// SQL to create the staff table
pub const CREATE_STAFF_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gs_touchpoint_ledger.staff (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// SQL to create the scholars table
pub const CREATE_SCHOLARS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gs_touchpoint_ledger.scholars (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    cohort TEXT NOT NULL,
    program_id INT NOT NULL REFERENCES gs_touchpoint_ledger.programs(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// SQL to create the touchpoints table
/// `occurred_at` has no default; callers always supply it
pub const CREATE_TOUCHPOINTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gs_touchpoint_ledger.touchpoints (
    id SERIAL PRIMARY KEY,
    program_id INT NOT NULL REFERENCES gs_touchpoint_ledger.programs(id),
    scholar_id INT NOT NULL REFERENCES gs_touchpoint_ledger.scholars(id),
    staff_id INT NOT NULL REFERENCES gs_touchpoint_ledger.staff(id),
    kind TEXT NOT NULL,
    channel TEXT NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_touchpoints_occurred_at ON gs_touchpoint_ledger.touchpoints(occurred_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_touchpoints_scholar ON gs_touchpoint_ledger.touchpoints(scholar_id)",
];

/// All schema creation statements, in dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_SCHEMA,
        CREATE_PROGRAMS_TABLE,
        CREATE_STAFF_TABLE,
        CREATE_SCHOLARS_TABLE,
        CREATE_TOUCHPOINTS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
