//! Touchpoint Ledger CLI - record and review staff/scholar touchpoints

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use touchpoint_ledger::ledger::{DEFAULT_GAP_DAYS, DEFAULT_LIST_LIMIT, DEFAULT_STATS_DAYS};
use touchpoint_ledger::output::OutputMode;
use touchpoint_ledger::{PgStore, config, logging, ui};

mod commands;

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version)]
#[command(about = "Touchpoint ledger for the scholar mentorship program")]
#[command(long_about = r#"
Records interactions between program staff and scholars.

Connection settings come from GS_TOUCHPOINT_DSN, or from PGHOST, PGPORT,
PGUSER, PGPASSWORD, PGDATABASE and PGSSLMODE.

Example usage:
  ledger add --program "STEM Horizon" --scholar "Nico Alvarez" --staff "Jordan Lee" --type Check-in --channel Call
  ledger list --limit 10
  ledger stats --days 30
  ledger gaps --days 14
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to a TOML config file with a `dsn` entry
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Log a touchpoint
    Add {
        /// Program name
        #[arg(long)]
        program: String,

        /// Scholar name
        #[arg(long)]
        scholar: String,

        /// Staff name
        #[arg(long)]
        staff: String,

        /// Touchpoint type (e.g. Check-in, Workshop)
        #[arg(long = "type")]
        kind: String,

        /// Channel (e.g. Call, Email, Zoom)
        #[arg(long)]
        channel: String,

        /// Date of the touchpoint, YYYY-MM-DD (defaults to now)
        #[arg(long)]
        date: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List the most recent touchpoints
    List {
        /// Maximum number of touchpoints
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },

    /// Count touchpoints per channel in a recent window
    Stats {
        /// Window size in days
        #[arg(long, default_value_t = DEFAULT_STATS_DAYS)]
        days: u32,
    },

    /// Show scholars without a recent touchpoint
    Gaps {
        /// Window size in days
        #[arg(long, default_value_t = DEFAULT_GAP_DAYS)]
        days: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    logging::init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        ui::error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = OutputMode::from_flag(cli.json);
    let dsn = config::resolve_dsn_from_env(cli.config.as_deref())?;
    let store = PgStore::connect(&dsn).await?;

    let result = commands::dispatch(&store, cli.command, mode).await;
    store.close().await;
    result
}
