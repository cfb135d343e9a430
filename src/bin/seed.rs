//! Seeder - create the ledger schema and load fixture data

use std::path::PathBuf;

use clap::Parser;
use touchpoint_ledger::ui;
use touchpoint_ledger::{PgStore, config, logging, seed};

#[derive(Parser)]
#[command(name = "seed")]
#[command(version)]
#[command(about = "Create the touchpoint ledger schema and load fixture data")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML config file with a `dsn` entry
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
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
    let dsn = config::resolve_dsn_from_env(cli.config.as_deref())?;
    let store = PgStore::connect(&dsn).await?;

    let result = seed::migrate_and_seed(&store).await;
    store.close().await;
    let counts = result?;

    ui::success("Schema migrated and seeded.");
    print!("{}", counts);
    Ok(())
}
