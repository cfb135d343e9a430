use touchpoint_ledger::output::{OutputMode, emit_success};
use touchpoint_ledger::ui::{self, Icons};
use touchpoint_ledger::{AddRequest, Ledger, PgStore};

use crate::Commands;

pub async fn dispatch(store: &PgStore, command: Commands, mode: OutputMode) -> anyhow::Result<()> {
    let ledger = Ledger::new(store);
    match command {
        Commands::Add {
            program,
            scholar,
            staff,
            kind,
            channel,
            date,
            notes,
        } => {
            let request = AddRequest {
                program,
                scholar,
                staff,
                kind,
                channel,
                date,
                notes,
            };
            run_add(&ledger, request, mode).await
        }
        Commands::List { limit } => run_list(&ledger, limit, mode).await,
        Commands::Stats { days } => run_stats(&ledger, days, mode).await,
        Commands::Gaps { days } => run_gaps(&ledger, days, mode).await,
    }
}

pub async fn run_add(ledger: &Ledger<'_>, request: AddRequest, mode: OutputMode) -> anyhow::Result<()> {
    let logged = ledger.add(request).await?;

    if mode.is_human() {
        ui::success("Touchpoint logged.");
        ui::summary_row("ID:", &logged.id.to_string());
        ui::summary_row("Date:", &logged.occurred_at.format("%Y-%m-%d").to_string());
    } else {
        emit_success(mode, "add", &logged)?;
    }
    Ok(())
}

pub async fn run_list(ledger: &Ledger<'_>, limit: u32, mode: OutputMode) -> anyhow::Result<()> {
    let records = ledger.list(limit).await?;

    if mode.is_human() {
        if records.is_empty() {
            ui::warn("No touchpoints recorded.");
        } else {
            println!("{}", ui::touchpoint_table(&records));
        }
    } else {
        emit_success(mode, "list", &records)?;
    }
    Ok(())
}

pub async fn run_stats(ledger: &Ledger<'_>, days: u32, mode: OutputMode) -> anyhow::Result<()> {
    let stats = ledger.stats(days).await?;

    if mode.is_human() {
        ui::heading(
            Icons::STATS,
            &format!("Touchpoints in last {} days: {}", stats.days, stats.total),
        );
        println!("By channel:");
        if !stats.by_channel.is_empty() {
            println!("{}", ui::channel_table(&stats.by_channel));
        }
    } else {
        emit_success(mode, "stats", &stats)?;
    }
    Ok(())
}

pub async fn run_gaps(ledger: &Ledger<'_>, days: u32, mode: OutputMode) -> anyhow::Result<()> {
    let report = ledger.gaps(days).await?;

    if mode.is_human() {
        ui::heading(
            Icons::PERSON,
            &format!("Scholars with no touchpoint in the last {} days:", report.days),
        );
        if report.scholars.is_empty() {
            ui::success("Every scholar has a recent touchpoint.");
        } else {
            println!("{}", ui::gap_table(&report.scholars));
        }
    } else {
        emit_success(mode, "gaps", &report)?;
    }
    Ok(())
}
