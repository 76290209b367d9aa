//! `finsync plan <directory.csv> <mirror.csv>` — diff into an update plan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use finsync_core::PlanEntry;
use finsync_plan::{
    io::{load_directory_csv, load_mirror_csv, write_plan},
    planner::{generate_plan, PlanOutcome},
};

/// Diff the two snapshots into an update plan.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Directory snapshot CSV (from `finsync snapshot`).
    pub directory: PathBuf,

    /// Mirror snapshot CSV (from `finsync mirror`).
    pub mirror: PathBuf,

    /// Where to write the plan.
    #[arg(long, default_value = "plan.json")]
    pub out: PathBuf,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let directory_accounts = load_directory_csv(&self.directory)
            .with_context(|| format!("failed to load '{}'", self.directory.display()))?;
        let mirror_accounts = load_mirror_csv(&self.mirror)
            .with_context(|| format!("failed to load '{}'", self.mirror.display()))?;

        let outcome = generate_plan(&directory_accounts, &mirror_accounts);

        write_plan(&self.out, &outcome.entries)
            .with_context(|| format!("failed to write '{}'", self.out.display()))?;

        if self.json {
            print_json(&outcome)?;
        } else {
            print_table(&outcome, &self.out);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PlanReportJson<'a> {
    summary: PlanSummaryJson,
    entries: &'a [PlanEntry],
}

#[derive(Serialize)]
struct PlanSummaryJson {
    planned: usize,
    matched: usize,
    unmatched_directory: usize,
    unmatched_mirror: usize,
    skipped_mirror: usize,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "account")]
    account: String,
    #[tabled(rename = "mirror id")]
    mirror_id: u64,
    #[tabled(rename = "new name")]
    new_name: String,
    #[tabled(rename = "ou-level-1")]
    ou_level_1: String,
    #[tabled(rename = "ou-level-2")]
    ou_level_2: String,
}

fn print_json(outcome: &PlanOutcome) -> Result<()> {
    let payload = PlanReportJson {
        summary: PlanSummaryJson {
            planned: outcome.entries.len(),
            matched: outcome.matched,
            unmatched_directory: outcome.unmatched_directory,
            unmatched_mirror: outcome.unmatched_mirror,
            skipped_mirror: outcome.skipped_mirror,
        },
        entries: &outcome.entries,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_table(outcome: &PlanOutcome, out: &std::path::Path) {
    println!(
        "✓ Plan written to '{}' ({} update(s), {} matched, {} directory-only, {} mirror-only)",
        out.display(),
        outcome.entries.len(),
        outcome.matched,
        outcome.unmatched_directory,
        outcome.unmatched_mirror,
    );
    if outcome.skipped_mirror > 0 {
        println!(
            "  {} {} mirror record(s) skipped for missing cross-system identifiers",
            "!".yellow().bold(),
            outcome.skipped_mirror
        );
    }

    if outcome.entries.is_empty() {
        println!("Nothing to update; all matched mirror records are already named.");
        return;
    }

    let rows: Vec<PlanTableRow> = outcome
        .entries
        .iter()
        .map(|entry| PlanTableRow {
            account: entry.aws_id.to_string(),
            mirror_id: entry.ch_id,
            new_name: entry.new_name.clone(),
            ou_level_1: entry.tags.ou_level_1.clone(),
            ou_level_2: entry.tags.ou_level_2.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("Run 'finsync apply' to push these updates.");
}
