//! `finsync snapshot <export.json>` — build the enriched directory snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use finsync_api::FileDirectory;
use finsync_plan::io::write_directory_csv;
use finsync_resolve::{build_directory_snapshot, DirectorySnapshot};

use super::super::AncestryArg;

/// Build the enriched directory snapshot from an organization export.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Path to the organization export JSON document.
    pub export: PathBuf,

    /// Where to write the snapshot CSV.
    #[arg(long, default_value = "directory.csv")]
    pub out: PathBuf,

    /// Ancestry fields to resolve: grandparent | full-path.
    #[arg(long, default_value_t = AncestryArg::default())]
    pub ancestry: AncestryArg,
}

impl SnapshotArgs {
    pub fn run(self) -> Result<()> {
        let directory = FileDirectory::load(&self.export).with_context(|| {
            format!("failed to load organization export '{}'", self.export.display())
        })?;

        let snapshot = build_directory_snapshot(&directory, self.ancestry.into())
            .context("snapshot resolution failed")?;

        write_directory_csv(&self.out, &snapshot.accounts)
            .with_context(|| format!("failed to write '{}'", self.out.display()))?;

        print_summary(&snapshot, &self.out);
        Ok(())
    }
}

fn print_summary(snapshot: &DirectorySnapshot, out: &std::path::Path) {
    println!(
        "✓ Snapshot written to '{}' ({} accounts, {} units, captured {})",
        out.display(),
        snapshot.accounts.len(),
        snapshot.unit_count,
        snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    if snapshot.listing_failures > 0 {
        println!(
            "  {} {} child listing(s) failed; affected subtrees are incomplete",
            "!".yellow().bold(),
            snapshot.listing_failures
        );
    }
    if snapshot.fallback_resolutions > 0 {
        println!(
            "  {} {} account(s) resolved via per-account fallback lookups",
            "!".yellow().bold(),
            snapshot.fallback_resolutions
        );
    }
    if snapshot.unresolved_parents > 0 {
        println!(
            "  {} {} account(s) have no resolvable parent",
            "!".yellow().bold(),
            snapshot.unresolved_parents
        );
    }
}
