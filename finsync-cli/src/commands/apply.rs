//! `finsync apply [plan.json]` — push plan updates to the mirror platform.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use finsync_core::{AccountUpdate, MirrorPlatform};
use finsync_plan::io::load_plan;

/// Push a plan's updates to the mirror platform.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Plan file produced by `finsync plan`.
    #[arg(default_value = "plan.json")]
    pub plan: PathBuf,

    /// Show what would be pushed without calling the mirror platform.
    #[arg(long)]
    pub dry_run: bool,

    /// API key override (defaults to the saved config).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Client API id override (defaults to the saved config).
    #[arg(long)]
    pub client_api_id: Option<u64>,

    /// Endpoint override (defaults to the saved config).
    #[arg(long)]
    pub base_url: Option<String>,
}

impl ApplyArgs {
    pub fn run(self) -> Result<()> {
        let entries = load_plan(&self.plan)
            .with_context(|| format!("failed to load plan '{}'", self.plan.display()))?;

        if entries.is_empty() {
            println!("Plan '{}' is empty; nothing to apply.", self.plan.display());
            return Ok(());
        }

        if self.dry_run {
            for entry in &entries {
                println!(
                    "[dry-run] would rename mirror record {} '{}' -> '{}' (ou-level-1='{}', ou-level-2='{}')",
                    entry.ch_id,
                    entry.old_name,
                    entry.new_name,
                    entry.tags.ou_level_1,
                    entry.tags.ou_level_2,
                );
            }
            println!("[dry-run] {} update(s) pending", entries.len());
            return Ok(());
        }

        let client = super::mirror_client(self.api_key, self.client_api_id, self.base_url)?;

        let mut applied = 0;
        let mut failed = 0;
        for entry in &entries {
            let update = AccountUpdate {
                name: Some(entry.new_name.clone()),
                tags: Some(entry.tags.to_map()),
            };
            match client.update_account(entry.ch_id, &update) {
                Ok(()) => {
                    println!(
                        "  ✎  {} '{}' -> '{}'",
                        entry.aws_id, entry.old_name, entry.new_name
                    );
                    applied += 1;
                }
                Err(err) => {
                    eprintln!(
                        "  {}  {} (mirror record {}): {err}",
                        "✗".red().bold(),
                        entry.aws_id,
                        entry.ch_id
                    );
                    failed += 1;
                }
            }
        }

        println!("✓ Applied {applied} of {} update(s)", entries.len());
        if failed > 0 {
            bail!("{failed} update(s) failed; re-run `finsync apply` to retry them");
        }
        Ok(())
    }
}
