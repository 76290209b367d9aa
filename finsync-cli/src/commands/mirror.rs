//! `finsync mirror` — fetch the mirror platform's account list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use finsync_core::MirrorPlatform;
use finsync_plan::io::write_mirror_csv;

/// Fetch the mirror platform's account list into a CSV snapshot.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Where to write the mirror snapshot CSV.
    #[arg(long, default_value = "mirror.csv")]
    pub out: PathBuf,

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

impl MirrorArgs {
    pub fn run(self) -> Result<()> {
        let client = super::mirror_client(self.api_key, self.client_api_id, self.base_url)?;

        let accounts = client
            .list_accounts()
            .context("failed to list mirror accounts")?;
        let unlinked = accounts
            .iter()
            .filter(|account| account.account_id.is_none())
            .count();

        write_mirror_csv(&self.out, &accounts)
            .with_context(|| format!("failed to write '{}'", self.out.display()))?;

        println!(
            "✓ Mirror snapshot written to '{}' ({} accounts)",
            self.out.display(),
            accounts.len()
        );
        if unlinked > 0 {
            println!(
                "  {} {} record(s) have no cross-system identifier and cannot be planned",
                "!".yellow().bold(),
                unlinked
            );
        }
        Ok(())
    }
}
