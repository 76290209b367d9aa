//! finsync — reconcile directory accounts with their billing-platform mirror.
//!
//! # Usage
//!
//! ```text
//! finsync init --api-key <key> --client-api-id <id> [--base-url <url>]
//! finsync snapshot <export.json> [--out directory.csv] [--ancestry grandparent|full-path]
//! finsync mirror [--out mirror.csv]
//! finsync plan <directory.csv> <mirror.csv> [--out plan.json] [--json]
//! finsync apply [plan.json] [--dry-run]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    apply::ApplyArgs, init::InitArgs, mirror::MirrorArgs, plan::PlanArgs, snapshot::SnapshotArgs,
};
use finsync_resolve::AncestryMode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "finsync",
    version,
    about = "Reconcile directory account names and tags onto the billing mirror",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store mirror-platform credentials in ~/.finsync/config.yaml.
    Init(InitArgs),

    /// Build the enriched directory snapshot from an organization export.
    Snapshot(SnapshotArgs),

    /// Fetch the mirror platform's account list.
    Mirror(MirrorArgs),

    /// Diff the two snapshots into an update plan.
    Plan(PlanArgs),

    /// Push a plan's updates to the mirror platform.
    Apply(ApplyArgs),
}

// ---------------------------------------------------------------------------
// Shared AncestryMode argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse [`AncestryMode`] from CLI args.
#[derive(Debug, Clone)]
pub struct AncestryArg(pub AncestryMode);

impl Default for AncestryArg {
    fn default() -> Self {
        Self(AncestryMode::Grandparent)
    }
}

impl FromStr for AncestryArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grandparent" => Ok(Self(AncestryMode::Grandparent)),
            "full-path" | "full_path" => Ok(Self(AncestryMode::FullPath)),
            other => Err(format!(
                "unknown ancestry mode '{other}'; expected: grandparent, full-path"
            )),
        }
    }
}

impl fmt::Display for AncestryArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AncestryMode::Grandparent => f.write_str("grandparent"),
            AncestryMode::FullPath => f.write_str("full-path"),
        }
    }
}

impl From<AncestryArg> for AncestryMode {
    fn from(a: AncestryArg) -> Self {
        a.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Snapshot(args) => args.run(),
        Commands::Mirror(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Apply(args) => args.run(),
    }
}
