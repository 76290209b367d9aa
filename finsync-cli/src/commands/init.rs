//! `finsync init --api-key <key> --client-api-id <id> [--base-url <url>]`

use anyhow::{Context, Result};
use clap::Args;

use finsync_core::config::{self, Config, MirrorConfig, DEFAULT_BASE_URL};

/// Store mirror-platform credentials in ~/.finsync/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Mirror platform API key.
    #[arg(long)]
    pub api_key: String,

    /// Mirror platform client API id.
    #[arg(long)]
    pub client_api_id: u64,

    /// Mirror platform endpoint override.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let config = Config {
            mirror: MirrorConfig {
                base_url: self.base_url,
                api_key: self.api_key,
                client_api_id: self.client_api_id,
            },
        };
        config::save(&config).context("failed to save config")?;

        println!("✓ Credentials saved to ~/.finsync/config.yaml");
        Ok(())
    }
}
