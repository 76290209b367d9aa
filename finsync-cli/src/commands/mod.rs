pub mod apply;
pub mod init;
pub mod mirror;
pub mod plan;
pub mod snapshot;

use anyhow::{Context, Result};
use finsync_api::MirrorClient;
use finsync_core::config::{self, MirrorConfig, DEFAULT_BASE_URL};

/// Build a mirror client from CLI flag overrides, falling back to the saved
/// config for anything not supplied. Credentials given entirely on the
/// command line never touch the config file.
pub fn mirror_client(
    api_key: Option<String>,
    client_api_id: Option<u64>,
    base_url: Option<String>,
) -> Result<MirrorClient> {
    if let (Some(api_key), Some(client_api_id)) = (&api_key, client_api_id) {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        return Ok(MirrorClient::new(&base_url, api_key, client_api_id));
    }

    let saved = config::load().context("no mirror credentials; run `finsync init` first")?;
    let merged = MirrorConfig {
        base_url: base_url.unwrap_or(saved.mirror.base_url),
        api_key: api_key.unwrap_or(saved.mirror.api_key),
        client_api_id: client_api_id.unwrap_or(saved.mirror.client_api_id),
    };
    Ok(MirrorClient::from_config(&merged))
}
