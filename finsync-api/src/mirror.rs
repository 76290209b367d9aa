//! Blocking HTTP client for the mirror platform's account API.
//!
//! Listing is paginated (`page`/`per_page` query params) and the response
//! envelope varies by deployment: a bare array, or an object wrapping the
//! array under `aws_accounts`, `data`, or some other key. Parsing tolerates
//! all of these.

use std::time::Duration;

use serde_json::{json, Value};

use finsync_core::{
    config::MirrorConfig, AccountId, AccountUpdate, ApiError, MirrorAccount, MirrorPlatform,
};

const PER_PAGE: usize = 100;
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the mirror platform's `/v1/aws_accounts` API.
pub struct MirrorClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    client_api_id: u64,
}

impl MirrorClient {
    pub fn new(base_url: &str, api_key: &str, client_api_id: u64) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(CALL_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client_api_id,
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(&config.base_url, &config.api_key, config.client_api_id)
    }

    fn accounts_url(&self) -> String {
        format!("{}/v1/aws_accounts", self.base_url)
    }

    fn account_url(&self, mirror_id: u64) -> String {
        format!("{}/v1/aws_accounts/{mirror_id}", self.base_url)
    }
}

impl MirrorPlatform for MirrorClient {
    fn list_accounts(&self) -> Result<Vec<MirrorAccount>, ApiError> {
        let mut accounts = Vec::new();
        let mut page = 1usize;
        loop {
            let response = self
                .agent
                .get(&self.accounts_url())
                .query("api_key", &self.api_key)
                .query("client_api_id", &self.client_api_id.to_string())
                .query("page", &page.to_string())
                .query("per_page", &PER_PAGE.to_string())
                .call()
                .map_err(map_ureq)?;
            let body: Value = response
                .into_json()
                .map_err(|err| ApiError::Malformed(err.to_string()))?;

            let batch = parse_account_page(&body)?;
            let batch_len = batch.len();
            accounts.extend(batch);

            // A short page ends the listing.
            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }
        tracing::info!("retrieved {} mirror accounts", accounts.len());
        Ok(accounts)
    }

    fn update_account(&self, mirror_id: u64, update: &AccountUpdate) -> Result<(), ApiError> {
        let mut payload = serde_json::Map::new();
        if let Some(name) = &update.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(tags) = &update.tags {
            let pairs: Vec<Value> = tags
                .iter()
                .map(|(key, value)| json!({ "key": key, "value": value }))
                .collect();
            payload.insert("tags".to_string(), Value::Array(pairs));
        }

        self.agent
            .put(&self.account_url(mirror_id))
            .query("api_key", &self.api_key)
            .query("client_api_id", &self.client_api_id.to_string())
            .send_json(Value::Object(payload))
            .map_err(map_ureq)?;
        tracing::info!("updated mirror account {mirror_id}");
        Ok(())
    }
}

fn map_ureq(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => ApiError::Status {
            status,
            message: response.status_text().to_string(),
        },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// Extract the account records from one page body, whatever the envelope.
///
/// Accepts a bare array, or an object carrying the array under
/// `aws_accounts`, `data`, or (as a last resort) its first array-valued
/// key. Individual records with a non-integer `id` are skipped with a
/// warning; malformed tag pairs are dropped silently.
pub fn parse_account_page(body: &Value) -> Result<Vec<MirrorAccount>, ApiError> {
    let items: &[Value] = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["aws_accounts", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ApiError::Malformed("no account array found in response object".to_string())
            })?,
        _ => {
            return Err(ApiError::Malformed(
                "expected a JSON array or object".to_string(),
            ))
        }
    };

    let mut accounts = Vec::new();
    for item in items {
        let Some(record) = item.as_object() else {
            continue;
        };

        let Some(mirror_id) = record.get("id").and_then(value_as_u64) else {
            tracing::warn!(
                "skipping mirror record with invalid id field: {:?}",
                record.get("id")
            );
            continue;
        };

        let mut tags = std::collections::BTreeMap::new();
        if let Some(pairs) = record.get("tags").and_then(Value::as_array) {
            for pair in pairs {
                let key = pair.get("key").and_then(Value::as_str);
                let value = pair.get("value").and_then(Value::as_str);
                if let (Some(key), Some(value)) = (key, value) {
                    tags.insert(key.to_string(), value.to_string());
                }
            }
        }

        accounts.push(MirrorAccount {
            mirror_id,
            account_id: record
                .get("aws_account_number")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(AccountId::from),
            name: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tags,
        });
    }
    Ok(accounts)
}

fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()))
}
