//! File-backed directory capability.
//!
//! Serves the [`Directory`] trait from an organization export document: a
//! JSON dump of roots, units, accounts, and containment edges produced by
//! whatever tooling has live directory access. Lets `finsync snapshot` run
//! without directory credentials.
//!
//! Document shape:
//!
//! ```json
//! {
//!   "roots": [{ "id": "r-1", "name": "Root" }],
//!   "units": { "r-1": [{ "id": "ou-sec", "name": "Security" }] },
//!   "account_children": { "ou-sec": ["111111111111"] },
//!   "accounts": [{ "id": "111111111111", "name": "Prod-Web", "status": "ACTIVE" }],
//!   "parents": { "111111111111": [{ "id": "ou-sec", "kind": "ORGANIZATIONAL_UNIT" }] }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use finsync_core::{
    AccountId, AccountListing, ApiError, Directory, ParentRef, UnitDetail, UnitId, UnitSummary,
};

/// Errors loading an organization export document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot read export at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse export at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct OrgExport {
    #[serde(default)]
    roots: Vec<UnitSummary>,
    /// Child units keyed by parent id.
    #[serde(default)]
    units: HashMap<String, Vec<UnitSummary>>,
    /// Child accounts keyed by parent id.
    #[serde(default)]
    account_children: HashMap<String, Vec<AccountId>>,
    #[serde(default)]
    accounts: Vec<AccountListing>,
    /// Parent references keyed by account id (fallback lookups).
    #[serde(default)]
    parents: HashMap<String, Vec<ParentRef>>,
}

/// A [`Directory`] served entirely from an export document.
pub struct FileDirectory {
    export: OrgExport,
    /// Unit id → detail, derived from the containment edges at load time.
    details: HashMap<UnitId, UnitDetail>,
}

impl FileDirectory {
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let export: OrgExport =
            serde_json::from_str(&contents).map_err(|source| ExportError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut details = HashMap::new();
        for (parent, children) in &export.units {
            for child in children {
                details.insert(
                    child.id.clone(),
                    UnitDetail {
                        name: child.name.clone(),
                        parent: Some(UnitId::from(parent.as_str())),
                    },
                );
            }
        }

        Ok(Self { export, details })
    }
}

impl Directory for FileDirectory {
    fn list_roots(&self) -> Result<Vec<UnitSummary>, ApiError> {
        Ok(self.export.roots.clone())
    }

    fn list_units_under(&self, parent: &UnitId) -> Result<Vec<UnitSummary>, ApiError> {
        Ok(self
            .export
            .units
            .get(&parent.0)
            .cloned()
            .unwrap_or_default())
    }

    fn list_account_children(&self, parent: &UnitId) -> Result<Vec<AccountId>, ApiError> {
        Ok(self
            .export
            .account_children
            .get(&parent.0)
            .cloned()
            .unwrap_or_default())
    }

    fn list_accounts(&self) -> Result<Vec<AccountListing>, ApiError> {
        Ok(self.export.accounts.clone())
    }

    fn describe_unit(&self, id: &UnitId) -> Result<UnitDetail, ApiError> {
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("unit {id} not in export")))
    }

    fn list_parents_of(&self, child: &AccountId) -> Result<Vec<ParentRef>, ApiError> {
        Ok(self
            .export
            .parents
            .get(&child.0)
            .cloned()
            .unwrap_or_default())
    }
}
