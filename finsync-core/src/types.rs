//! Domain types for finsync.
//!
//! Identifiers are newtypes, never bare `String`s; optional derived fields
//! are `Option`s so "not populated by this build variant" stays visible in
//! the type. All types are serializable via serde.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel display name used for organization roots everywhere: in the
/// unit registry, in rendered paths, and in snapshot files.
pub const ROOT_NAME: &str = "Root";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identifier for an organizational unit (or root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The cross-system account identifier shared by the directory and the
/// mirror platform. This is the reconciliation join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of a containing node in the organizational tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentType {
    #[serde(rename = "ROOT")]
    Root,
    #[serde(rename = "ORGANIZATIONAL_UNIT")]
    OrganizationalUnit,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Root => "ROOT",
            ParentType::OrganizationalUnit => "ORGANIZATIONAL_UNIT",
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(ParentType::Root),
            "ORGANIZATIONAL_UNIT" => Ok(ParentType::OrganizationalUnit),
            other => Err(format!(
                "unknown parent type '{other}'; expected ROOT or ORGANIZATIONAL_UNIT"
            )),
        }
    }
}

/// Directory-side account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "SUSPENDED")]
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "SUSPENDED" => Ok(AccountStatus::Suspended),
            other => Err(format!(
                "unknown account status '{other}'; expected ACTIVE or SUSPENDED"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// An account's immediate containing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: UnitId,
    pub kind: ParentType,
}

/// A resolved ancestor (grandparent) reference. `name` is `None` when the
/// describe call for a late-discovered unit failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorRef {
    pub id: UnitId,
    pub kind: ParentType,
    pub name: Option<String>,
}

/// One account as seen by the authoritative directory, enriched with its
/// resolved ancestry.
///
/// Which derived fields are populated depends on the snapshot's ancestry
/// mode: grandparent-only runs fill `grandparent`, full-path runs fill
/// `ou_path`. `parent_name` is filled by both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAccount {
    pub id: AccountId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grandparent: Option<AncestorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ou_path: Option<Vec<String>>,
}

impl DirectoryAccount {
    /// Bare record straight off the account listing, ancestry unresolved.
    pub fn unresolved(id: AccountId, name: String, status: Option<AccountStatus>) -> Self {
        Self {
            id,
            name,
            status,
            parent: None,
            parent_name: None,
            grandparent: None,
            ou_path: None,
        }
    }

    /// Grandparent/root-level ancestry name, whichever variant carries it.
    ///
    /// Grandparent-mode snapshots read it off `grandparent`; full-path
    /// snapshots read the second-to-last path element.
    pub fn ancestry_level_1(&self) -> Option<&str> {
        if let Some(grandparent) = &self.grandparent {
            return grandparent.name.as_deref();
        }
        let path = self.ou_path.as_deref()?;
        if path.len() < 2 {
            return None;
        }
        path.get(path.len() - 2).map(String::as_str)
    }

    /// Immediate-parent ancestry name.
    pub fn ancestry_level_2(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }
}

/// One account as tracked by the billing mirror platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorAccount {
    /// Platform-internal record id.
    pub mirror_id: u64,
    /// Cross-system identifier; `None` when the mirror record is unlinked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl MirrorAccount {
    /// True when the display name is still the unresolved cross-system
    /// identifier placeholder, which is the trigger for enrichment.
    pub fn has_placeholder_name(&self) -> bool {
        matches!(&self.account_id, Some(id) if id.0 == self.name)
    }
}

// ---------------------------------------------------------------------------
// Plan entries
// ---------------------------------------------------------------------------

/// Fixed two-level cost-allocation tag mapping carried by a plan entry.
/// Absent ancestry levels serialize as empty strings, never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanTags {
    #[serde(rename = "ou-level-1")]
    pub ou_level_1: String,
    #[serde(rename = "ou-level-2")]
    pub ou_level_2: String,
}

impl PlanTags {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("ou-level-1".to_string(), self.ou_level_1.clone());
        map.insert("ou-level-2".to_string(), self.ou_level_2.clone());
        map
    }
}

/// One proposed mirror-platform update. Created by the planner, never
/// mutated, serialized once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub aws_id: AccountId,
    pub ch_id: u64,
    pub old_name: String,
    pub new_name: String,
    pub tags: PlanTags,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
