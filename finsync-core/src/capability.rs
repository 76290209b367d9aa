//! External capability seams.
//!
//! The resolution engine and the planner never talk to the network
//! themselves; they consume these traits. `finsync-api` provides the real
//! implementations, tests provide scripted fakes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AccountId, AccountStatus, MirrorAccount, ParentRef, UnitId};

/// All errors an external call capability can surface.
///
/// The caller decides whether a given call site treats these as fatal or
/// degrades; the error itself carries no policy. Timeouts arrive as
/// `Transport` and are handled like any other call failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("unexpected response status {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered 2xx but the body was not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// A unit as returned by root/child listing calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub name: String,
}

/// A unit as returned by a describe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDetail {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<UnitId>,
}

/// A bare account record off the directory's flat listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountListing {
    pub id: AccountId,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

/// The authoritative hierarchical account/unit service.
///
/// Listing calls are expected to return fully-drained pages; pagination is
/// an implementation concern of the capability, not of the resolver.
pub trait Directory {
    /// Organization root(s). An empty result is a fatal condition for
    /// callers that need a tree.
    fn list_roots(&self) -> Result<Vec<UnitSummary>, ApiError>;

    /// Immediate child units of a root or unit.
    fn list_units_under(&self, parent: &UnitId) -> Result<Vec<UnitSummary>, ApiError>;

    /// Immediate child accounts of a root or unit.
    fn list_account_children(&self, parent: &UnitId) -> Result<Vec<AccountId>, ApiError>;

    /// The flat organization-wide account listing.
    fn list_accounts(&self) -> Result<Vec<AccountListing>, ApiError>;

    /// Name and parent of a single unit; used for lazy cache fills.
    fn describe_unit(&self, id: &UnitId) -> Result<UnitDetail, ApiError>;

    /// Ordered parent list for one account; fallback-only, first entry wins.
    fn list_parents_of(&self, child: &AccountId) -> Result<Vec<ParentRef>, ApiError>;
}

/// Partial update pushed to a mirror account record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
}

/// The billing/management platform mirroring the directory's accounts.
pub trait MirrorPlatform {
    fn list_accounts(&self) -> Result<Vec<MirrorAccount>, ApiError>;

    fn update_account(&self, mirror_id: u64, update: &AccountUpdate) -> Result<(), ApiError>;
}
