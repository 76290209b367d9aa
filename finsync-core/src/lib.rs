//! Finsync core library — domain types, capability traits, config, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs shared by every stage
//! - [`capability`] — the [`Directory`] and [`MirrorPlatform`] seams
//! - [`config`] — `~/.finsync/config.yaml` load / save / init
//! - [`error`] — [`ConfigError`]

pub mod capability;
pub mod config;
pub mod error;
pub mod types;

pub use capability::{
    AccountListing, AccountUpdate, ApiError, Directory, MirrorPlatform, UnitDetail, UnitSummary,
};
pub use error::ConfigError;
pub use types::{
    AccountId, AccountStatus, AncestorRef, DirectoryAccount, MirrorAccount, ParentRef, ParentType,
    PlanEntry, PlanTags, UnitId, ROOT_NAME,
};
