//! # finsync-resolve
//!
//! Organizational-hierarchy resolution engine.
//!
//! Call [`build_directory_snapshot`] to turn a [`Directory`] capability into
//! a flat list of accounts enriched with their immediate parent, grandparent,
//! and/or full unit path. The lower-level stages ([`build_unit_tree`],
//! [`build_parent_index`], [`ancestry`]) are public for callers that need
//! only part of the pipeline.
//!
//! [`Directory`]: finsync_core::Directory

pub mod ancestry;
pub mod error;
pub mod parents;
pub mod registry;
pub mod snapshot;
pub mod tree;

pub use error::ResolveError;
pub use parents::{build_parent_index, ParentIndex};
pub use registry::{UnitRegistry, ROOT_NAME};
pub use snapshot::{build_directory_snapshot, AncestryMode, DirectorySnapshot};
pub use tree::{build_unit_tree, UnitTree};
