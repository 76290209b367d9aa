//! # finsync-api
//!
//! Concrete capability implementations:
//! - [`MirrorClient`] — blocking HTTP client for the billing mirror platform
//! - [`FileDirectory`] — serves the directory capability from an
//!   organization export document, for offline snapshot runs

pub mod export;
pub mod mirror;

pub use export::{ExportError, FileDirectory};
pub use mirror::MirrorClient;
