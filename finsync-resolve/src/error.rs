//! Error types for finsync-resolve.
//!
//! Only unrecoverable setup/listing failures surface as `ResolveError`;
//! everything stage-scoped degrades to warnings and gap fields instead.

use thiserror::Error;

use finsync_core::ApiError;

/// Fatal resolution failures. A run that returns one of these produced no
/// partial output.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The root-listing call itself failed; no tree can be built.
    #[error("failed to list organization roots: {0}")]
    RootListing(#[source] ApiError),

    /// The directory reported no organization root.
    #[error("directory returned no organization root")]
    NoRoot,

    /// The flat account listing failed; no snapshot can be built.
    #[error("failed to list directory accounts: {0}")]
    AccountListing(#[source] ApiError),
}
