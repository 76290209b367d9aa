//! Directory snapshot orchestration.
//!
//! Pipeline: build the unit tree once, build the bulk parent index once,
//! page through the flat account listing once, and resolve each account's
//! ancestry from the caches (with lazy fallback for anything the bulk phase
//! missed).

use chrono::{DateTime, Utc};

use finsync_core::{Directory, DirectoryAccount, ParentType};

use crate::ancestry::{grandparent_of, path_from_root};
use crate::error::ResolveError;
use crate::parents::build_parent_index;
use crate::registry::ROOT_NAME;
use crate::tree::build_unit_tree;

/// Which derived ancestry fields a snapshot populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestryMode {
    /// Fill `grandparent` only.
    Grandparent,
    /// Fill `ou_path` (ordered unit names, root inclusive).
    FullPath,
}

/// The authoritative account list plus degradation counters. Counters being
/// zero means every account resolved through the bulk path with no gaps.
#[derive(Debug)]
pub struct DirectorySnapshot {
    pub accounts: Vec<DirectoryAccount>,
    pub captured_at: DateTime<Utc>,
    /// Units known at the end of the run, roots and lazy fills included.
    pub unit_count: usize,
    /// Failed child listings across tree build and bulk parent phase.
    pub listing_failures: usize,
    /// Accounts resolved via the per-account fallback lookup.
    pub fallback_resolutions: usize,
    /// Accounts whose parent could not be resolved at all.
    pub unresolved_parents: usize,
}

/// Build the enriched authoritative snapshot.
///
/// Fatal only on root/account listing failures; everything else degrades to
/// warnings, empty fields, and counters.
pub fn build_directory_snapshot(
    directory: &impl Directory,
    mode: AncestryMode,
) -> Result<DirectorySnapshot, ResolveError> {
    let captured_at = Utc::now();

    let tree = build_unit_tree(directory)?;
    let mut registry = tree.registry;
    let mut index = build_parent_index(directory, &registry);

    let listed = directory
        .list_accounts()
        .map_err(ResolveError::AccountListing)?;
    tracing::info!("retrieved {} directory accounts", listed.len());

    let mut accounts = Vec::with_capacity(listed.len());
    let mut unresolved_parents = 0;

    for record in listed {
        let mut account = DirectoryAccount::unresolved(record.id, record.name, record.status);
        let parent = index.resolve(directory, &account.id);

        match &parent {
            None => {
                unresolved_parents += 1;
            }
            Some(parent_ref) if parent_ref.kind == ParentType::Root => {
                account.parent_name = Some(ROOT_NAME.to_string());
                if mode == AncestryMode::FullPath {
                    account.ou_path = Some(vec![ROOT_NAME.to_string()]);
                }
            }
            Some(parent_ref) => {
                account.parent_name = registry
                    .resolve_or_fetch(directory, &parent_ref.id)
                    .map(|unit| unit.name.clone());
                match mode {
                    AncestryMode::Grandparent => {
                        account.grandparent = grandparent_of(directory, &mut registry, parent_ref);
                    }
                    AncestryMode::FullPath => {
                        account.ou_path =
                            Some(path_from_root(directory, &mut registry, parent_ref));
                    }
                }
            }
        }

        account.parent = parent;
        accounts.push(account);
    }

    Ok(DirectorySnapshot {
        accounts,
        captured_at,
        unit_count: registry.len(),
        listing_failures: tree.listing_failures + index.listing_failures(),
        fallback_resolutions: index.fallback_resolutions(),
        unresolved_parents,
    })
}
