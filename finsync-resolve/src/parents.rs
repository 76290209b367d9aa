//! Account → immediate parent resolution.
//!
//! Bulk phase first: one account-child listing per known unit, O(units)
//! calls total. The per-account `list_parents_of` fallback exists only for
//! accounts the bulk map missed (a failed listing in the bulk phase, or a
//! detached account) and is invoked lazily.

use std::collections::HashMap;

use finsync_core::{AccountId, Directory, ParentRef, ParentType};

use crate::registry::UnitRegistry;

/// Bulk account→parent map with lazy fallback.
#[derive(Debug)]
pub struct ParentIndex {
    bulk: HashMap<AccountId, ParentRef>,
    listing_failures: usize,
    fallback_resolutions: usize,
}

/// Build the bulk map: for every root and unit in `registry`, list its
/// account children once and record their parent reference. Kind is `ROOT`
/// only for direct children of a root.
///
/// Per-node listing failures are logged and counted, never fatal: the
/// affected accounts are simply absent from the bulk map and resolve via
/// fallback later.
pub fn build_parent_index(directory: &impl Directory, registry: &UnitRegistry) -> ParentIndex {
    let mut bulk = HashMap::new();
    let mut listing_failures = 0;

    for unit_id in registry.ids() {
        let kind = if registry.is_root(unit_id) {
            ParentType::Root
        } else {
            ParentType::OrganizationalUnit
        };
        match directory.list_account_children(unit_id) {
            Ok(children) => {
                for account in children {
                    bulk.insert(
                        account,
                        ParentRef {
                            id: unit_id.clone(),
                            kind,
                        },
                    );
                }
            }
            Err(err) => {
                tracing::warn!("listing accounts under {unit_id} failed: {err}");
                listing_failures += 1;
            }
        }
    }

    tracing::info!(
        "bulk parent map covers {} accounts ({} listing failures)",
        bulk.len(),
        listing_failures
    );
    ParentIndex {
        bulk,
        listing_failures,
        fallback_resolutions: 0,
    }
}

impl ParentIndex {
    /// Resolve one account's immediate parent.
    ///
    /// The bulk map is authoritative; only on a miss is a single
    /// `list_parents_of` call issued (first returned parent wins). Fallback
    /// failure is logged and yields `None`; the account's derived fields
    /// stay empty.
    pub fn resolve(
        &mut self,
        directory: &impl Directory,
        account: &AccountId,
    ) -> Option<ParentRef> {
        if let Some(parent) = self.bulk.get(account) {
            return Some(parent.clone());
        }

        match directory.list_parents_of(account) {
            Ok(parents) => match parents.into_iter().next() {
                Some(parent) => {
                    self.fallback_resolutions += 1;
                    tracing::debug!("resolved {account} via fallback parent lookup");
                    Some(parent)
                }
                None => {
                    tracing::warn!("no parent reported for account {account}");
                    None
                }
            },
            Err(err) => {
                tracing::warn!("fallback parent lookup failed for {account}: {err}");
                None
            }
        }
    }

    /// Accounts covered by the bulk phase.
    pub fn bulk_len(&self) -> usize {
        self.bulk.len()
    }

    /// Bulk-phase child listings that failed.
    pub fn listing_failures(&self) -> usize {
        self.listing_failures
    }

    /// Accounts resolved through the per-account fallback so far.
    pub fn fallback_resolutions(&self) -> usize {
        self.fallback_resolutions
    }
}
