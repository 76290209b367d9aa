//! Breadth-first unit tree discovery.

use std::collections::VecDeque;

use finsync_core::Directory;

use crate::error::ResolveError;
use crate::registry::UnitRegistry;

/// Outcome of a tree build: the populated registry plus how many child
/// listings failed along the way (those nodes were treated as leaves).
#[derive(Debug)]
pub struct UnitTree {
    pub registry: UnitRegistry,
    pub listing_failures: usize,
}

/// Discover the full unit hierarchy via breadth-first traversal.
///
/// Every unit is visited exactly once: the unit graph is a tree, so no
/// dedup is needed on the queue. A failed child-listing call for one node is
/// logged and treated as "no children"; siblings and already-queued nodes
/// still get visited. Fatal only when the roots themselves cannot be listed
/// or the directory has none.
pub fn build_unit_tree(directory: &impl Directory) -> Result<UnitTree, ResolveError> {
    let roots = directory.list_roots().map_err(ResolveError::RootListing)?;
    if roots.is_empty() {
        return Err(ResolveError::NoRoot);
    }

    let mut registry = UnitRegistry::new(roots.iter().map(|root| root.id.clone()));
    let mut queue: VecDeque<_> = roots.into_iter().map(|root| root.id).collect();
    let mut listing_failures = 0;

    while let Some(parent) = queue.pop_front() {
        match directory.list_units_under(&parent) {
            Ok(children) => {
                for child in children {
                    registry.insert(child.id.clone(), child.name, Some(parent.clone()));
                    queue.push_back(child.id);
                }
            }
            Err(err) => {
                tracing::warn!("listing units under {parent} failed, treating as leaf: {err}");
                listing_failures += 1;
            }
        }
    }

    tracing::info!(
        "discovered {} units ({} listing failures)",
        registry.len(),
        listing_failures
    );
    Ok(UnitTree {
        registry,
        listing_failures,
    })
}
