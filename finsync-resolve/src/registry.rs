//! Unit registry — the owned cache of discovered units.
//!
//! All lazy lookups go through [`UnitRegistry::resolve_or_fetch`], so a unit
//! discovered late (outside the breadth-first traversal) is described at most
//! once and every call site sees the same cached record afterward.

use std::collections::{HashMap, HashSet};

use finsync_core::{Directory, UnitId};

pub use finsync_core::ROOT_NAME;

/// Cached name + parent of one unit. Roots carry [`ROOT_NAME`] and no parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub name: String,
    pub parent: Option<UnitId>,
}

/// Lookup table of every unit known to this resolution run.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    roots: HashSet<UnitId>,
    units: HashMap<UnitId, UnitRecord>,
}

impl UnitRegistry {
    /// New registry seeded with the organization root id(s).
    pub fn new(roots: impl IntoIterator<Item = UnitId>) -> Self {
        let roots: HashSet<UnitId> = roots.into_iter().collect();
        let units = roots
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    UnitRecord {
                        name: ROOT_NAME.to_string(),
                        parent: None,
                    },
                )
            })
            .collect();
        Self { roots, units }
    }

    /// Record a unit discovered by traversal.
    pub fn insert(&mut self, id: UnitId, name: String, parent: Option<UnitId>) {
        self.units.insert(id, UnitRecord { name, parent });
    }

    pub fn is_root(&self, id: &UnitId) -> bool {
        self.roots.contains(id)
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn get(&self, id: &UnitId) -> Option<&UnitRecord> {
        self.units.get(id)
    }

    pub fn name_of(&self, id: &UnitId) -> Option<&str> {
        self.units.get(id).map(|record| record.name.as_str())
    }

    /// Every known unit id, roots included. Iteration order is unspecified.
    pub fn ids(&self) -> impl Iterator<Item = &UnitId> {
        self.units.keys()
    }

    /// Number of known units, roots included.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Return the cached record for `id`, or describe it once and cache the
    /// result. Idempotent: repeated calls for the same id issue at most one
    /// describe call.
    ///
    /// A failed describe is logged and yields `None`; nothing is cached so a
    /// later run may retry.
    pub fn resolve_or_fetch(
        &mut self,
        directory: &impl Directory,
        id: &UnitId,
    ) -> Option<&UnitRecord> {
        if !self.units.contains_key(id) {
            match directory.describe_unit(id) {
                Ok(detail) => {
                    self.units.insert(
                        id.clone(),
                        UnitRecord {
                            name: detail.name,
                            parent: detail.parent,
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!("describe failed for unit {id}: {err}");
                    return None;
                }
            }
        }
        self.units.get(id)
    }
}
