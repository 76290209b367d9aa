//! Ancestry expansion — grandparent lookup and full root-to-parent paths.

use std::collections::HashSet;

use finsync_core::{AncestorRef, Directory, ParentRef, ParentType};

use crate::registry::{UnitRegistry, ROOT_NAME};

/// Resolve the grandparent of an account from its immediate parent.
///
/// Returns `None` for root-parented accounts (a root has no parent) and for
/// parents whose record cannot be resolved. The grandparent's kind is `ROOT`
/// iff its id is a tree root; its name is looked up in the registry, lazily
/// fetched on a miss. A grandparent whose describe call fails still yields a
/// reference, with `name: None`.
pub fn grandparent_of(
    directory: &impl Directory,
    registry: &mut UnitRegistry,
    parent: &ParentRef,
) -> Option<AncestorRef> {
    if parent.kind == ParentType::Root {
        return None;
    }

    let parent_record = registry.resolve_or_fetch(directory, &parent.id)?.clone();
    let grandparent_id = parent_record.parent?;

    let kind = if registry.is_root(&grandparent_id) {
        ParentType::Root
    } else {
        ParentType::OrganizationalUnit
    };
    let name = registry
        .resolve_or_fetch(directory, &grandparent_id)
        .map(|record| record.name.clone());

    Some(AncestorRef {
        id: grandparent_id,
        kind,
        name,
    })
}

/// Expand the full ordered path of unit names from the root down to the
/// account's immediate parent, root name inclusive.
///
/// Root-parented accounts get exactly `["Root"]`. Unknown units encountered
/// on the way up are fetched lazily through the registry; a failed fetch
/// truncates the path at that point (already logged by the registry) rather
/// than failing the operation. A repeated id aborts the walk; the tree
/// invariant rules cycles out, but corrupt parent data must not hang us.
pub fn path_from_root(
    directory: &impl Directory,
    registry: &mut UnitRegistry,
    parent: &ParentRef,
) -> Vec<String> {
    if parent.kind == ParentType::Root {
        return vec![ROOT_NAME.to_string()];
    }

    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(parent.id.clone());

    while let Some(id) = cursor {
        if !seen.insert(id.clone()) {
            tracing::warn!("unit {id} repeats in its own ancestry; aborting path walk");
            break;
        }
        match registry.resolve_or_fetch(directory, &id) {
            Some(record) => {
                names.push(record.name.clone());
                cursor = record.parent.clone();
            }
            None => break,
        }
    }

    names.reverse();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsync_core::{
        AccountId, AccountListing, ApiError, ParentRef, UnitDetail, UnitId, UnitSummary,
    };

    /// Directory that fails every call; exercises the no-fetch paths.
    struct DeadDirectory;

    impl Directory for DeadDirectory {
        fn list_roots(&self) -> Result<Vec<UnitSummary>, ApiError> {
            Err(ApiError::Transport("down".to_string()))
        }
        fn list_units_under(&self, _parent: &UnitId) -> Result<Vec<UnitSummary>, ApiError> {
            Err(ApiError::Transport("down".to_string()))
        }
        fn list_account_children(&self, _parent: &UnitId) -> Result<Vec<AccountId>, ApiError> {
            Err(ApiError::Transport("down".to_string()))
        }
        fn list_accounts(&self) -> Result<Vec<AccountListing>, ApiError> {
            Err(ApiError::Transport("down".to_string()))
        }
        fn describe_unit(&self, id: &UnitId) -> Result<UnitDetail, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }
        fn list_parents_of(&self, _child: &AccountId) -> Result<Vec<ParentRef>, ApiError> {
            Err(ApiError::Transport("down".to_string()))
        }
    }

    fn unit_parent(id: &str) -> ParentRef {
        ParentRef {
            id: UnitId::from(id),
            kind: ParentType::OrganizationalUnit,
        }
    }

    fn seeded_registry() -> UnitRegistry {
        // Root → Security → Logs, fully pre-populated.
        let root = UnitId::from("r-1");
        let mut registry = UnitRegistry::new([root.clone()]);
        registry.insert(
            UnitId::from("ou-sec"),
            "Security".to_string(),
            Some(root.clone()),
        );
        registry.insert(
            UnitId::from("ou-logs"),
            "Logs".to_string(),
            Some(UnitId::from("ou-sec")),
        );
        registry
    }

    #[test]
    fn root_parent_yields_root_only_path_and_no_grandparent() {
        let mut registry = seeded_registry();
        let parent = ParentRef {
            id: UnitId::from("r-1"),
            kind: ParentType::Root,
        };
        assert_eq!(
            path_from_root(&DeadDirectory, &mut registry, &parent),
            vec!["Root".to_string()]
        );
        assert_eq!(grandparent_of(&DeadDirectory, &mut registry, &parent), None);
    }

    #[test]
    fn full_path_walks_to_root() {
        let mut registry = seeded_registry();
        let path = path_from_root(&DeadDirectory, &mut registry, &unit_parent("ou-logs"));
        assert_eq!(path, vec!["Root", "Security", "Logs"]);
    }

    #[test]
    fn grandparent_of_nested_unit() {
        let mut registry = seeded_registry();
        let grandparent =
            grandparent_of(&DeadDirectory, &mut registry, &unit_parent("ou-logs")).expect("some");
        assert_eq!(grandparent.id, UnitId::from("ou-sec"));
        assert_eq!(grandparent.kind, ParentType::OrganizationalUnit);
        assert_eq!(grandparent.name.as_deref(), Some("Security"));
    }

    #[test]
    fn grandparent_of_top_level_unit_is_root() {
        let mut registry = seeded_registry();
        let grandparent =
            grandparent_of(&DeadDirectory, &mut registry, &unit_parent("ou-sec")).expect("some");
        assert_eq!(grandparent.id, UnitId::from("r-1"));
        assert_eq!(grandparent.kind, ParentType::Root);
        assert_eq!(grandparent.name.as_deref(), Some("Root"));
    }

    #[test]
    fn unknown_unit_with_failing_describe_truncates_path() {
        let mut registry = seeded_registry();
        // Parent id that was never discovered; describe fails, path is empty.
        let path = path_from_root(&DeadDirectory, &mut registry, &unit_parent("ou-ghost"));
        assert!(path.is_empty());
    }

    #[test]
    fn cyclic_parent_data_does_not_hang() {
        let root = UnitId::from("r-1");
        let mut registry = UnitRegistry::new([root]);
        // a → b → a, never reaching the root.
        registry.insert(
            UnitId::from("ou-a"),
            "A".to_string(),
            Some(UnitId::from("ou-b")),
        );
        registry.insert(
            UnitId::from("ou-b"),
            "B".to_string(),
            Some(UnitId::from("ou-a")),
        );
        let path = path_from_root(&DeadDirectory, &mut registry, &unit_parent("ou-a"));
        assert_eq!(path, vec!["B", "A"]);
    }
}
