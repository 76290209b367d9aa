//! Single-pass reconciliation diff.

use std::collections::{HashMap, HashSet};

use finsync_core::{AccountId, DirectoryAccount, MirrorAccount, PlanEntry, PlanTags};

/// Result of one planner run: the update plan plus the match bookkeeping the
/// caller reports. Unmatched records are counted, never planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub entries: Vec<PlanEntry>,
    /// Directory accounts with a mirror counterpart (planned or not).
    pub matched: usize,
    /// Directory accounts with no mirror counterpart.
    pub unmatched_directory: usize,
    /// Linked mirror records with no directory counterpart.
    pub unmatched_mirror: usize,
    /// Mirror records skipped for having no cross-system identifier.
    pub skipped_mirror: usize,
}

/// Diff the two snapshots and emit the minimal update plan.
///
/// Join key is the cross-system account identifier. A plan entry is emitted
/// only when the mirror record's name still equals that identifier, i.e.
/// the name is an unresolved placeholder; already human-named records are
/// left untouched. Entries follow the directory snapshot's original order,
/// so identical inputs produce byte-identical serialized plans.
pub fn generate_plan(
    directory_accounts: &[DirectoryAccount],
    mirror_accounts: &[MirrorAccount],
) -> PlanOutcome {
    let mut mirror_by_id: HashMap<&AccountId, &MirrorAccount> = HashMap::new();
    let mut skipped_mirror = 0;
    for mirror in mirror_accounts {
        match &mirror.account_id {
            Some(id) if !id.0.is_empty() => {
                mirror_by_id.insert(id, mirror);
            }
            _ => {
                tracing::warn!(
                    "mirror record {} ('{}') has no cross-system identifier; skipping",
                    mirror.mirror_id,
                    mirror.name
                );
                skipped_mirror += 1;
            }
        }
    }

    let mut entries = Vec::new();
    let mut matched = 0;
    let mut unmatched_directory = 0;
    let mut matched_ids: HashSet<&AccountId> = HashSet::new();

    for account in directory_accounts {
        let Some(mirror) = mirror_by_id.get(&account.id) else {
            tracing::info!(
                "directory account {} ('{}') not found on the mirror platform",
                account.id,
                account.name
            );
            unmatched_directory += 1;
            continue;
        };
        matched += 1;
        matched_ids.insert(&account.id);

        if !mirror.has_placeholder_name() {
            tracing::debug!(
                "mirror record {} already named '{}'; leaving untouched",
                mirror.mirror_id,
                mirror.name
            );
            continue;
        }

        entries.push(PlanEntry {
            aws_id: account.id.clone(),
            ch_id: mirror.mirror_id,
            old_name: mirror.name.clone(),
            new_name: account.name.clone(),
            tags: PlanTags {
                ou_level_1: account.ancestry_level_1().unwrap_or_default().to_string(),
                ou_level_2: account.ancestry_level_2().unwrap_or_default().to_string(),
            },
        });
    }

    let mut unmatched_mirror = 0;
    for (id, mirror) in &mirror_by_id {
        if !matched_ids.contains(*id) {
            tracing::warn!(
                "mirror record {} ('{}') not found in the directory snapshot",
                mirror.mirror_id,
                mirror.name
            );
            unmatched_mirror += 1;
        }
    }

    PlanOutcome {
        entries,
        matched,
        unmatched_directory,
        unmatched_mirror,
        skipped_mirror,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use finsync_core::{AncestorRef, ParentType, UnitId};

    use super::*;

    fn directory_account(id: &str, name: &str) -> DirectoryAccount {
        let mut account = DirectoryAccount::unresolved(AccountId::from(id), name.to_string(), None);
        account.parent_name = Some("Logs".to_string());
        account.grandparent = Some(AncestorRef {
            id: UnitId::from("ou-sec"),
            kind: ParentType::OrganizationalUnit,
            name: Some("Security".to_string()),
        });
        account
    }

    fn mirror_account(mirror_id: u64, account_id: &str, name: &str) -> MirrorAccount {
        MirrorAccount {
            mirror_id,
            account_id: Some(AccountId::from(account_id)),
            name: name.to_string(),
            tags: BTreeMap::new(),
        }
    }

    // Placeholder name still present on the mirror → entry emitted.
    #[test]
    fn placeholder_mirror_name_produces_entry() {
        let directory = vec![directory_account("111111111111", "Prod-Web")];
        let mirror = vec![mirror_account(5, "111111111111", "111111111111")];

        let outcome = generate_plan(&directory, &mirror);
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.entries.len(), 1);

        let entry = &outcome.entries[0];
        assert_eq!(entry.ch_id, 5);
        assert_eq!(entry.old_name, "111111111111");
        assert_eq!(entry.new_name, "Prod-Web");
        assert_eq!(entry.tags.ou_level_1, "Security");
        assert_eq!(entry.tags.ou_level_2, "Logs");
    }

    // Mirror already carries a human name → left untouched.
    #[test]
    fn human_named_mirror_record_is_left_alone() {
        let directory = vec![directory_account("111111111111", "Prod-Web")];
        let mirror = vec![mirror_account(5, "111111111111", "Prod-Web-Legacy")];

        let outcome = generate_plan(&directory, &mirror);
        assert_eq!(outcome.matched, 1);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn unmatched_records_are_counted_not_planned() {
        let directory = vec![
            directory_account("111111111111", "Prod-Web"),
            directory_account("333333333333", "Orphan"),
        ];
        let mirror = vec![
            mirror_account(5, "111111111111", "111111111111"),
            mirror_account(9, "444444444444", "444444444444"),
        ];

        let outcome = generate_plan(&directory, &mirror);
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.unmatched_directory, 1);
        assert_eq!(outcome.unmatched_mirror, 1);
        assert_eq!(outcome.entries.len(), 1);
    }

    #[test]
    fn mirror_record_without_join_key_is_skipped() {
        let directory = vec![directory_account("111111111111", "Prod-Web")];
        let mirror = vec![
            MirrorAccount {
                mirror_id: 7,
                account_id: None,
                name: "unlinked".to_string(),
                tags: BTreeMap::new(),
            },
            MirrorAccount {
                mirror_id: 8,
                account_id: Some(AccountId::from("")),
                name: "empty-key".to_string(),
                tags: BTreeMap::new(),
            },
        ];

        let outcome = generate_plan(&directory, &mirror);
        assert_eq!(outcome.skipped_mirror, 2);
        assert_eq!(outcome.unmatched_directory, 1);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn absent_ancestry_serializes_as_empty_strings() {
        let mut account =
            DirectoryAccount::unresolved(AccountId::from("111111111111"), "Prod-Web".to_string(), None);
        account.parent_name = Some("Root".to_string());
        let mirror = vec![mirror_account(5, "111111111111", "111111111111")];

        let outcome = generate_plan(&[account], &mirror);
        let entry = &outcome.entries[0];
        assert_eq!(entry.tags.ou_level_1, "");
        assert_eq!(entry.tags.ou_level_2, "Root");
    }

    #[test]
    fn plan_is_deterministic_and_idempotent() {
        let directory = vec![
            directory_account("111111111111", "Prod-Web"),
            directory_account("222222222222", "Prod-Db"),
        ];
        let mirror = vec![
            mirror_account(5, "111111111111", "111111111111"),
            mirror_account(6, "222222222222", "222222222222"),
        ];

        let first = generate_plan(&directory, &mirror);
        let second = generate_plan(&directory, &mirror);
        assert_eq!(first, second);

        let first_json = serde_json::to_string_pretty(&first.entries).expect("json");
        let second_json = serde_json::to_string_pretty(&second.entries).expect("json");
        assert_eq!(first_json, second_json, "plan output must be byte-identical");

        // Directory listing order is preserved.
        assert_eq!(first.entries[0].ch_id, 5);
        assert_eq!(first.entries[1].ch_id, 6);
    }
}
