//! Snapshot CSV and plan JSON persistence.
//!
//! Writes use the same atomic `.tmp` + rename pattern as the config store.
//! Absent optional fields render as empty strings, never as a literal
//! "null". Loading tolerates per-row damage (skip + warn) but treats a
//! missing key column as fatal.

use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use finsync_core::{
    AccountId, AccountStatus, AncestorRef, DirectoryAccount, MirrorAccount, ParentRef, ParentType,
    PlanEntry, UnitId,
};

use crate::error::{csv_err, io_err, PlanError};

/// Separator used to render `ou_path` as a single CSV field.
const PATH_SEPARATOR: &str = " / ";

const DIRECTORY_HEADERS: [&str; 9] = [
    "account_id",
    "name",
    "status",
    "parent_id",
    "parent_type",
    "parent_name",
    "grandparent_id",
    "grandparent_name",
    "ou_path",
];

const MIRROR_HEADERS: [&str; 4] = ["ch_id", "account_id", "name", "tags"];

// ---------------------------------------------------------------------------
// Directory snapshot CSV
// ---------------------------------------------------------------------------

/// Write the authoritative snapshot to CSV.
pub fn write_directory_csv(path: &Path, accounts: &[DirectoryAccount]) -> Result<(), PlanError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(DIRECTORY_HEADERS)
        .map_err(|e| csv_err(path, e))?;

    for account in accounts {
        let (parent_id, parent_type) = match &account.parent {
            Some(parent) => (parent.id.0.clone(), parent.kind.as_str().to_string()),
            None => (String::new(), String::new()),
        };
        let (grandparent_id, grandparent_name) = match &account.grandparent {
            Some(grandparent) => (
                grandparent.id.0.clone(),
                grandparent.name.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        let record = [
            account.id.0.clone(),
            account.name.clone(),
            account
                .status
                .map(|status| status.as_str().to_string())
                .unwrap_or_default(),
            parent_id,
            parent_type,
            account.parent_name.clone().unwrap_or_default(),
            grandparent_id,
            grandparent_name,
            account
                .ou_path
                .as_ref()
                .map(|path| path.join(PATH_SEPARATOR))
                .unwrap_or_default(),
        ];
        writer.write_record(&record).map_err(|e| csv_err(path, e))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| io_err(path, std::io::Error::other(e.to_string())))?;
    atomic_write(path, &data)
}

/// Load an authoritative snapshot from CSV.
///
/// Fatal if the `account_id` column is absent; other columns are optional.
/// Rows with a missing/empty id are skipped with a warning.
pub fn load_directory_csv(path: &Path) -> Result<Vec<DirectoryAccount>, PlanError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;
    let headers = reader.headers().map_err(|e| csv_err(path, e))?.clone();

    let column = |name: &str| headers.iter().position(|header| header == name);
    let id_column = column("account_id").ok_or_else(|| PlanError::MissingColumn {
        path: path.to_path_buf(),
        column: "account_id",
    })?;
    let name_column = column("name");
    let status_column = column("status");
    let parent_id_column = column("parent_id");
    let parent_type_column = column("parent_type");
    let parent_name_column = column("parent_name");
    let grandparent_id_column = column("grandparent_id");
    let grandparent_name_column = column("grandparent_name");
    let ou_path_column = column("ou_path");

    let mut accounts = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 2; // header is line 1
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("skipping malformed row {line} in {}: {err}", path.display());
                continue;
            }
        };

        let id = key_field(&record, Some(id_column));
        if id.is_empty() {
            tracing::warn!("skipping row {line} in {}: empty account_id", path.display());
            continue;
        }

        let status = match key_field(&record, status_column).as_str() {
            "" => None,
            raw => match raw.parse::<AccountStatus>() {
                Ok(status) => Some(status),
                Err(err) => {
                    tracing::warn!("row {line} in {}: {err}", path.display());
                    None
                }
            },
        };

        let mut account =
            DirectoryAccount::unresolved(AccountId::from(id), field(&record, name_column), status);

        let parent_id = key_field(&record, parent_id_column);
        if !parent_id.is_empty() {
            match key_field(&record, parent_type_column).parse::<ParentType>() {
                Ok(kind) => {
                    account.parent = Some(ParentRef {
                        id: UnitId::from(parent_id),
                        kind,
                    });
                }
                Err(err) => {
                    tracing::warn!("row {line} in {}: {err}", path.display());
                }
            }
        }

        account.parent_name = non_empty(field(&record, parent_name_column));

        let grandparent_id = key_field(&record, grandparent_id_column);
        let grandparent_name = field(&record, grandparent_name_column);
        if !grandparent_id.is_empty() || !grandparent_name.is_empty() {
            // The grandparent's kind is not a column; the root sentinel name
            // is reserved, so it is recoverable from the name.
            let kind = if grandparent_name == finsync_core::ROOT_NAME {
                ParentType::Root
            } else {
                ParentType::OrganizationalUnit
            };
            account.grandparent = Some(AncestorRef {
                id: UnitId::from(grandparent_id),
                kind,
                name: non_empty(grandparent_name),
            });
        }

        let ou_path = field(&record, ou_path_column);
        if !ou_path.is_empty() {
            account.ou_path = Some(
                ou_path
                    .split(PATH_SEPARATOR)
                    .map(str::to_string)
                    .collect(),
            );
        }

        accounts.push(account);
    }
    Ok(accounts)
}

// ---------------------------------------------------------------------------
// Mirror snapshot CSV
// ---------------------------------------------------------------------------

/// Write the mirror-side snapshot to CSV. Tags render as one JSON object
/// field so the file stays a flat table.
pub fn write_mirror_csv(path: &Path, accounts: &[MirrorAccount]) -> Result<(), PlanError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(MIRROR_HEADERS)
        .map_err(|e| csv_err(path, e))?;

    for account in accounts {
        let record = [
            account.mirror_id.to_string(),
            account
                .account_id
                .as_ref()
                .map(|id| id.0.clone())
                .unwrap_or_default(),
            account.name.clone(),
            serde_json::to_string(&account.tags)?,
        ];
        writer.write_record(&record).map_err(|e| csv_err(path, e))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| io_err(path, std::io::Error::other(e.to_string())))?;
    atomic_write(path, &data)
}

/// Load a mirror snapshot from CSV.
///
/// Fatal if `ch_id` or `account_id` is absent as a column. Rows whose
/// `ch_id` is not an integer are skipped with a warning.
pub fn load_mirror_csv(path: &Path) -> Result<Vec<MirrorAccount>, PlanError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;
    let headers = reader.headers().map_err(|e| csv_err(path, e))?.clone();

    let column = |name: &str| headers.iter().position(|header| header == name);
    let missing = |column: &'static str| PlanError::MissingColumn {
        path: path.to_path_buf(),
        column,
    };
    let ch_id_column = column("ch_id").ok_or_else(|| missing("ch_id"))?;
    let account_id_column = column("account_id").ok_or_else(|| missing("account_id"))?;
    let name_column = column("name");
    let tags_column = column("tags");

    let mut accounts = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("skipping malformed row {line} in {}: {err}", path.display());
                continue;
            }
        };

        let raw_ch_id = key_field(&record, Some(ch_id_column));
        let mirror_id = match raw_ch_id.parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(
                    "skipping row {line} in {}: invalid ch_id '{raw_ch_id}'",
                    path.display()
                );
                continue;
            }
        };

        let tags = match field(&record, tags_column).as_str() {
            "" => Default::default(),
            raw => match serde_json::from_str(raw) {
                Ok(tags) => tags,
                Err(err) => {
                    tracing::warn!("row {line} in {}: unparseable tags: {err}", path.display());
                    Default::default()
                }
            },
        };

        accounts.push(MirrorAccount {
            mirror_id,
            account_id: non_empty(key_field(&record, Some(account_id_column))).map(AccountId::from),
            name: field(&record, name_column),
            tags,
        });
    }
    Ok(accounts)
}

// ---------------------------------------------------------------------------
// Plan JSON
// ---------------------------------------------------------------------------

/// Write the plan document: a pretty-printed JSON array of entries,
/// atomically.
pub fn write_plan(path: &Path, entries: &[PlanEntry]) -> Result<(), PlanError> {
    let json = serde_json::to_string_pretty(entries)?;
    atomic_write(path, json.as_bytes())
}

/// Load a previously written plan document.
pub fn load_plan(path: &Path) -> Result<Vec<PlanEntry>, PlanError> {
    let contents = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Raw field access; display fields round-trip exactly as written.
fn field(record: &StringRecord, index: Option<usize>) -> String {
    index.and_then(|i| record.get(i)).unwrap_or("").to_string()
}

/// For id and enum columns, where surrounding whitespace is never meaningful.
fn key_field(record: &StringRecord, index: Option<usize>) -> String {
    field(record, index).trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), PlanError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    fs::write(&tmp, data).map_err(|e| io_err(&tmp, e))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path, err));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use finsync_core::{AncestorRef, PlanTags};
    use tempfile::TempDir;

    use super::*;

    fn nested_account() -> DirectoryAccount {
        DirectoryAccount {
            id: AccountId::from("111111111111"),
            name: "Prod-Web".to_string(),
            status: Some(AccountStatus::Active),
            parent: Some(ParentRef {
                id: UnitId::from("ou-logs"),
                kind: ParentType::OrganizationalUnit,
            }),
            parent_name: Some("Logs".to_string()),
            grandparent: Some(AncestorRef {
                id: UnitId::from("ou-sec"),
                kind: ParentType::OrganizationalUnit,
                name: Some("Security".to_string()),
            }),
            ou_path: Some(vec![
                "Root".to_string(),
                "Security".to_string(),
                "Logs".to_string(),
            ]),
        }
    }

    fn root_account() -> DirectoryAccount {
        DirectoryAccount {
            id: AccountId::from("222222222222"),
            name: "Sandbox".to_string(),
            status: None,
            parent: Some(ParentRef {
                id: UnitId::from("r-1"),
                kind: ParentType::Root,
            }),
            parent_name: Some("Root".to_string()),
            grandparent: None,
            ou_path: Some(vec!["Root".to_string()]),
        }
    }

    #[test]
    fn directory_csv_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aws.csv");
        let accounts = vec![nested_account(), root_account()];

        write_directory_csv(&path, &accounts).expect("write");
        let loaded = load_directory_csv(&path).expect("load");
        assert_eq!(loaded, accounts);
    }

    #[test]
    fn directory_csv_empty_fields_stay_absent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aws.csv");
        let bare =
            DirectoryAccount::unresolved(AccountId::from("333333333333"), "Gap".to_string(), None);

        write_directory_csv(&path, &[bare.clone()]).expect("write");
        let loaded = load_directory_csv(&path).expect("load");
        assert_eq!(loaded, vec![bare]);
    }

    #[test]
    fn display_names_round_trip_with_surrounding_whitespace() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aws.csv");
        let mut account = nested_account();
        account.name = " Prod-Web ".to_string();
        account.parent_name = Some("Logs  ".to_string());

        write_directory_csv(&path, &[account.clone()]).expect("write");
        let loaded = load_directory_csv(&path).expect("load");
        assert_eq!(loaded, vec![account]);
    }

    #[test]
    fn missing_account_id_column_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.csv");
        fs::write(&path, "id,name\n111,x\n").unwrap();

        let err = load_directory_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            PlanError::MissingColumn { column: "account_id", .. }
        ));
    }

    #[test]
    fn directory_rows_with_empty_id_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gaps.csv");
        fs::write(&path, "account_id,name\n,NoId\n111111111111,Kept\n").unwrap();

        let loaded = load_directory_csv(&path).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Kept");
    }

    #[test]
    fn mirror_csv_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mirror.csv");
        let mut tags = BTreeMap::new();
        tags.insert("ou-level-1".to_string(), "Security".to_string());
        let accounts = vec![
            MirrorAccount {
                mirror_id: 5,
                account_id: Some(AccountId::from("111111111111")),
                name: "111111111111".to_string(),
                tags,
            },
            MirrorAccount {
                mirror_id: 6,
                account_id: None,
                name: "unlinked".to_string(),
                tags: BTreeMap::new(),
            },
        ];

        write_mirror_csv(&path, &accounts).expect("write");
        let loaded = load_mirror_csv(&path).expect("load");
        assert_eq!(loaded, accounts);
    }

    #[test]
    fn mirror_row_with_bad_ch_id_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mirror.csv");
        fs::write(
            &path,
            "ch_id,account_id,name,tags\nnot-a-number,111,x,\n7,222222222222,y,\n",
        )
        .unwrap();

        let loaded = load_mirror_csv(&path).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].mirror_id, 7);
    }

    #[test]
    fn padded_key_fields_are_trimmed_but_names_are_not() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mirror.csv");
        fs::write(
            &path,
            "ch_id,account_id,name,tags\n 5 , 111111111111 , Prod-Web ,\n",
        )
        .unwrap();

        let loaded = load_mirror_csv(&path).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].mirror_id, 5);
        assert_eq!(loaded[0].account_id, Some(AccountId::from("111111111111")));
        assert_eq!(loaded[0].name, " Prod-Web ");
    }

    #[test]
    fn mirror_missing_key_columns_are_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mirror.csv");
        fs::write(&path, "ch_id,name\n5,x\n").unwrap();

        let err = load_mirror_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            PlanError::MissingColumn { column: "account_id", .. }
        ));
    }

    #[test]
    fn plan_roundtrip_and_tmp_cleanup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plan.json");
        let entries = vec![PlanEntry {
            aws_id: AccountId::from("111111111111"),
            ch_id: 5,
            old_name: "111111111111".to_string(),
            new_name: "Prod-Web".to_string(),
            tags: PlanTags {
                ou_level_1: "Security".to_string(),
                ou_level_2: "Logs".to_string(),
            },
        }];

        write_plan(&path, &entries).expect("write");
        assert!(!tmp.path().join("plan.json.tmp").exists());
        let loaded = load_plan(&path).expect("load");
        assert_eq!(loaded, entries);
    }

    #[test]
    fn repeated_plan_writes_are_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let first_path = tmp.path().join("a.json");
        let second_path = tmp.path().join("b.json");
        let entries = vec![PlanEntry {
            aws_id: AccountId::from("111111111111"),
            ch_id: 5,
            old_name: "111111111111".to_string(),
            new_name: "Prod-Web".to_string(),
            tags: PlanTags::default(),
        }];

        write_plan(&first_path, &entries).expect("write a");
        write_plan(&second_path, &entries).expect("write b");
        assert_eq!(
            fs::read(&first_path).unwrap(),
            fs::read(&second_path).unwrap()
        );
    }
}
