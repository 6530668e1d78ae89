//! File persistence for the decision store.
//!
//! - `load` parses and migrates `decision-store.json`; a missing file is an
//!   empty store.
//! - `save` writes a temp file in the same directory, fsyncs it and renames it
//!   over the target, so readers see either the old or the new file.
//! - `lock` takes an exclusive OS lock on `<store>.lock`. Mutations hold it
//!   across load, save and the audit append; readers never lock.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StoreError;
use crate::schema::{self, CURRENT_SCHEMA_VERSION};
use crate::store::DecisionStore;

/// Handle on the persisted store file.
#[derive(Debug, Clone)]
pub struct StoreFile {
    path: PathBuf,
}

/// Exclusive lock on the store. Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    // Closing the descriptor releases the lock.
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling lock file: `decision-store.json.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Block until the exclusive store lock is held.
    pub fn lock(&self) -> Result<StoreLock, StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;

        FileExt::lock_exclusive(&file).map_err(|e| StoreError::io(&lock_path, e))?;
        tracing::debug!(lock = %lock_path.display(), "Acquired decision store lock");

        Ok(StoreLock {
            _file: file,
            path: lock_path,
        })
    }

    /// Load and migrate the store.
    pub fn load(&self) -> Result<DecisionStore, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No decision store at {}, starting empty",
                    self.path.display()
                );
                return Ok(DecisionStore::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let (store, found) = schema::parse(&content).map_err(|source| StoreError::Schema {
            path: self.path.clone(),
            source,
        })?;

        if found < CURRENT_SCHEMA_VERSION {
            tracing::info!(
                "Migrated decision store {} from schema {} to {}",
                self.path.display(),
                found,
                CURRENT_SCHEMA_VERSION
            );
        }
        tracing::debug!(
            "Loaded {} decisions from {}",
            store.len(),
            self.path.display()
        );

        Ok(store)
    }

    /// Unlocked load for read-only callers.
    ///
    /// A writer may replace the file while it is being read; the parse is
    /// retried once before the error is returned.
    pub fn load_snapshot(&self) -> Result<DecisionStore, StoreError> {
        retry_once(|| self.load())
    }

    /// Atomically replace the store file with `store`.
    pub fn save(&self, store: &DecisionStore) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut bytes = serde_json::to_vec_pretty(store)
            .map_err(|e| StoreError::io(&self.path, std::io::Error::other(e)))?;
        bytes.push(b'\n');

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        tracing::debug!(
            "Saved {} decisions to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Run `read`, and run it a second time if the first attempt fails.
fn retry_once<T>(mut read: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
    match read() {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::debug!("Retrying decision store read after: {}", first);
            read()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use riskgate_core::{Decision, DecisionKind, DecisionStatus, Severity};
    use std::collections::BTreeMap;

    fn sample(id: &str) -> Decision {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        Decision {
            id: id.to_string(),
            kind: DecisionKind::RiskAcceptance,
            risk_category: "compliance".to_string(),
            title: "SOC2 log retention gap".to_string(),
            description: "Retention is 60 days instead of 90".to_string(),
            severity: Severity::High,
            status: DecisionStatus::Active,
            accepted_by: "ciso@example.com".to_string(),
            accepted_at: at,
            expires_at: at + chrono::Duration::days(30),
            follow_up_action: "Extend retention in logging pipeline".to_string(),
            renewed_from: None,
            renewal_count: 0,
            closed_at: None,
            closed_by: None,
            close_reason: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("decision-store.json"));
        let store = file.load().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.schema_version(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("state").join("decision-store.json"));

        let mut store = DecisionStore::new();
        store.insert(sample("r-1"));
        store.insert(sample("r-2"));
        file.save(&store).unwrap();

        assert_eq!(file.load().unwrap(), store);
        assert_eq!(file.load_snapshot().unwrap(), store);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("decision-store.json"));
        file.save(&DecisionStore::new()).unwrap();
        file.save(&DecisionStore::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["decision-store.json".to_string()]);
    }

    #[test]
    fn test_schema_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decision-store.json");
        fs::write(&path, r#"{"schemaVersion":"3.0","decisions":[]}"#).unwrap();

        let err = StoreFile::new(&path).load_snapshot().unwrap_err();
        match err {
            StoreError::Schema { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_recovers_from_torn_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decision-store.json");
        let file = StoreFile::new(&path);

        let mut saved = DecisionStore::new();
        saved.insert(sample("r-1"));

        // A writer replaces a half-written file between the two attempts.
        fs::write(&path, r#"{"schemaVersion":"1.1","decisions":[{"id":"#).unwrap();
        let mut attempts = 0;
        let store = retry_once(|| {
            attempts += 1;
            if attempts == 2 {
                file.save(&saved)?;
            }
            file.load()
        })
        .unwrap();

        assert_eq!(attempts, 2);
        assert_eq!(store, saved);
    }

    #[test]
    fn test_snapshot_gives_up_after_second_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decision-store.json");
        fs::write(&path, "{ not json").unwrap();
        let file = StoreFile::new(&path);

        let mut attempts = 0;
        let err = retry_once(|| {
            attempts += 1;
            file.load()
        })
        .unwrap_err();

        assert_eq!(attempts, 2);
        assert!(matches!(err, StoreError::Schema { path: ref p, .. } if *p == path));
        assert!(matches!(
            file.load_snapshot().unwrap_err(),
            StoreError::Schema { .. }
        ));
    }

    #[test]
    fn test_first_successful_read_is_not_repeated() {
        let mut attempts = 0;
        let value = retry_once(|| {
            attempts += 1;
            Ok::<_, StoreError>(attempts)
        })
        .unwrap();
        assert_eq!((value, attempts), (1, 1));
    }

    #[test]
    fn test_lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::new(dir.path().join("decision-store.json"));
        assert_eq!(
            file.lock_path(),
            dir.path().join("decision-store.json.lock")
        );

        let guard = file.lock().unwrap();
        let other = OpenOptions::new()
            .write(true)
            .open(guard.path())
            .unwrap();
        assert!(FileExt::try_lock_exclusive(&other).is_err());

        drop(guard);
        assert!(FileExt::try_lock_exclusive(&other).is_ok());
    }
}
