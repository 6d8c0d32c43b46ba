//! File-per-owner JSON record store.
//!
//! Each owner's full [`OwnerRecord`] lives in `owner_<id>.json` under the
//! store's root directory. Reads of missing or corrupt records fall back to
//! the default record (defaults are safe and inert), and every write is a
//! read-modify-write of the full record against the current on-disk state,
//! so a writer can never clobber sibling fields written concurrently by
//! another component.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sentinel_core::error::{Result, SentinelError};
use sentinel_core::models::{Alert, OwnerId, OwnerRecord};

/// Durable store of one [`OwnerRecord`] per owner id.
///
/// # Example
/// ```no_run
/// use sentinel_store::OwnerStore;
///
/// let store = OwnerStore::new("/var/lib/chat-sentinel/owners").unwrap();
/// let record = store.load(42);
/// println!("keywords: {:?}", record.keywords);
/// ```
pub struct OwnerStore {
    root: PathBuf,
    /// One write lock per owner. The monitoring engine and the scheduler are
    /// concurrent writers to the same owner's record; serialising the whole
    /// read-modify-write per owner keeps the record file intact and keeps
    /// every writer's snapshot current.
    write_locks: Mutex<HashMap<OwnerId, Arc<Mutex<()>>>>,
}

impl OwnerStore {
    /// Open (and create, if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Directory the store persists into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `owner`.
    pub fn record_path(&self, owner: OwnerId) -> PathBuf {
        self.root.join(format!("owner_{owner}.json"))
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    /// Load the record for `owner`.
    ///
    /// A missing file yields the default record (lazy creation happens on
    /// the first write). An unreadable or corrupt file also yields the
    /// default record, logged at warn; callers never see a storage error on
    /// the read path.
    pub fn load(&self, owner: OwnerId) -> OwnerRecord {
        let path = self.record_path(owner);
        if !path.exists() {
            return OwnerRecord::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        owner,
                        error = %e,
                        path = %path.display(),
                        "corrupt owner record; using defaults"
                    );
                    OwnerRecord::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    owner,
                    error = %e,
                    path = %path.display(),
                    "failed to read owner record; using defaults"
                );
                OwnerRecord::default()
            }
        }
    }

    /// Enumerate every owner id with a record on disk, in ascending order.
    ///
    /// The order is stable within a tick so the scheduler visits owners
    /// deterministically. An unreadable data directory yields an empty list,
    /// logged at warn.
    pub fn list_owner_ids(&self) -> Vec<OwnerId> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.root.display(),
                    "failed to enumerate owner records"
                );
                return Vec::new();
            }
        };

        let mut ids: Vec<OwnerId> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_owner_id(&entry.file_name().to_string_lossy()))
            .collect();
        ids.sort_unstable();
        ids
    }

    // ── Writes ─────────────────────────────────────────────────────────────

    /// Apply `mutate` to the current on-disk record for `owner` and persist
    /// the merged result as a full-record rewrite.
    ///
    /// Updates to one owner are serialised: the record is re-read under the
    /// owner's write lock immediately before mutation, so a concurrent
    /// writer to *other* fields is never lost and no writer ever persists a
    /// stale snapshot. Conflicting writes to the same field are
    /// last-write-wins. Returns the record as persisted.
    pub fn update<F>(&self, owner: OwnerId, mutate: F) -> Result<OwnerRecord>
    where
        F: FnOnce(&mut OwnerRecord),
    {
        let lock = self.write_lock(owner);
        let _guard = lock.lock().expect("owner write lock poisoned");

        let mut record = self.load(owner);
        mutate(&mut record);
        self.persist(owner, &record)?;
        Ok(record)
    }

    /// Append one alert to the owner's append-only alert log.
    pub fn append_alert(&self, owner: OwnerId, alert: Alert) -> Result<()> {
        self.update(owner, |record| record.alerts.push(alert))?;
        Ok(())
    }

    // ── Private helpers ────────────────────────────────────────────────────

    /// The write lock for `owner`, created on first use.
    fn write_lock(&self, owner: OwnerId) -> Arc<Mutex<()>> {
        self.write_locks
            .lock()
            .expect("write lock map poisoned")
            .entry(owner)
            .or_default()
            .clone()
    }

    /// Write the full record to a temp file, then rename into place so the
    /// record file is never observed half-written. Only ever called under
    /// the owner's write lock, so the temp path has a single writer.
    fn persist(&self, owner: OwnerId, record: &OwnerRecord) -> Result<()> {
        let path = self.record_path(owner);
        let json = serde_json::to_string_pretty(record)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|source| SentinelError::RecordWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| SentinelError::RecordWrite { path, source })?;
        Ok(())
    }
}

/// Parse `owner_<id>.json` filenames; anything else is ignored.
fn parse_owner_id(file_name: &str) -> Option<OwnerId> {
    file_name
        .strip_prefix("owner_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}
