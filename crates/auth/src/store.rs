//! File-backed credential store.
//!
//! Concurrency-safe map from hashed credential key to identity record,
//! loaded from a line-oriented user file. One `RwLock` guards the table and
//! the file's recorded modified-marker together; lookups take the read path,
//! inserts and the reload swap take the write path. The lock is never held
//! across file I/O: a reload parses the whole file into a fresh table first
//! and only then swaps it in, so readers observe either the old snapshot or
//! the new one, never a mix.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use zonegate_core::Level;

use crate::error::{AuthError, AuthResult};
use crate::hash::hash_code;
use crate::record::UserRecord;

/// Table snapshot plus the mtime it was loaded at, swapped as one unit.
struct TableState {
    /// Hashed credential key -> record; one record may be indexed under
    /// several keys
    users: HashMap<String, Arc<UserRecord>>,
    /// User-file mtime recorded at load time
    modified: Option<SystemTime>,
}

/// Concurrency-safe, file-backed map from hashed credential to record.
///
/// Construction fails if the user file is missing or unreadable; a store
/// that cannot load its file is never handed to callers.
pub struct CredentialStore {
    path: PathBuf,
    state: RwLock<TableState>,
}

impl CredentialStore {
    /// Open the store, reading the full user file.
    ///
    /// Logs the total and per-level record counts on success.
    pub fn open<P: AsRef<Path>>(path: P) -> AuthResult<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Reading user file {}", path.display());
        let (users, modified) = load_table(&path)?;
        log_counts(&users);
        Ok(Self {
            path,
            state: RwLock::new(TableState { users, modified }),
        })
    }

    /// Look up a record by raw credential.
    ///
    /// Returns a copy, so callers cannot mutate store state through it or
    /// observe a torn read during a concurrent reload.
    pub fn lookup(&self, raw_code: &str) -> Option<UserRecord> {
        let key = hash_code(raw_code);
        let state = self.state.read().ok()?;
        state.users.get(&key).map(|user| (**user).clone())
    }

    /// Insert a record under every one of its hashed codes.
    ///
    /// All-or-nothing: if any code is already mapped, the whole insert is
    /// rejected and the table is left untouched.
    pub fn insert(&self, record: UserRecord) -> AuthResult<()> {
        let mut state = self.state.write().map_err(|_| AuthError::LockPoisoned)?;
        for code in &record.codes {
            if state.users.contains_key(code) {
                warn!("Ignoring record with already-used code");
                return Err(AuthError::DuplicateCode);
            }
        }
        let record = Arc::new(record);
        for code in &record.codes {
            state.users.insert(code.clone(), Arc::clone(&record));
        }
        Ok(())
    }

    /// Reload the table if the user file changed since the last load.
    ///
    /// Lazy and best-effort: called opportunistically before a lookup, and
    /// any stat/read failure leaves the previous snapshot authoritative.
    /// The new table is built off the lock and swapped in atomically.
    pub fn reload_if_changed(&self) {
        let modified = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.modified().ok(),
            Err(_) => return,
        };
        {
            let Ok(state) = self.state.read() else {
                return;
            };
            if state.modified == modified {
                return;
            }
        }
        info!("Refreshing changed user file {}", self.path.display());
        let (users, modified) = match load_table(&self.path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("Reload failed, keeping previous table: {}", err);
                return;
            }
        };
        log_counts(&users);
        if let Ok(mut state) = self.state.write() {
            state.users = users;
            state.modified = modified;
        }
    }

    /// Append one record line to the user file.
    ///
    /// Append-only: existing lines are never rewritten. The recorded
    /// modified-marker is advanced to the post-write mtime so the next
    /// [`CredentialStore::reload_if_changed`] does not mistake our own write
    /// for an external change.
    pub fn append(&self, record: &UserRecord) -> AuthResult<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        file.flush()?;

        let modified = std::fs::metadata(&self.path)
            .ok()
            .and_then(|meta| meta.modified().ok());
        if let Ok(mut state) = self.state.write() {
            state.modified = modified;
        }
        Ok(())
    }

    /// Number of distinct records in the table.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .map(|state| distinct_records(&state.users))
            .unwrap_or(0)
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record counts per access level, for operator logs.
    pub fn level_counts(&self) -> HashMap<Level, usize> {
        self.state
            .read()
            .map(|state| count_levels(&state.users))
            .unwrap_or_default()
    }
}

/// Parse the user file into a fresh table, outside any lock.
///
/// Comment and malformed lines are skipped; a record whose code collides
/// with an earlier record is dropped whole, matching insert semantics.
fn load_table(path: &Path) -> AuthResult<(HashMap<String, Arc<UserRecord>>, Option<SystemTime>)> {
    let modified = std::fs::metadata(path)?.modified().ok();
    let content = std::fs::read_to_string(path)?;

    let mut users: HashMap<String, Arc<UserRecord>> = HashMap::new();
    for line in content.lines() {
        let Some(record) = UserRecord::from_line(line) else {
            continue;
        };
        if record.codes.iter().any(|code| users.contains_key(code)) {
            warn!("Ignoring record '{}' with already-used code", record.name);
            continue;
        }
        let record = Arc::new(record);
        for code in &record.codes {
            users.insert(code.clone(), Arc::clone(&record));
        }
    }
    Ok((users, modified))
}

/// Count distinct records per level; records indexed under several codes
/// count once.
fn count_levels(users: &HashMap<String, Arc<UserRecord>>) -> HashMap<Level, usize> {
    let mut counts = HashMap::new();
    let mut seen = HashSet::new();
    for user in users.values() {
        if seen.insert(Arc::as_ptr(user)) {
            *counts.entry(user.level).or_insert(0) += 1;
        }
    }
    counts
}

fn distinct_records(users: &HashMap<String, Arc<UserRecord>>) -> usize {
    users
        .values()
        .map(Arc::as_ptr)
        .collect::<HashSet<_>>()
        .len()
}

fn log_counts(users: &HashMap<String, Arc<UserRecord>>) {
    info!("Read {} users", distinct_records(users));
    for (level, count) in count_levels(users) {
        debug!("{:>13} {:4}", level, count);
    }
}
