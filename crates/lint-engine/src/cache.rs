//! Persistent lint result cache
//!
//! Results are partitioned by policy fingerprint: every fingerprint gets one
//! JSON blob holding an entry per absolute file path. A run reads a blob
//! lazily the first time its fingerprint is queried and writes new entries to
//! a separate in-memory tier; [`LinterCache::save`] merges the two back to
//! disk.
//!
//! An entry is valid while the file's modification time and the tool version
//! match what was recorded. File contents are not hashed, so two edits within
//! one timestamp tick can produce a stale hit.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use lint_fs::{DocumentStore, LintPath, NormalizedPath, checksum, io};
use lint_rules::Violation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Modification time as recorded in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn of(path: &NormalizedPath) -> Option<Self> {
        let modified = io::modification_time(path).ok()?;
        Some(Self::from(modified))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let since = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            secs: since.as_secs(),
            nanos: since.subsec_nanos(),
        }
    }
}

/// What one collecting rule gathered from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedInfo {
    /// Hash of the analysis arguments the info was gathered with
    pub arguments_hash: String,
    pub info: Value,
}

/// Cached results for one file under one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// `None` until the file has been fully linted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub collected: BTreeMap<String, CollectedInfo>,
    pub last_modification: Timestamp,
    pub tool_version: String,
}

impl CacheEntry {
    fn new(last_modification: Timestamp, tool_version: &str) -> Self {
        Self {
            violations: None,
            collected: BTreeMap::new(),
            last_modification,
            tool_version: tool_version.to_string(),
        }
    }

    pub fn is_valid(&self, current: Timestamp, tool_version: &str) -> bool {
        self.last_modification == current && self.tool_version == tool_version
    }
}

/// Entries of one fingerprint, keyed by absolute path.
type FileEntries = BTreeMap<String, CacheEntry>;

/// Two-tier result cache shared by all worker threads of a run.
#[derive(Debug)]
pub struct LinterCache {
    directory: Option<NormalizedPath>,
    tool_version: String,
    read: Mutex<HashMap<String, FileEntries>>,
    write: Mutex<HashMap<String, FileEntries>>,
    invalidated: Mutex<HashSet<String>>,
    store: DocumentStore,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl LinterCache {
    /// Cache persisted under `directory`.
    pub fn new(directory: NormalizedPath, tool_version: impl Into<String>) -> Self {
        Self::build(Some(directory), tool_version.into())
    }

    /// Cache that lives only as long as the process.
    pub fn in_memory(tool_version: impl Into<String>) -> Self {
        Self::build(None, tool_version.into())
    }

    fn build(directory: Option<NormalizedPath>, tool_version: String) -> Self {
        Self {
            directory,
            tool_version,
            read: Mutex::new(HashMap::new()),
            write: Mutex::new(HashMap::new()),
            invalidated: Mutex::new(HashSet::new()),
            store: DocumentStore::new(),
        }
    }

    /// `<user cache dir>/lint`, when the platform has one.
    pub fn default_directory() -> Option<NormalizedPath> {
        dirs::cache_dir().map(|dir| NormalizedPath::new(dir).join(LintPath::ResultCacheDir.as_str()))
    }

    pub fn directory(&self) -> Option<&NormalizedPath> {
        self.directory.as_ref()
    }

    /// Blob file holding the entries of `fingerprint`.
    pub fn blob_path(&self, fingerprint: &str) -> Option<NormalizedPath> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(&format!("{}.json", checksum::file_stem(fingerprint))))
    }

    fn load_blob(&self, fingerprint: &str) -> FileEntries {
        let Some(path) = self.blob_path(fingerprint) else {
            return FileEntries::new();
        };
        match self.store.load_optional::<FileEntries>(&path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::debug!(%path, error = %e, "Ignoring unreadable cache");
                FileEntries::new()
            }
        }
    }

    /// Current valid entry for `path`, from either tier.
    fn valid_entry(&self, fingerprint: &str, path: &NormalizedPath) -> Option<CacheEntry> {
        if lock(&self.invalidated).contains(path.as_str()) {
            return None;
        }
        let current = Timestamp::of(path)?;

        let written = lock(&self.write)
            .get(fingerprint)
            .and_then(|entries| entries.get(path.as_str()))
            .cloned();
        let entry = match written {
            Some(entry) => Some(entry),
            None => {
                let mut read = lock(&self.read);
                if !read.contains_key(fingerprint) {
                    let loaded = self.load_blob(fingerprint);
                    read.insert(fingerprint.to_string(), loaded);
                }
                read.get(fingerprint)
                    .and_then(|entries| entries.get(path.as_str()))
                    .cloned()
            }
        };

        entry.filter(|e| e.is_valid(current, &self.tool_version))
    }

    /// Cached violations for `path`, if still valid.
    pub fn violations(&self, fingerprint: &str, path: &NormalizedPath) -> Option<Vec<Violation>> {
        let violations = self.valid_entry(fingerprint, path)?.violations;
        tracing::debug!(%path, hit = violations.is_some(), "Result cache lookup");
        violations
    }

    /// Cached collected info of `rule_id` for `path`, if gathered with the same arguments.
    pub fn collected_info(
        &self,
        fingerprint: &str,
        path: &NormalizedPath,
        rule_id: &str,
        arguments_hash: &str,
    ) -> Option<Value> {
        self.valid_entry(fingerprint, path)?
            .collected
            .get(rule_id)
            .filter(|c| c.arguments_hash == arguments_hash)
            .map(|c| c.info.clone())
    }

    /// Update the pending entry for `path`, starting over when the file changed.
    fn update(&self, fingerprint: &str, path: &NormalizedPath, apply: impl FnOnce(&mut CacheEntry)) {
        let Some(current) = Timestamp::of(path) else {
            return;
        };
        let mut write = lock(&self.write);
        let entries = write.entry(fingerprint.to_string()).or_default();
        let entry = entries
            .entry(path.as_str().to_string())
            .or_insert_with(|| CacheEntry::new(current, &self.tool_version));
        if !entry.is_valid(current, &self.tool_version) {
            *entry = CacheEntry::new(current, &self.tool_version);
        }
        apply(entry);
        lock(&self.invalidated).remove(path.as_str());
    }

    pub fn cache_violations(&self, fingerprint: &str, path: &NormalizedPath, violations: &[Violation]) {
        self.update(fingerprint, path, |entry| {
            entry.violations = Some(violations.to_vec());
        });
    }

    pub fn cache_collected_info(
        &self,
        fingerprint: &str,
        path: &NormalizedPath,
        rule_id: &str,
        arguments_hash: &str,
        info: Value,
    ) {
        self.update(fingerprint, path, |entry| {
            entry.collected.insert(
                rule_id.to_string(),
                CollectedInfo {
                    arguments_hash: arguments_hash.to_string(),
                    info,
                },
            );
        });
    }

    /// Forget everything cached for `path` under every fingerprint.
    ///
    /// Call after rewriting a file.
    pub fn invalidate(&self, path: &NormalizedPath) {
        for entries in lock(&self.write).values_mut() {
            entries.remove(path.as_str());
        }
        for entries in lock(&self.read).values_mut() {
            entries.remove(path.as_str());
        }
        lock(&self.invalidated).insert(path.as_str().to_string());
        tracing::debug!(%path, "Invalidated cached results");
    }

    /// Merge pending entries into the on-disk blobs.
    ///
    /// Pending entries win over stored ones for the same file.
    pub fn save(&self) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Err(Error::NoCacheLocation);
        };

        let write = lock(&self.write);
        let invalidated = lock(&self.invalidated);
        if write.is_empty() && invalidated.is_empty() {
            return Ok(());
        }
        io::ensure_dir(directory)?;

        let mut fingerprints: HashSet<&String> = write.keys().collect();
        let read = lock(&self.read);
        if !invalidated.is_empty() {
            fingerprints.extend(read.keys());
        }

        for fingerprint in fingerprints {
            let Some(path) = self.blob_path(fingerprint) else {
                continue;
            };
            let mut entries = self.load_blob(fingerprint);
            entries.retain(|file, _| !invalidated.contains(file));
            if let Some(pending) = write.get(fingerprint) {
                entries.extend(pending.iter().map(|(file, entry)| (file.clone(), entry.clone())));
            }
            self.store.save(&path, &entries)?;
            tracing::debug!(%path, files = entries.len(), "Saved result cache");
        }
        Ok(())
    }
}
