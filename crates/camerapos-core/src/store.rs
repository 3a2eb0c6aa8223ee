//! Durable level → camera pose store
//!
//! [`JsonPoseStore`] keeps every saved pose in a single JSON document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "poses": {
//!     "/Game/Maps/Foo": {
//!       "pose": { "location": { "x": 0.0, "y": 0.0, "z": 100.0 },
//!                 "rotation": { "pitch": -15.0, "yaw": 90.0, "roll": 0.0 },
//!                 "fov": 90.0 },
//!       "saved_at": "2026-01-10T12:00:00Z"
//!     }
//!   }
//! }
//! ```
//!
//! Writes go through to disk on every `put`/`erase` (temp file + rename), so
//! the latest save is never held only in memory. A file or entry that cannot be
//! decoded reads as "no saved pose".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::level::LevelKey;
use crate::pose::CameraPose;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Pose for {0} contains non-finite values")]
    NonFinitePose(LevelKey),
}

/// A saved pose together with the time it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub pose: CameraPose,
    pub saved_at: DateTime<Utc>,
}

impl StoreEntry {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            pose,
            saved_at: Utc::now(),
        }
    }
}

/// Narrow get/put/erase interface over the saved poses
pub trait PoseStore {
    /// Saved entry for `key`, if any. Never fails.
    fn entry(&self, key: &LevelKey) -> Option<StoreEntry>;

    /// Overwrite the pose saved for `key`
    fn put(&mut self, key: &LevelKey, pose: CameraPose) -> Result<(), StoreError>;

    /// Remove the pose saved for `key`. Returns `false` if there was none.
    fn erase(&mut self, key: &LevelKey) -> Result<bool, StoreError>;

    /// All keys with a saved pose, sorted
    fn keys(&self) -> Vec<LevelKey>;

    /// Saved pose for `key`, if any. Never fails.
    fn get(&self, key: &LevelKey) -> Option<CameraPose> {
        self.entry(key).map(|e| e.pose)
    }
}

impl<T: PoseStore + ?Sized> PoseStore for &mut T {
    fn entry(&self, key: &LevelKey) -> Option<StoreEntry> {
        (**self).entry(key)
    }

    fn put(&mut self, key: &LevelKey, pose: CameraPose) -> Result<(), StoreError> {
        (**self).put(key, pose)
    }

    fn erase(&mut self, key: &LevelKey) -> Result<bool, StoreError> {
        (**self).erase(key)
    }

    fn keys(&self) -> Vec<LevelKey> {
        (**self).keys()
    }
}

impl<T: PoseStore + ?Sized> PoseStore for Box<T> {
    fn entry(&self, key: &LevelKey) -> Option<StoreEntry> {
        (**self).entry(key)
    }

    fn put(&mut self, key: &LevelKey, pose: CameraPose) -> Result<(), StoreError> {
        (**self).put(key, pose)
    }

    fn erase(&mut self, key: &LevelKey) -> Result<bool, StoreError> {
        (**self).erase(key)
    }

    fn keys(&self) -> Vec<LevelKey> {
        (**self).keys()
    }
}

fn check_finite(key: &LevelKey, pose: &CameraPose) -> Result<(), StoreError> {
    if pose.is_finite() {
        Ok(())
    } else {
        Err(StoreError::NonFinitePose(key.clone()))
    }
}

/// In-memory store used as a test fake
#[derive(Debug, Default)]
pub struct MemoryPoseStore {
    entries: HashMap<LevelKey, StoreEntry>,
    fail_writes: bool,
}

impl MemoryPoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, as if the disk were read-only
    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            Err(StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )))
        } else {
            Ok(())
        }
    }
}

impl PoseStore for MemoryPoseStore {
    fn entry(&self, key: &LevelKey) -> Option<StoreEntry> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &LevelKey, pose: CameraPose) -> Result<(), StoreError> {
        check_finite(key, &pose)?;
        self.check_writable()?;
        self.entries.insert(key.clone(), StoreEntry::new(pose));
        Ok(())
    }

    fn erase(&mut self, key: &LevelKey) -> Result<bool, StoreError> {
        self.check_writable()?;
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Vec<LevelKey> {
        let mut keys: Vec<LevelKey> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// On-disk document layout
#[derive(Debug, Serialize)]
struct PoseDocument<'a> {
    version: &'a str,
    poses: BTreeMap<&'a str, &'a StoreEntry>,
}

/// Lenient view of the document used when loading, so one bad entry does not
/// hide the others
#[derive(Debug, Deserialize)]
struct RawPoseDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    poses: BTreeMap<String, serde_json::Value>,
}

const DOCUMENT_VERSION: &str = "1.0";

/// Pose store persisted as a JSON file
#[derive(Debug)]
pub struct JsonPoseStore {
    path: PathBuf,
    entries: BTreeMap<LevelKey, StoreEntry>,
}

impl JsonPoseStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or unparsable file is
    /// logged and also treated as empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => Self::decode(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No pose store yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read pose store, treating as empty");
                BTreeMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened pose store");
        Self { path, entries }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn decode(path: &Path, content: &str) -> BTreeMap<LevelKey, StoreEntry> {
        let raw: RawPoseDocument = match serde_json::from_str(content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Pose store is corrupt, treating as empty");
                return BTreeMap::new();
            }
        };

        if let Some(version) = raw.version.as_deref() {
            if version != DOCUMENT_VERSION {
                debug!(version = %version, "Reading pose store written by another version");
            }
        }

        let mut entries = BTreeMap::new();
        for (raw_key, value) in raw.poses {
            let Some(key) = LevelKey::from_level_path(&raw_key) else {
                warn!(key = %raw_key, "Skipping pose entry with an empty level key");
                continue;
            };
            match serde_json::from_value::<StoreEntry>(value) {
                Ok(entry) if entry.pose.is_finite() => {
                    entries.insert(key, entry);
                }
                Ok(_) => {
                    warn!(level = %key, "Skipping pose entry with non-finite values");
                }
                Err(e) => {
                    warn!(level = %key, error = %e, "Skipping corrupt pose entry");
                }
            }
        }
        entries
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the whole document through to disk
    fn flush(&self) -> Result<(), StoreError> {
        let document = PoseDocument {
            version: DOCUMENT_VERSION,
            poses: self
                .entries
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
        };
        let content = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.tmp_path();
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PoseStore for JsonPoseStore {
    fn entry(&self, key: &LevelKey) -> Option<StoreEntry> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &LevelKey, pose: CameraPose) -> Result<(), StoreError> {
        check_finite(key, &pose)?;

        let previous = self.entries.insert(key.clone(), StoreEntry::new(pose));
        if let Err(e) = self.flush() {
            match previous {
                Some(entry) => self.entries.insert(key.clone(), entry),
                None => self.entries.remove(key),
            };
            return Err(e);
        }

        debug!(level = %key, "Stored camera pose");
        Ok(())
    }

    fn erase(&mut self, key: &LevelKey) -> Result<bool, StoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.flush() {
            self.entries.insert(key.clone(), previous);
            return Err(e);
        }

        debug!(level = %key, "Erased camera pose");
        Ok(true)
    }

    fn keys(&self) -> Vec<LevelKey> {
        self.entries.keys().cloned().collect()
    }
}
