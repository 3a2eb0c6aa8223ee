//! Level identity used to key saved camera poses

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stable identifier for a level, derived from its persisted path
///
/// The same path always yields the same key across sessions. A renamed or
/// moved level gets a new key; old entries are not migrated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelKey(String);

impl LevelKey {
    /// Derive a key from a level path such as `/Game/Maps/Foo` or
    /// `Content\Maps\Foo.umap`.
    ///
    /// Separators are normalized to `/`, empty and `.` segments are dropped and
    /// case is preserved. Returns `None` for a level that has no path yet
    /// (an unsaved, untitled level).
    pub fn from_level_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = trimmed.replace('\\', "/");
        let rooted = normalized.starts_with('/');
        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        if segments.is_empty() {
            return None;
        }

        let mut key = segments.join("/");
        if rooted {
            key.insert(0, '/');
        }
        Some(Self(key))
    }

    /// Derive a key from a filesystem path
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_level_path(&path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LevelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
