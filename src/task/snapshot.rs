#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AutodevError;

/// Persistence port for the task snapshot: one named durable slot holding
/// the serialized collection. The store treats the payload as opaque text.
pub trait SnapshotStore: Send {
    /// `Ok(None)` means no snapshot has ever been written.
    fn load(&self) -> anyhow::Result<Option<String>>;
    fn save(&self, data: &str) -> anyhow::Result<()>;
}

/// Snapshot slot backed by a single JSON file, written atomically via a
/// temp file + rename so readers never observe a partial write.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshot {
    fn load(&self) -> anyhow::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|source| AutodevError::IoPath {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(raw))
    }

    fn save(&self, data: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AutodevError::IoPath {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data.as_bytes()).map_err(|source| AutodevError::IoPath {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| AutodevError::IoPath {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// In-memory slot, used as a test double and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seeded(data: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(data.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshot {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone())
    }

    fn save(&self, data: &str) -> anyhow::Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(data.to_owned());
        Ok(())
    }
}
