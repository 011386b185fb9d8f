//! On-disk copy of the snapshot log.
//!
//! One JSON array at a fixed path, rewritten in full on every save. There is
//! no version field; field names and optionality on [`Snapshot`] are the
//! format.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::models::Snapshot;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with `snapshots`.
    pub fn save(&self, snapshots: &[Snapshot]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_vec(snapshots).context("Failed to serialize snapshots")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write snapshots to {}", self.path.display()))
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Vec<Snapshot>>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read snapshots from {}", self.path.display())
                })
            }
        };

        let snapshots = serde_json::from_slice(&contents)
            .with_context(|| format!("Failed to parse snapshots in {}", self.path.display()))?;
        Ok(Some(snapshots))
    }

    /// Removes the file; a missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to delete {}", self.path.display())),
        }
    }
}
