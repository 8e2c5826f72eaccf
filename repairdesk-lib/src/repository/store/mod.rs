//! Snapshot persistence.
//!
//! The whole application state lives in one [`Snapshot`] held behind an
//! `Arc<RwLock<Arc<Snapshot>>>`. Mutations are copy-on-write: every
//! [`Store::update`] clones the current snapshot, applies the closure, and
//! swaps the `Arc`, so readers keep a consistent view and
//! [`Arc::ptr_eq`] detects change. Nothing touches disk until
//! [`Store::save`] is called.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::Utc;
use derive_more::Deref;
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

mod snapshot;

pub use snapshot::Snapshot;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to replace snapshot file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, Deref)]
pub struct Store {
    #[deref]
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the snapshot at `path`, falling back to defaults when the file
    /// is absent or unreadable. A malformed file is kept as a timestamped
    /// backup before being replaced on the next save. Delivered entries
    /// whose purge task never fired in a previous process are swept here.
    pub fn open(path: &Path, purge_delay: Duration, backup_keep: usize) -> Self {
        let mut snapshot = Self::load_or_default(path, backup_keep);
        snapshot.ensure_admin();

        let delay = chrono::Duration::from_std(purge_delay).unwrap_or_default();
        let swept = snapshot.sweep_delivered(Utc::now() - delay);
        if swept > 0 {
            debug!("Swept {swept} delivered entries past the purge delay");
        }

        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            path: Some(path.to_path_buf()),
        }
    }

    fn load_or_default(path: &Path, backup_keep: usize) -> Snapshot {
        if !path.exists() {
            debug!("No snapshot at {}; starting fresh", path.display());
            return Snapshot::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(
                        "Snapshot at {} is malformed ({err}); backing it up and starting fresh",
                        path.display()
                    );
                    Self::backup(path, backup_keep);
                    Snapshot::default()
                }
            },
            Err(err) => {
                warn!("Could not read snapshot at {} ({err})", path.display());
                Snapshot::default()
            }
        }
    }

    /// The current snapshot. Cheap; callers get a consistent view that
    /// outlives later updates.
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    /// Apply a mutation copy-on-write and publish the result.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        let mut guard = self.snapshot.write();
        let mut next = Snapshot::clone(guard.as_ref());
        let out = f(&mut next);
        *guard = Arc::new(next);
        out
    }

    /// Like [`Store::update`], but the copy is only published when the
    /// closure succeeds. A failed operation leaves no trace, not even a new
    /// `Arc`.
    pub(crate) fn try_update<R, E>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E> {
        let mut guard = self.snapshot.write();
        let mut next = Snapshot::clone(guard.as_ref());
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    /// Serialize the current snapshot and atomically replace the file.
    pub fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(self.current().as_ref())?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.persist(path)?;

        debug!("Saved snapshot to {}", path.display());

        Ok(())
    }

    /// Keep a timestamped copy of the snapshot file next to it.
    fn backup(path: &Path, keep: usize) {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("snapshot.json");
        let backup = path.with_file_name(format!("{file_name}-{timestamp}.bak"));

        if let Err(err) = fs::copy(path, &backup) {
            warn!("Could not back up snapshot to {} ({err})", backup.display());
            return;
        }

        Self::prune_backups(path, file_name, keep);
    }

    /// Remove the oldest backups beyond `keep`. Backup names embed their
    /// timestamp, so lexical order is age order.
    fn prune_backups(path: &Path, file_name: &str, keep: usize) {
        let Some(dir) = path.parent() else {
            return;
        };

        let mut backups: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(file_name) && n.ends_with(".bak"))
            })
            .collect();
        backups.sort();

        let excess = backups.len().saturating_sub(keep);
        for old in backups.into_iter().take(excess) {
            if let Err(err) = fs::remove_file(&old) {
                warn!("Could not prune old backup {} ({err})", old.display());
            }
        }
    }

    /// Create a memory backed store for use in tests.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(Snapshot::default()))),
            path: None,
        }
    }
}
