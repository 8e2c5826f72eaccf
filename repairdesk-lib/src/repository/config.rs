use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use getset::CopyGetters;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::fs::{config_dir, state_dir};

const FILE_NAME: &str = "config.toml";

/// Handle to the core configuration.
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The application's configuration, serialized to TOML in the XDG config
/// directory.
#[derive(Debug, Clone, Serialize, Deserialize, CopyGetters)]
#[serde(default)]
pub struct CoreConfig {
    /// Snapshot location override; the XDG state directory is used when
    /// unset.
    snapshot_path: Option<PathBuf>,
    /// Seconds between a `delivered` transition and the entry's removal.
    #[getset(get_copy = "pub")]
    purge_delay_secs: u64,
    /// How many snapshot backups to keep around.
    #[getset(get_copy = "pub")]
    backup_keep: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            purge_delay_secs: 1,
            backup_keep: 5,
        }
    }
}

impl CoreConfig {
    pub fn load() -> Self {
        let path = config_dir().join(FILE_NAME);

        if path.exists() {
            let contents = fs::read_to_string(path).unwrap();
            toml::from_str(&contents).unwrap_or_default()
        } else {
            let cfg = Self::default();
            cfg.save();
            cfg
        }
    }

    pub fn save(&self) {
        let contents = toml::to_string_pretty(self).unwrap();

        fs::write(config_dir().join(FILE_NAME), contents).unwrap();
    }

    /// Where the snapshot lives.
    pub fn snapshot_file(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| state_dir().join("snapshot.json"))
    }

    pub fn purge_delay(&self) -> Duration {
        Duration::from_secs(self.purge_delay_secs)
    }

    /// Configuration for tests; never touches the filesystem.
    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::default()
    }
}
