//! Standard paths used by breathe

use std::path::PathBuf;

/// Standard breathe paths
pub struct Paths {
    /// Data directory (~/.local/share/breathe)
    pub data: PathBuf,
    /// Config directory (~/.config/breathe)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("breathe");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("breathe");

        Self { data, config }
    }

    /// Build paths rooted somewhere other than the user's home
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Get the global config file path
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Get state directory for a store
    pub fn state(&self, store: &str) -> PathBuf {
        self.data.join(store)
    }
}
