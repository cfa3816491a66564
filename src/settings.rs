use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Advisory display data shared with the UI: the name used on the last
/// launch, pre-filled into the username field at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSettings {
    #[serde(default)]
    pub last_username: String,
}

impl PersistedSettings {
    /// Loads settings, falling back to defaults on any problem. A missing
    /// file, a missing key or garbled JSON must never block a launch, so the
    /// fallback path is explicit rather than an error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Falling back to default settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)
            .map_err(|e| Error::Settings(format!("Malformed {}: {}", path.display(), e)))?;
        Ok(settings)
    }

    /// Whole-file overwrite. Called once per accepted launch, before the
    /// install begins; a concurrent startup read may observe either version,
    /// which is fine for advisory data.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }
}
