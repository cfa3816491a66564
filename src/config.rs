use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "launcher_settings.json";

/// Paths shared by one launcher instance. Built once at startup and passed
/// by reference, instead of living in module-level globals.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    install_root: PathBuf,
}

impl LauncherConfig {
    pub fn new(install_root: PathBuf) -> Self {
        Self { install_root }
    }

    /// Per-user install root, e.g. `~/.local/share/vanilla-launcher` on Linux.
    pub fn with_default_root() -> Self {
        let install_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vanilla-launcher");
        Self { install_root }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.install_root.join(SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = LauncherConfig::new(PathBuf::from("/tmp/mc"));
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/mc/launcher_settings.json"));
        assert_eq!(config.install_root(), Path::new("/tmp/mc"));
    }
}
