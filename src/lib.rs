pub mod command;
pub mod config;
pub mod error;
pub mod install;
pub mod launcher;
pub mod progress;
pub mod settings;
pub mod username;
pub mod version;

pub use command::{CommandBuilder, LaunchCommand, LaunchOptions, ProcessRunner};
pub use config::LauncherConfig;
pub use error::{Error, Result};
pub use install::Installer;
pub use launcher::{LaunchHandle, LaunchRequest, LaunchState, Launcher};
pub use progress::{InstallEvent, LauncherEvent, ProgressChannel, ProgressState};
pub use settings::PersistedSettings;
pub use username::UsernameGenerator;
pub use version::{VersionProvider, VersionSummary};
