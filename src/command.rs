use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::version::VersionDetail;
use crate::{Error, Result};

/// Resolved parameters for one launch attempt. The session id is fresh per
/// attempt and never reused; the auth token stays empty in offline mode.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub username: String,
    pub session_id: Uuid,
    pub auth_token: String,
}

impl LaunchOptions {
    pub fn offline(username: String) -> Self {
        Self {
            username,
            session_id: Uuid::new_v4(),
            auth_token: String::new(),
        }
    }
}

/// An executable plus its ordered argument list, ready for direct process
/// creation. No shell interpretation happens anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Turns an installed version plus launch options into an argv.
#[cfg_attr(test, mockall::automock)]
pub trait CommandBuilder: Send + Sync {
    fn build(
        &self,
        version_id: &str,
        install_root: &Path,
        options: &LaunchOptions,
    ) -> Result<LaunchCommand>;
}

/// Builds the java command line from the installed `versions/<id>/<id>.json`
/// metadata. Fails with [`Error::CommandBuild`] when the metadata is missing
/// or corrupt, which usually means the install step was skipped or damaged.
pub struct VersionJsonCommandBuilder {
    java_executable: PathBuf,
}

impl VersionJsonCommandBuilder {
    pub fn new() -> Self {
        Self {
            java_executable: PathBuf::from("java"),
        }
    }

    pub fn with_java(java_executable: PathBuf) -> Self {
        Self { java_executable }
    }
}

impl Default for VersionJsonCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuilder for VersionJsonCommandBuilder {
    fn build(
        &self,
        version_id: &str,
        install_root: &Path,
        options: &LaunchOptions,
    ) -> Result<LaunchCommand> {
        let version_dir = install_root.join("versions").join(version_id);
        let detail_path = version_dir.join(format!("{}.json", version_id));
        let jar_path = version_dir.join(format!("{}.jar", version_id));

        let raw = std::fs::read_to_string(&detail_path).map_err(|e| {
            Error::CommandBuild(format!("Cannot read {}: {}", detail_path.display(), e))
        })?;
        let detail: VersionDetail = serde_json::from_str(&raw).map_err(|e| {
            Error::CommandBuild(format!("Corrupt metadata for {}: {}", version_id, e))
        })?;

        let main_class = detail
            .main_class
            .ok_or_else(|| Error::CommandBuild(format!("No main class for {}", version_id)))?;

        let game_dir = install_root.to_path_buf();
        let args = vec![
            "-cp".to_string(),
            jar_path.to_string_lossy().into_owned(),
            main_class,
            "--username".to_string(),
            options.username.clone(),
            "--version".to_string(),
            version_id.to_string(),
            "--gameDir".to_string(),
            game_dir.to_string_lossy().into_owned(),
            "--assetsDir".to_string(),
            game_dir.join("assets").to_string_lossy().into_owned(),
            "--uuid".to_string(),
            options.session_id.to_string(),
            "--accessToken".to_string(),
            options.auth_token.clone(),
        ];

        Ok(LaunchCommand {
            program: self.java_executable.clone(),
            args,
        })
    }
}

/// Starts the game process. Split out as a trait so the orchestrator can be
/// exercised without actually spawning anything.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &LaunchCommand) -> Result<()>;
}

/// Spawns the command on the host OS.
///
/// On Windows the child is started with `CREATE_NO_WINDOW` and not awaited,
/// since suppressing the console window is the whole point there. Everywhere
/// else the runner waits for the child to exit.
pub struct SystemProcessRunner;

#[async_trait::async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, command: &LaunchCommand) -> Result<()> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        log::info!("Starting game: {:?}", command.program);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
            cmd.spawn().map_err(Error::Spawn)?;
        }

        #[cfg(not(windows))]
        {
            let mut child = cmd.spawn().map_err(Error::Spawn)?;
            let status = child.wait().await.map_err(Error::Spawn)?;
            log::info!("Game process exited with {}", status);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_detail(install_root: &Path, version_id: &str, body: &str) {
        let dir = install_root.join("versions").join(version_id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", version_id)), body).unwrap();
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("vl-cmd-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_build_command_argv() {
        let root = temp_root();
        write_detail(&root, "1.20.1", r#"{"id": "1.20.1", "mainClass": "net.minecraft.client.main.Main"}"#);

        let builder = VersionJsonCommandBuilder::new();
        let options = LaunchOptions::offline("Alex".to_string());
        let command = builder.build("1.20.1", &root, &options).unwrap();

        assert_eq!(command.program, PathBuf::from("java"));
        assert_eq!(command.args[2], "net.minecraft.client.main.Main");

        let username_pos = command.args.iter().position(|a| a == "--username").unwrap();
        assert_eq!(command.args[username_pos + 1], "Alex");

        let token_pos = command.args.iter().position(|a| a == "--accessToken").unwrap();
        assert_eq!(command.args[token_pos + 1], "");

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_missing_metadata_is_command_build_error() {
        let builder = VersionJsonCommandBuilder::new();
        let options = LaunchOptions::offline("Alex".to_string());
        let err = builder
            .build("1.20.1", Path::new("/nonexistent"), &options)
            .unwrap_err();
        assert!(matches!(err, Error::CommandBuild(_)));
    }

    #[test]
    fn test_corrupt_metadata_is_command_build_error() {
        let root = temp_root();
        write_detail(&root, "1.20.1", "{not json");

        let builder = VersionJsonCommandBuilder::new();
        let options = LaunchOptions::offline("Alex".to_string());
        let err = builder.build("1.20.1", &root, &options).unwrap_err();
        assert!(matches!(err, Error::CommandBuild(_)));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_fresh_session_id_per_attempt() {
        let a = LaunchOptions::offline("Alex".to_string());
        let b = LaunchOptions::offline("Alex".to_string());
        assert_ne!(a.session_id, b.session_id);
        assert!(a.auth_token.is_empty());
    }
}
