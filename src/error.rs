use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid launch request: {0}")]
    InvalidRequest(String),

    #[error("A launch is already in progress")]
    AlreadyRunning,

    #[error("Installation failed: {0}")]
    Install(#[source] Box<Error>),

    #[error("Could not generate a username")]
    UsernameResolution,

    #[error("Failed to build launch command: {0}")]
    CommandBuild(String),

    #[error("Failed to start game process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Launch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Version error: {0}")]
    Version(String),
}
