use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::{
    CommandBuilder, LaunchOptions, ProcessRunner, SystemProcessRunner, VersionJsonCommandBuilder,
};
use crate::config::LauncherConfig;
use crate::install::{Installer, VanillaInstaller};
use crate::progress::{ProgressChannel, ProgressCoalescer};
use crate::settings::PersistedSettings;
use crate::username::{RandomUsernameGenerator, UsernameGenerator};
use crate::{Error, Result};

/// What the caller hands to [`Launcher::launch`]. Immutable once accepted.
/// An empty username means "generate one for me".
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub version_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Installing,
    Launching,
    Running,
}

/// Awaitable outcome of one accepted launch attempt.
#[derive(Debug)]
pub struct LaunchHandle {
    task: JoinHandle<Result<()>>,
}

impl LaunchHandle {
    pub async fn wait(self) -> Result<()> {
        self.task.await?
    }
}

struct SharedState {
    busy: AtomicBool,
    state: Mutex<LaunchState>,
}

impl SharedState {
    fn set(&self, state: LaunchState) {
        *self.state.lock().unwrap() = state;
    }
}

/// Drives one launch attempt end to end: install, resolve username, build the
/// command, start the process. At most one attempt runs at a time; everything
/// blocking happens on a worker task so the caller is never frozen.
pub struct Launcher {
    config: LauncherConfig,
    progress: Arc<ProgressChannel>,
    installer: Arc<dyn Installer>,
    builder: Arc<dyn CommandBuilder>,
    generator: Arc<dyn UsernameGenerator>,
    runner: Arc<dyn ProcessRunner>,
    shared: Arc<SharedState>,
}

impl Launcher {
    /// Launcher wired with the real Mojang-backed components.
    pub fn new(config: LauncherConfig) -> Self {
        Self::with_components(
            config,
            Arc::new(VanillaInstaller::new()),
            Arc::new(VersionJsonCommandBuilder::new()),
            Arc::new(RandomUsernameGenerator),
            Arc::new(SystemProcessRunner),
        )
    }

    pub fn with_components(
        config: LauncherConfig,
        installer: Arc<dyn Installer>,
        builder: Arc<dyn CommandBuilder>,
        generator: Arc<dyn UsernameGenerator>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            progress: Arc::new(ProgressChannel::new()),
            installer,
            builder,
            generator,
            runner,
            shared: Arc::new(SharedState {
                busy: AtomicBool::new(false),
                state: Mutex::new(LaunchState::Idle),
            }),
        }
    }

    pub fn progress(&self) -> &ProgressChannel {
        &self.progress
    }

    pub fn state(&self) -> LaunchState {
        *self.shared.state.lock().unwrap()
    }

    /// Validates the request and, if the launcher is idle, starts the worker
    /// task for this attempt. Returns without blocking on any I/O.
    ///
    /// While an attempt is in flight every further call fails with
    /// [`Error::AlreadyRunning`] and has no side effects.
    pub fn launch(&self, request: LaunchRequest) -> Result<LaunchHandle> {
        if request.version_id.is_empty() {
            return Err(Error::InvalidRequest("version id is empty".to_string()));
        }

        if self
            .shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }

        self.shared.set(LaunchState::Installing);
        log::info!("Launching version {}", request.version_id);

        // Advisory write so the UI can pre-fill the name next time. Not
        // allowed to block the launch if it fails.
        let settings = PersistedSettings {
            last_username: request.username.clone(),
        };
        if let Err(e) = settings.save(&self.config.settings_path()) {
            log::warn!("Could not persist last username: {}", e);
        }

        let config = self.config.clone();
        let progress = Arc::clone(&self.progress);
        let installer = Arc::clone(&self.installer);
        let builder = Arc::clone(&self.builder);
        let generator = Arc::clone(&self.generator);
        let runner = Arc::clone(&self.runner);
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            progress.emit_busy(true);

            let result = run_attempt(
                &config, &progress, &*installer, &*builder, &*generator, &*runner, &shared,
                &request,
            )
            .await;

            if let Err(ref e) = result {
                log::error!("Launch of {} failed: {}", request.version_id, e);
            }

            shared.set(LaunchState::Idle);
            progress.emit_busy(false);
            // Cleared last, so a new attempt can never emit its busy(true)
            // ahead of this attempt's busy(false).
            shared.busy.store(false, Ordering::Release);

            result
        });

        Ok(LaunchHandle { task })
    }
}

async fn run_attempt(
    config: &LauncherConfig,
    progress: &ProgressChannel,
    installer: &dyn Installer,
    builder: &dyn CommandBuilder,
    generator: &dyn UsernameGenerator,
    runner: &dyn ProcessRunner,
    shared: &SharedState,
    request: &LaunchRequest,
) -> Result<()> {
    // Install, forwarding the installer's events inline. Draining on the
    // worker itself keeps every emission of this attempt in one total order
    // inside the busy(true)/busy(false) bracket.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let install_fut = installer.install(&request.version_id, config.install_root(), events_tx);
    tokio::pin!(install_fut);

    let mut coalescer = ProgressCoalescer::new();
    let install_result = loop {
        tokio::select! {
            result = &mut install_fut => break result,
            Some(event) = events_rx.recv() => {
                progress.emit_progress(coalescer.apply(event));
            }
        }
    };
    // The installer dropped its sender; flush whatever it sent last.
    while let Ok(event) = events_rx.try_recv() {
        progress.emit_progress(coalescer.apply(event));
    }
    install_result.map_err(|e| Error::Install(Box::new(e)))?;

    shared.set(LaunchState::Launching);

    let username = if request.username.is_empty() {
        let name = generator.generate().map_err(|_| Error::UsernameResolution)?;
        if name.is_empty() {
            return Err(Error::UsernameResolution);
        }
        log::info!("Using generated username {}", name);
        name
    } else {
        request.username.clone()
    };

    let options = LaunchOptions::offline(username);
    let command = builder.build(&request.version_id, config.install_root(), &options)?;

    shared.set(LaunchState::Running);
    runner.run(&command).await?;

    Ok(())
}
