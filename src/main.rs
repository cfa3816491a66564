use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use vanilla_launcher::progress::LauncherEvent;
use vanilla_launcher::version::MojangVersionProvider;
use vanilla_launcher::{LaunchRequest, Launcher, LauncherConfig, PersistedSettings, VersionProvider};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = LauncherConfig::with_default_root();

    match args.first().map(String::as_str) {
        None | Some("--list") => list_versions().await,
        Some(version_id) => {
            let username = args.get(1).cloned().unwrap_or_else(|| {
                PersistedSettings::load_or_default(&config.settings_path()).last_username
            });
            launch(config, version_id.to_string(), username).await
        }
    }
}

async fn list_versions() -> Result<()> {
    let provider = MojangVersionProvider::new();
    let versions = provider.list_versions().await?;

    println!("Available releases (latest first):");
    for version in versions.iter().filter(|v| v.release_type == "release").take(20) {
        println!("  {}", version.id);
    }
    println!("\nUsage: vanilla-launcher <version> [username]");
    Ok(())
}

async fn launch(config: LauncherConfig, version_id: String, username: String) -> Result<()> {
    let launcher = Launcher::new(config);
    let (_subscription, mut events) = launcher.progress().subscribe();

    let renderer = tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        while let Some(event) = events.recv().await {
            match event {
                LauncherEvent::Progress(state) => {
                    if state.max > 0 {
                        bar.set_length(state.max);
                        bar.set_position(state.current);
                    }
                    bar.set_message(state.label);
                }
                LauncherEvent::Busy(true) => bar.set_message("Preparing..."),
                LauncherEvent::Busy(false) => break,
            }
        }
        bar.finish_and_clear();
    });

    let handle = launcher.launch(LaunchRequest {
        version_id,
        username,
    })?;
    let result = handle.wait().await;
    renderer.await.ok();
    result?;

    Ok(())
}
