use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::progress::InstallEvent;
use crate::version::{MojangVersionProvider, VersionDetail};
use crate::{Error, Result};

/// Makes a version runnable from the install root. Implementations report
/// their work through the event sender; the orchestrator coalesces and
/// forwards those events while the install runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Installer: Send + Sync {
    async fn install(
        &self,
        version_id: &str,
        install_root: &Path,
        events: mpsc::UnboundedSender<InstallEvent>,
    ) -> Result<()>;
}

/// Downloads vanilla version metadata and the client jar from Mojang,
/// verifying the jar against its published SHA-1. Files already present and
/// valid are left alone.
pub struct VanillaInstaller {
    client: reqwest::Client,
    provider: MojangVersionProvider,
}

impl VanillaInstaller {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: MojangVersionProvider::new(),
        }
    }

    pub fn with_provider(provider: MojangVersionProvider) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
        }
    }

    async fn fetch_version_detail(&self, version_id: &str) -> Result<VersionDetail> {
        let manifest = self.provider.fetch_manifest().await?;
        let summary = manifest
            .versions
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or_else(|| Error::Version(format!("Unknown version: {}", version_id)))?;

        let detail = self.client.get(&summary.url).send().await?.json().await?;
        Ok(detail)
    }

    async fn download_file<F>(
        &self,
        url: &str,
        path: &Path,
        expected_sha1: &str,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(u64) + Send,
    {
        if path.exists() && file_sha1(path).await? == expected_sha1 {
            log::debug!("Already present, skipping: {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.client.get(url).send().await?;
        let bytes = response.bytes().await?;

        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        for chunk in bytes.chunks(8192) {
            file.write_all(chunk).await?;
            written += chunk.len() as u64;
            on_progress(written);
        }
        file.flush().await?;

        let actual = file_sha1(path).await?;
        if actual != expected_sha1 {
            tokio::fs::remove_file(path).await.ok();
            return Err(Error::Version(format!(
                "Hash mismatch for {}: expected {}, got {}",
                path.display(),
                expected_sha1,
                actual
            )));
        }

        Ok(())
    }
}

impl Default for VanillaInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Installer for VanillaInstaller {
    async fn install(
        &self,
        version_id: &str,
        install_root: &Path,
        events: mpsc::UnboundedSender<InstallEvent>,
    ) -> Result<()> {
        // Observers may be gone, in which case sends fail harmlessly.
        let emit = |event: InstallEvent| {
            let _ = events.send(event);
        };

        emit(InstallEvent::StatusChanged("Fetching version metadata".to_string()));
        let detail = self.fetch_version_detail(version_id).await?;

        let version_dir = install_root.join("versions").join(version_id);
        tokio::fs::create_dir_all(&version_dir).await?;
        let detail_path = version_dir.join(format!("{}.json", version_id));
        tokio::fs::write(&detail_path, serde_json::to_string_pretty(&detail)?).await?;

        let client = detail
            .downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or_else(|| Error::Version(format!("No client download for {}", version_id)))?;

        emit(InstallEvent::StatusChanged("Downloading client jar".to_string()));
        emit(InstallEvent::MaxChanged(client.size));

        let jar_path = version_dir.join(format!("{}.jar", version_id));
        self.download_file(&client.url, &jar_path, &client.sha1, |written| {
            emit(InstallEvent::ProgressChanged(written));
        })
        .await?;

        emit(InstallEvent::StatusChanged("Install complete".to_string()));
        log::info!("Installed version {} into {}", version_id, install_root.display());
        Ok(())
    }
}

async fn file_sha1(path: &Path) -> Result<String> {
    let contents = tokio::fs::read(path).await?;
    let mut hasher = Sha1::new();
    hasher.update(&contents);
    Ok(hex::encode(hasher.finalize()))
}
