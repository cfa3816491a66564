use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub release_type: String,
    pub url: String,
    #[serde(rename = "releaseTime")]
    pub release_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: Latest,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Latest {
    pub release: String,
    pub snapshot: String,
}

/// Per-version metadata, the subset of `versions/<id>/<id>.json` the
/// launcher needs: the client jar download and the entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDetail {
    pub id: String,
    #[serde(rename = "mainClass")]
    pub main_class: Option<String>,
    pub downloads: Option<DownloadsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadsSection {
    pub client: Option<DownloadInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub url: String,
    pub sha1: String,
    pub size: u64,
}

/// Source of the version catalog the caller picks from. The launcher core
/// only ever needs a valid version id out of this.
#[async_trait::async_trait]
pub trait VersionProvider: Send + Sync {
    async fn list_versions(&self) -> Result<Vec<VersionSummary>>;
}

/// Fetches the official Mojang version manifest.
pub struct MojangVersionProvider {
    client: reqwest::Client,
    manifest_url: String,
}

impl MojangVersionProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            manifest_url: MANIFEST_URL.to_string(),
        }
    }

    pub fn with_manifest_url(manifest_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            manifest_url,
        }
    }

    pub async fn fetch_manifest(&self) -> Result<VersionManifest> {
        let response = self.client.get(&self.manifest_url).send().await?;
        let manifest = response.json().await?;
        Ok(manifest)
    }
}

impl Default for MojangVersionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl VersionProvider for MojangVersionProvider {
    async fn list_versions(&self) -> Result<Vec<VersionSummary>> {
        let manifest = self.fetch_manifest().await?;
        log::info!("Fetched {} versions from manifest", manifest.versions.len());
        Ok(manifest.versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let raw = r#"{
            "latest": {"release": "1.20.1", "snapshot": "23w31a"},
            "versions": [
                {
                    "id": "1.20.1",
                    "type": "release",
                    "url": "https://example.com/1.20.1.json",
                    "time": "2023-06-12T13:25:51+00:00",
                    "releaseTime": "2023-06-12T13:25:51+00:00"
                }
            ]
        }"#;

        let manifest: VersionManifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.latest.release, "1.20.1");
        assert_eq!(manifest.versions.len(), 1);
        assert_eq!(manifest.versions[0].id, "1.20.1");
        assert_eq!(manifest.versions[0].release_type, "release");
    }

    #[test]
    fn test_parse_version_detail() {
        let raw = r#"{
            "id": "1.20.1",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": {
                "client": {
                    "url": "https://example.com/client.jar",
                    "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709",
                    "size": 12345
                }
            }
        }"#;

        let detail: VersionDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.main_class.as_deref(), Some("net.minecraft.client.main.Main"));
        let client = detail.downloads.unwrap().client.unwrap();
        assert_eq!(client.size, 12345);
    }
}
