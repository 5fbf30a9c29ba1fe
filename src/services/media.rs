//! Media storage collaborator. Uploads return a public URL plus an asset
//! identifier; video uploads also probe the duration. The local-disk
//! implementation mirrors the upload-directory layout served under
//! `/uploads` by the HTTP server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub url: String,
    pub identifier: String,
    /// Seconds, probed for video uploads only.
    pub duration: Option<f64>,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Vec<u8>, kind: MediaKind) -> Result<MediaAsset>;
    /// Deleting an already-absent asset is not an error.
    async fn delete(&self, identifier: &str, kind: MediaKind) -> Result<()>;
}

pub struct LocalMediaStore {
    root: PathBuf,
    public_base: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base: String) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn asset_path(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, filename: &str, bytes: Vec<u8>, kind: MediaKind) -> Result<MediaAsset> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(match kind {
                MediaKind::Image => "jpg",
                MediaKind::Video => "mp4",
            })
            .to_ascii_lowercase();
        let identifier = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.asset_path(&identifier);

        fs::create_dir_all(&self.root)
            .await
            .context("Failed to create upload directory")?;
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write asset {identifier}"))?;

        let duration = match kind {
            MediaKind::Video => match probe_duration(&path).await {
                Ok(seconds) => Some(seconds),
                Err(e) => {
                    log::warn!("Failed to probe duration of {identifier}: {e:#}");
                    None
                }
            },
            MediaKind::Image => None,
        };

        Ok(MediaAsset {
            url: format!("{}/uploads/{}", self.public_base, identifier),
            identifier,
            duration,
        })
    }

    async fn delete(&self, identifier: &str, _kind: MediaKind) -> Result<()> {
        let path = self.asset_path(identifier);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Asset {identifier} already gone");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete asset {identifier}")),
        }
    }
}

async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("default=noprint_wrappers=1:nokey=1")
        .arg(path)
        .output()
        .await
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe exited with {}", output.status);
    }

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<f64>()
        .context("Invalid ffprobe duration output")
}
