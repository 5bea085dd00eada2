//! Artifact delivery: turns received document bytes into a saved file.
//!
//! The bytes are first written to a transient temp file next to the target,
//! which is then persisted under the suggested name. The temp handle is
//! released on every path; a failed save leaves nothing behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::generation_client::BinaryArtifact;
use crate::models::resume::ResumeData;

pub const GENERIC_FILENAME: &str = "resume.pdf";
const FILENAME_SUFFIX: &str = "_Resume.pdf";
/// Common filesystem limit for a single path component.
const MAX_FILENAME_BYTES: usize = 255;

#[derive(Debug, Error)]
pub enum DeliveryFailed {
    #[error("I/O error while saving artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not move artifact into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Delivery task aborted: {0}")]
    Aborted(String),
}

/// Deterministic download name: `Asha_Rao_Resume.pdf`, or `resume.pdf`
/// when no usable name is present.
pub fn suggested_filename(data: &ResumeData) -> String {
    let joined = data
        .person
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let stem = sanitize_filename::sanitize(joined);
    let stem = truncate_to_bytes(&stem, MAX_FILENAME_BYTES - FILENAME_SUFFIX.len());

    if stem.is_empty() {
        GENERIC_FILENAME.to_string()
    } else {
        format!("{stem}{FILENAME_SUFFIX}")
    }
}

fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
pub trait ArtifactDelivery: Send + Sync {
    /// Saves `bytes` under `suggested_name`, returning where it landed.
    async fn deliver(
        &self,
        bytes: BinaryArtifact,
        suggested_name: &str,
    ) -> Result<PathBuf, DeliveryFailed>;
}

/// Saves artifacts into a download directory on the local filesystem.
pub struct FileSystemDelivery {
    dir: PathBuf,
}

impl FileSystemDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn save_blocking(dir: &Path, bytes: &[u8], name: &str) -> Result<PathBuf, DeliveryFailed> {
    std::fs::create_dir_all(dir)?;

    let mut transient = tempfile::NamedTempFile::new_in(dir)?;
    transient.write_all(bytes)?;
    transient.as_file().sync_all()?;

    let target = dir.join(name);
    transient.persist(&target)?;
    Ok(target)
}

#[async_trait]
impl ArtifactDelivery for FileSystemDelivery {
    async fn deliver(
        &self,
        bytes: BinaryArtifact,
        suggested_name: &str,
    ) -> Result<PathBuf, DeliveryFailed> {
        let dir = self.dir.clone();
        let name = sanitize_filename::sanitize(suggested_name);
        let name = if name.is_empty() {
            GENERIC_FILENAME.to_string()
        } else {
            name
        };

        tokio::task::spawn_blocking(move || save_blocking(&dir, &bytes, &name))
            .await
            .map_err(|e| DeliveryFailed::Aborted(e.to_string()))?
    }
}

/// Fire-and-forget delivery. Failures are logged and swallowed; the caller
/// still holds the bytes.
pub async fn deliver_quietly(
    delivery: &dyn ArtifactDelivery,
    bytes: BinaryArtifact,
    suggested_name: &str,
) -> Option<PathBuf> {
    match delivery.deliver(bytes, suggested_name).await {
        Ok(path) => {
            info!("Delivered artifact to {}", path.display());
            Some(path)
        }
        Err(e) => {
            error!("Artifact delivery failed for '{suggested_name}': {e}");
            None
        }
    }
}
