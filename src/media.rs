//! Upload intake: content-type and size checks, then persistence under the
//! media root. Stored files are addressed by a relative `media/...` path that
//! the router serves statically.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

/// URL prefix of stored files, independent of where the root lives on disk
pub const MEDIA_URL_PREFIX: &str = "media";

pub const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Only {allowed} files are allowed")]
    UnsupportedType { allowed: String },

    #[error("File size must be less than {limit_mb}MB")]
    TooLarge { limit_mb: usize },

    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What an upload is for; decides directory, accepted types and size limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// University and course pictures
    Image,
    /// Application documents
    Document,
    /// NID or passport scan attached to an agent profile
    ProfileFile,
}

impl MediaKind {
    fn directory(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Document | MediaKind::ProfileFile => "documents",
        }
    }

    fn allowed_types(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["image/"],
            MediaKind::Document | MediaKind::ProfileFile => &["image/", "application/pdf"],
        }
    }
}

/// One file received from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Extension taken from the client file name; `jpg` when there is none
    fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_image_mb: usize,
    max_document_mb: usize,
    max_profile_file_mb: usize,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            max_image_mb: config.max_image_mb,
            max_document_mb: config.max_document_mb,
            max_profile_file_mb: config.max_profile_file_mb,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn limit_mb(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_image_mb,
            MediaKind::Document => self.max_document_mb,
            MediaKind::ProfileFile => self.max_profile_file_mb,
        }
    }

    /// Reject files whose type or size does not fit the kind
    pub fn check(&self, kind: MediaKind, file: &UploadedFile) -> Result<(), MediaError> {
        let allowed = kind.allowed_types();
        if !allowed.iter().any(|prefix| file.content_type.starts_with(prefix)) {
            return Err(MediaError::UnsupportedType {
                allowed: allowed.join(", "),
            });
        }

        let limit_mb = self.limit_mb(kind);
        if file.data.len() > limit_mb * BYTES_PER_MB {
            return Err(MediaError::TooLarge { limit_mb });
        }
        Ok(())
    }

    /// Check and persist a file; returns its `media/<dir>/<label>_<uuid>.<ext>` path
    pub async fn save(
        &self,
        kind: MediaKind,
        label: &str,
        file: &UploadedFile,
    ) -> Result<String, MediaError> {
        self.check(kind, file)?;

        let directory = self.root.join(kind.directory());
        tokio::fs::create_dir_all(&directory).await?;

        let name = format!("{}_{}.{}", label, Uuid::new_v4(), file.extension());
        tokio::fs::write(directory.join(&name), &file.data).await?;

        let path = format!("{}/{}/{}", MEDIA_URL_PREFIX, kind.directory(), name);
        info!("Stored upload {} ({} bytes)", path, file.data.len());
        Ok(path)
    }

    /// Persist a batch of `(label, file)` pairs, all or nothing.
    ///
    /// When one save fails the files already written for the batch are removed
    /// before the error is returned.
    pub async fn save_all(
        &self,
        kind: MediaKind,
        batch: &[(String, &UploadedFile)],
    ) -> Result<Vec<String>, MediaError> {
        let mut saved = Vec::with_capacity(batch.len());
        for (label, file) in batch {
            match self.save(kind, label, file).await {
                Ok(path) => saved.push(path),
                Err(err) => {
                    for path in &saved {
                        if let Err(e) = self.remove(path).await {
                            warn!("Failed to remove partial upload {}: {}", path, e);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(saved)
    }

    /// Delete a previously stored file; a file that is already gone is not an error
    pub async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let location = self.resolve(path)?;
        match tokio::fs::remove_file(&location).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("Media file {} already removed", path);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Map a stored `media/...` path back under the root, refusing traversal
    fn resolve(&self, path: &str) -> Result<PathBuf, MediaError> {
        let relative = path
            .strip_prefix(MEDIA_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| MediaError::InvalidPath(path.to_string()))?;

        let relative = Path::new(relative);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(MediaError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}
