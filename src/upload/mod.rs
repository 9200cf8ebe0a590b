//! Avatar upload validation and storage.
//!
//! Uploads arrive from the transport layer already spooled to a temp file.
//! Validation is an allow-list on content type plus a size cap; accepted
//! files are moved into the uploads directory under a generated name so
//! client-supplied filenames never touch the filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{Result, RippleError};

/// Maximum accepted avatar size in bytes (5 MiB).
pub const MAX_AVATAR_SIZE: u64 = 5 * 1024 * 1024;

/// Content types accepted for avatars, with their file extensions.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

/// Upload validation errors with user-facing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Only JPG, PNG and GIF images are allowed")]
    DisallowedType,

    #[error("Image size must be less than 5MB")]
    TooLarge,
}

impl From<UploadError> for RippleError {
    fn from(e: UploadError) -> Self {
        RippleError::Validation(vec![e.to_string()])
    }
}

/// An avatar file received from the transport layer.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    /// Filename as supplied by the client (informational only).
    pub original_name: String,
    /// Declared content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Where the transport layer spooled the bytes.
    pub temp_path: PathBuf,
}

impl AvatarUpload {
    /// Validate content type and size, returning the target file extension.
    pub fn validate(&self) -> std::result::Result<&'static str, UploadError> {
        let ext = ALLOWED_TYPES
            .iter()
            .find(|(ty, _)| *ty == self.content_type)
            .map(|(_, ext)| *ext)
            .ok_or(UploadError::DisallowedType)?;

        if self.size > MAX_AVATAR_SIZE {
            return Err(UploadError::TooLarge);
        }

        Ok(ext)
    }
}

/// Stores accepted avatars in the uploads directory.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory avatars are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and persist an upload, returning the stored filename.
    pub fn store(&self, upload: &AvatarUpload) -> Result<String> {
        let ext = upload.validate()?;
        let filename = format!("avatar_{}.{ext}", Uuid::new_v4().simple());
        let target = self.dir.join(&filename);

        // Rename fails across filesystems; fall back to copy + remove.
        if std::fs::rename(&upload.temp_path, &target).is_err() {
            std::fs::copy(&upload.temp_path, &target)?;
            let _ = std::fs::remove_file(&upload.temp_path);
        }

        debug!(
            "Stored avatar {} ({} bytes) as {}",
            upload.original_name, upload.size, filename
        );
        Ok(filename)
    }

    /// Remove a stored avatar by filename. Missing files are not an error.
    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.dir.join(filename);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
