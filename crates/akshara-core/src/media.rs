//! Local image picking
//!
//! The picker is a device collaborator: it never touches the network, it
//! only resolves a user-chosen file into a URI that can be shown in chat.

use std::fs;
use std::path::{Path, PathBuf};

pub const PERMISSION_ALERT_TEXT: &str = "Sorry, we need camera roll permissions to make this work!";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic"];

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Permission denied for media library {0}")]
    PermissionDenied(PathBuf),

    #[error("No such file: {0}")]
    NotFound(PathBuf),

    #[error("Not an image: {0}")]
    NotAnImage(PathBuf),
}

pub trait MediaPicker: Send + Sync {
    /// Check that the media library can be read.
    fn check_permission(&self) -> Result<(), MediaError>;

    /// Resolve `selection` into a local file URI.
    fn pick_image(&self, selection: &str) -> Result<String, MediaError>;
}

/// Picks images from a directory on disk (the user's pictures folder by default).
#[derive(Debug, Clone)]
pub struct FsImagePicker {
    library: PathBuf,
}

impl FsImagePicker {
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
        }
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    fn resolve(&self, selection: &str) -> PathBuf {
        let trimmed = selection.trim();
        let expanded = match trimmed.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => None,
        };
        let path = expanded.unwrap_or_else(|| PathBuf::from(trimmed));
        if path.is_absolute() {
            path
        } else {
            self.library.join(path)
        }
    }
}

impl MediaPicker for FsImagePicker {
    fn check_permission(&self) -> Result<(), MediaError> {
        fs::read_dir(&self.library)
            .map(|_| ())
            .map_err(|_| MediaError::PermissionDenied(self.library.clone()))
    }

    fn pick_image(&self, selection: &str) -> Result<String, MediaError> {
        let path = self.resolve(selection);
        if !path.is_file() {
            return Err(MediaError::NotFound(path));
        }

        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            return Err(MediaError::NotAnImage(path));
        }

        let absolute = fs::canonicalize(&path).unwrap_or(path);
        Ok(format!("file://{}", absolute.display()))
    }
}
