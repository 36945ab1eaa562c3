//! Image upload collaborator: client-side policy checks and the uploader seam.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please select an image file ({mime} is not an image)")]
    WrongType { mime: String },
    #[error("Image must be smaller than {}", readable_size(*limit))]
    TooLarge { size: u64, limit: u64 },
    #[error("An upload for '{field}' is already in progress")]
    InProgress { field: String },
    #[error("'{field}' does not accept uploads")]
    NotUploadField { field: String },
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload failed: {0}")]
    Rejected(String),
}

/// Checks applied before any upload is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub mime_prefix: String,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            mime_prefix: "image/".to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn check(&self, file: &UploadFile) -> Result<(), UploadError> {
        if !file.mime.starts_with(&self.mime_prefix) {
            return Err(UploadError::WrongType {
                mime: file.mime.clone(),
            });
        }
        let size = file.size();
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// `5 MB`, `1.5 MB`, `300 KB` or `512 bytes`; KB values round up.
fn readable_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB {
        if bytes % MB == 0 {
            format!("{} MB", bytes / MB)
        } else {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        }
    } else if bytes >= KB {
        format!("{} KB", bytes.div_ceil(KB))
    } else {
        format!("{bytes} bytes")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            mime: guess_mime(path).to_string(),
            name,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn extension(&self) -> Option<&str> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
}

pub trait ImageUploader {
    fn upload(&self, file: &UploadFile) -> Result<UploadedImage, UploadError>;
}

/// Stores images in a local media directory and serves them under a URL prefix.
#[derive(Debug, Clone)]
pub struct LocalUploader {
    root: PathBuf,
    url_prefix: String,
}

impl LocalUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: "/media".to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }
}

impl ImageUploader for LocalUploader {
    fn upload(&self, file: &UploadFile) -> Result<UploadedImage, UploadError> {
        fs::create_dir_all(&self.root)?;
        let stored = match file.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
            None => Uuid::new_v4().to_string(),
        };
        fs::write(self.root.join(&stored), &file.bytes)?;
        debug!(name = %file.name, stored = %stored, "stored uploaded image");
        Ok(UploadedImage {
            url: format!("{}/{}", self.url_prefix, stored),
        })
    }
}
