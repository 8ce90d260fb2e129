//! On-disk layout for uploads and public outputs.

use std::path::{Path, PathBuf};

use gifcast_media::GIF_EXTENSION;
use tokio::fs;
use tracing::{debug, warn};

/// Longest original-file extension carried over to the stored upload.
const MAX_EXTENSION_LEN: usize = 16;

/// Upload and public directories.
///
/// Both are shared by every request without locking; uniqueness of names
/// comes from the stamp generator alone.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    upload_dir: PathBuf,
    public_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(upload_dir: impl Into<PathBuf>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_dir: public_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Create both directories if absent. Idempotent.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.upload_dir, &self.public_dir] {
            if !dir.exists() {
                debug!(dir = %dir.display(), "Creating directory");
            }
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Path for an upload named `<stamp><ext>`.
    pub fn upload_path(&self, stamp: i64, original_name: Option<&str>) -> PathBuf {
        let ext = original_name.map(upload_extension).unwrap_or_default();
        self.upload_dir.join(format!("{}{}", stamp, ext))
    }

    /// File name of the GIF produced for `stamp`.
    pub fn output_file_name(&self, stamp: i64) -> String {
        format!("{}.{}", stamp, GIF_EXTENSION)
    }

    /// Where the GIF named `file_name` is written.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.public_dir.join(file_name)
    }

    /// Public URL path of the GIF named `file_name`.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("/public/{}", file_name)
    }

    /// The landing page. Never created by the server.
    pub fn landing_page(&self) -> PathBuf {
        self.public_dir.join("client").join("index.html")
    }

    /// Delete an upload, tolerating its absence.
    pub async fn remove_upload(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload"),
        }
    }
}

/// Extension of the client's file name including the dot, or empty.
///
/// Only ASCII alphanumeric extensions survive so the stored name stays a
/// plain `<digits>.<ext>`.
fn upload_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
