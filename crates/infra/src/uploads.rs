//! Storage for uploaded product images.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

const FALLBACK_NAME: &str = "upload";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to store upload at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploaded files into a directory as `<epoch-millis>_<original-filename>`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stored name for an upload received at `now`.
    ///
    /// Only the final path component of the client-supplied name is kept.
    pub fn filename_for(original: &str, now: DateTime<Utc>) -> String {
        let base = Path::new(original)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_NAME);
        format!("{}_{}", now.timestamp_millis(), base)
    }

    /// Write `bytes` and return the generated filename.
    pub async fn save(
        &self,
        original: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::Io {
                path: self.dir.display().to_string(),
                source,
            })?;

        let filename = Self::filename_for(original, now);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Io {
                path: path.display().to_string(),
                source,
            })?;

        tracing::info!(file = %filename, size = bytes.len(), "stored upload");
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn filename_is_epoch_millis_then_original_name() {
        assert_eq!(
            ImageStore::filename_for("shoe.png", at_millis(1_700_000_000_123)),
            "1700000000123_shoe.png"
        );
    }

    #[test]
    fn filename_drops_directory_components() {
        let now = at_millis(5);
        assert_eq!(ImageStore::filename_for("../../etc/passwd", now), "5_passwd");
        assert_eq!(ImageStore::filename_for("", now), "5_upload");
    }

    #[tokio::test]
    async fn save_writes_the_file_into_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let images_dir = dir.path().join("public").join("images");
        let images = ImageStore::new(&images_dir);

        let name = images.save("shoe.png", b"png-bytes", at_millis(42)).await.unwrap();

        assert_eq!(name, "42_shoe.png");
        let written = std::fs::read(images_dir.join(&name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }
}
