use crate::config::ImageConfig;
use crate::ImageResult;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RAW_SUFFIX: &str = "-raw.png";
const THUMB_SUFFIX: &str = "-thumb.png";

/// Identifier shared by the raw capture and the thumbnail of one crawl attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Generates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Places snapshot artifacts under the public image directory
///
/// Files are never overwritten or removed here; every crawl attempt gets a
/// new identifier.
#[derive(Debug, Clone)]
pub struct ImageStore {
    public_root: PathBuf,
    directory: String,
}

impl ImageStore {
    pub fn new(public_root: impl Into<PathBuf>, directory: impl Into<String>) -> Self {
        Self {
            public_root: public_root.into(),
            directory: directory.into().trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.public_root.clone(), config.directory.clone())
    }

    /// Absolute (or root-relative) filesystem location of the image directory
    pub fn dir(&self) -> PathBuf {
        self.public_root.join(&self.directory)
    }

    /// Creates the image directory if it does not exist
    pub async fn ensure_dir(&self) -> ImageResult<()> {
        tokio::fs::create_dir_all(self.dir()).await?;
        Ok(())
    }

    /// Allocates a fresh artifact identifier
    pub fn allocate(&self) -> ArtifactId {
        ArtifactId::new()
    }

    pub fn raw_path(&self, id: ArtifactId) -> PathBuf {
        self.dir().join(format!("{}{}", id, RAW_SUFFIX))
    }

    pub fn thumbnail_path(&self, id: ArtifactId) -> PathBuf {
        self.dir().join(format!("{}{}", id, THUMB_SUFFIX))
    }

    /// Thumbnail location relative to the public root, with forward slashes
    pub fn public_path(&self, id: ArtifactId) -> String {
        if self.directory.is_empty() {
            format!("{}{}", id, THUMB_SUFFIX)
        } else {
            format!("{}/{}{}", self.directory, id, THUMB_SUFFIX)
        }
    }

    /// Writes the raw capture and returns its path
    pub async fn write_raw(&self, id: ArtifactId, bytes: &[u8]) -> ImageResult<PathBuf> {
        let path = self.raw_path(id);
        write_new(&path, bytes).await?;
        tracing::debug!("Wrote raw capture {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Writes the thumbnail and returns its public path
    pub async fn write_thumbnail(&self, id: ArtifactId, bytes: &[u8]) -> ImageResult<String> {
        let path = self.thumbnail_path(id);
        write_new(&path, bytes).await?;
        tracing::debug!("Wrote thumbnail {} ({} bytes)", path.display(), bytes.len());
        Ok(self.public_path(id))
    }
}

/// Writes a file that must not exist yet
async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}
