/// Filesystem storage for uploaded images
///
/// Images live under `<upload_dir>/images/` with random names and are served
/// by the static file service at `/uploads/images/<name>`. The database only
/// stores the path relative to the upload root.
///
/// # Example
///
/// ```no_run
/// use mdnote_api::storage::{image_extension, ImageStore};
///
/// # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
/// let store = ImageStore::new("uploads");
/// let ext = image_extension(Some("image/png"), Some("cat.PNG"))?;
/// let image = store.save(&ext, &bytes).await?;
/// assert!(image.url.starts_with("/uploads/images/"));
/// # Ok(())
/// # }
/// ```

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

/// Subdirectory of the upload root that holds images
pub const IMAGES_SUBDIR: &str = "images";

/// URL prefix the upload root is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Extensions accepted for uploads, lowercase with the leading dot
pub const ALLOWED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Extension used when the uploaded file name has none
pub const DEFAULT_EXTENSION: &str = ".png";

/// Why an upload was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    NotAnImage,
    UnsupportedFormat(String),
}

impl std::fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageRejection::NotAnImage => write!(f, "Only image files can be uploaded"),
            ImageRejection::UnsupportedFormat(ext) => {
                write!(f, "Unsupported image format: {}", ext)
            }
        }
    }
}

impl std::error::Error for ImageRejection {}

/// Validates an upload and returns its normalized extension
///
/// The MIME type must start with `image/`. The extension comes from the
/// original file name, lowercased, and defaults to `.png`.
pub fn image_extension(
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<String, ImageRejection> {
    if !content_type.map_or(false, |ct| ct.starts_with("image/")) {
        return Err(ImageRejection::NotAnImage);
    }

    let ext = file_name
        .and_then(file_extension)
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ImageRejection::UnsupportedFormat(ext));
    }

    Ok(ext)
}

/// Returns the suffix of the last path component starting at its final dot
fn file_extension(file_name: &str) -> Option<&str> {
    let base = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file_name);
    base.rfind('.').map(|i| &base[i..])
}

/// 16 random hex characters followed by `ext`
pub fn random_file_name(ext: &str) -> String {
    let bytes: [u8; 8] = rand::random();
    format!("{}{}", hex::encode(bytes), ext)
}

/// An image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Path relative to the upload root, as stored in `documents.image_path`
    pub relative_path: String,

    /// Public URL of the image
    pub url: String,

    /// Size of the written file in bytes
    pub size: i64,
}

/// Upload root on the local filesystem
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Upload root, served under `/uploads`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates `<root>/images` if it is missing
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.root.join(IMAGES_SUBDIR)).await
    }

    /// Writes `bytes` under a fresh random name with extension `ext`
    pub async fn save(&self, ext: &str, bytes: &[u8]) -> std::io::Result<StoredImage> {
        self.ensure_dirs().await?;

        let name = random_file_name(ext);
        let relative_path = format!("{}/{}", IMAGES_SUBDIR, name);
        let full_path = self.root.join(IMAGES_SUBDIR).join(&name);

        fs::write(&full_path, bytes).await.map_err(|e| {
            warn!(path = %full_path.display(), error = %e, "Failed to write uploaded image");
            e
        })?;

        debug!(path = %full_path.display(), size = bytes.len(), "Stored uploaded image");

        Ok(StoredImage {
            url: format!("{}/{}", UPLOADS_URL_PREFIX, relative_path),
            relative_path,
            size: bytes.len() as i64,
        })
    }

    /// Removes a stored file by its relative path
    ///
    /// Best effort: failures are logged and otherwise ignored. Paths that try
    /// to leave the upload root are refused.
    pub async fn remove(&self, relative_path: &str) {
        let relative = Path::new(relative_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            warn!(path = relative_path, "Refusing to remove path outside the upload root");
            return;
        }

        let full_path = self.root.join(relative);
        match fs::remove_file(&full_path).await {
            Ok(()) => debug!(path = %full_path.display(), "Removed stored file"),
            Err(e) => warn!(path = %full_path.display(), error = %e, "Failed to remove stored file"),
        }
    }
}
