//! Storage for uploaded CSV files.
//!
//! Each submission writes at most one file. By default every upload gets a
//! unique name, so concurrent submissions never overwrite each other, and the
//! file is removed when the returned [`StoredUpload`] is dropped.
//! [`UploadNaming::Fixed`] reuses one path for every request and leaves it in
//! place.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info};

/// Errors raised while storing an upload.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UploadError {
    /// Only `.csv` files are accepted.
    #[error("unsupported file type '{file_name}', expected a .csv file")]
    UnsupportedType {
        /// The rejected file name.
        file_name: String,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Create an unsupported-type error.
    #[must_use]
    pub fn unsupported_type(file_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            file_name: file_name.into(),
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// An uploaded file as received from the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-side file name.
    pub file_name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    /// Create an upload.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Returns `true` if the file name has a `.csv` extension.
    #[must_use]
    pub fn is_csv(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

/// How stored uploads are named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadNaming {
    /// `uploaded-<random>.csv`, unique per submission and deleted after it.
    #[default]
    Random,
    /// The same file name for every submission.
    Fixed(String),
}

/// Writes uploads into one directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    naming: UploadNaming,
}

impl Default for UploadStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR, UploadNaming::Random)
    }
}

impl UploadStore {
    /// Default upload directory, relative to the working directory.
    pub const DEFAULT_DIR: &'static str = "tmp";

    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, naming: UploadNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }

    /// The upload directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The naming scheme.
    #[must_use]
    pub const fn naming(&self) -> &UploadNaming {
        &self.naming
    }

    /// Write the upload's bytes verbatim and return a handle to the file.
    ///
    /// With [`UploadNaming::Random`] the file lives as long as the handle.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UnsupportedType`] for non-CSV file names and
    /// [`UploadError::Io`] if the directory or file cannot be written.
    pub async fn store(&self, upload: &Upload) -> Result<StoredUpload, UploadError> {
        if !upload.is_csv() {
            return Err(UploadError::unsupported_type(&upload.file_name));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::io(&self.dir, e))?;

        let stored = match &self.naming {
            UploadNaming::Random => {
                let file = tempfile::Builder::new()
                    .prefix("uploaded-")
                    .suffix(".csv")
                    .tempfile_in(&self.dir)
                    .map_err(|e| UploadError::io(&self.dir, e))?;
                StoredUpload::temporary(file.into_temp_path())
            }
            UploadNaming::Fixed(name) => StoredUpload::kept(self.dir.join(name)),
        };

        debug!(path = %stored.path().display(), bytes = upload.bytes.len(), "Writing upload");
        tokio::fs::write(stored.path(), &upload.bytes)
            .await
            .map_err(|e| UploadError::io(stored.path(), e))?;

        info!(file = %upload.file_name, path = %stored.path().display(), "Stored upload");
        Ok(stored)
    }
}

/// A stored upload.
///
/// Randomly named files are deleted when this value is dropped; fixed names
/// stay on disk.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl StoredUpload {
    fn temporary(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    const fn kept(path: PathBuf) -> Self {
        Self { path, temp: None }
    }

    /// Where the bytes were written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file is removed on drop.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map_or(0, Iterator::count)
    }

    #[tokio::test]
    async fn writes_bytes_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("nested/tmp"), UploadNaming::Random);
        let bytes = b"city,pm25\nLahore,91.5\n\xEF\xBB\xBF\r\n".to_vec();

        let stored = store.store(&Upload::new("air.csv", bytes.clone())).await.unwrap();

        assert!(stored.is_temporary());
        assert_eq!(std::fs::read(stored.path()).unwrap(), bytes);
        let name = stored.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("uploaded-") && name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn random_upload_is_removed_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), UploadNaming::Random);

        let stored = store.store(&Upload::new("a.csv", "1")).await.unwrap();
        let path = stored.path().to_path_buf();
        assert!(path.exists());

        drop(stored);
        assert!(!path.exists());
        assert_eq!(entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn random_names_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), UploadNaming::Random);

        let a = store.store(&Upload::new("a.csv", "1")).await.unwrap();
        let b = store.store(&Upload::new("b.csv", "2")).await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read_to_string(a.path()).unwrap(), "1");
        assert_eq!(entries(tmp.path()), 2);
    }

    #[tokio::test]
    async fn fixed_name_is_reused_and_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), UploadNaming::Fixed("uploaded.csv".into()));

        let first = store.store(&Upload::new("a.CSV", "old")).await.unwrap();
        let second = store.store(&Upload::new("b.csv", "new")).await.unwrap();
        assert!(!second.is_temporary());
        assert_eq!(first.path(), tmp.path().join("uploaded.csv"));
        assert_eq!(first.path(), second.path());

        let path = second.path().to_path_buf();
        drop(first);
        drop(second);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[tokio::test]
    async fn rejects_non_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("never"), UploadNaming::Random);

        let err = store.store(&Upload::new("data.xlsx", "x")).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(!tmp.path().join("never").exists());
    }
}
