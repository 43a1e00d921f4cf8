//! Flat-file paste storage.
//!
//! One file per paste, named exactly by its identifier, directly inside the
//! data directory. No subdirectories, no sidecar metadata.
//!
//! Writes go to a hidden temporary file next to the paste and are renamed
//! over it on [`Upload::commit`], so readers see either the old content or
//! the new, never a half-written file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Keeps temporary names unique when two uploads share an id.
static UPLOADS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid paste id {0:?}")]
    InvalidId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{id}: {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },

    #[error("data directory {}: {source}", .path.display())]
    Dir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads and writes pastes under one directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Opens `dir`, creating it and its parents (mode `0755`) if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder
            .create(&dir)
            .await
            .map_err(|source| StorageError::Dir { path: dir.clone(), source })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Starts writing the paste `id`. Nothing is visible under `id` until
    /// the returned [`Upload`] is committed; dropping it discards the data.
    pub async fn upload(&self, id: &str) -> Result<Upload, StorageError> {
        let dest = self.path_for(id)?;
        let n = UPLOADS.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{id}.{n}.part"));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .await
            .map_err(|source| StorageError::Io { id: id.to_owned(), source })?;

        Ok(Upload { id: id.to_owned(), file, tmp, dest, written: 0, committed: false })
    }

    /// Opens the file for `id` for reading.
    pub async fn fetch(&self, id: &str) -> Result<File, StorageError> {
        let path = self.path_for(id)?;
        match File::open(&path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_owned()))
            }
            Err(source) => Err(StorageError::Io { id: id.to_owned(), source }),
        }
    }

    /// Maps `id` to exactly one file directly inside the data directory.
    fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        let escapes = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0']);
        if escapes {
            return Err(StorageError::InvalidId(id.to_owned()));
        }
        Ok(self.dir.join(id))
    }
}

/// A paste being written. See [`Storage::upload`].
#[derive(Debug)]
pub struct Upload {
    id: String,
    file: File,
    tmp: PathBuf,
    dest: PathBuf,
    written: u64,
    committed: bool,
}

impl Upload {
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.file.write_all(chunk).await.map_err(|e| self.io_err(e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes and publishes the paste, replacing any earlier one with the
    /// same id. Returns the number of bytes written.
    pub async fn commit(mut self) -> Result<u64, StorageError> {
        self.file.flush().await.map_err(|e| self.io_err(e))?;
        fs::rename(&self.tmp, &self.dest).await.map_err(|e| self.io_err(e))?;
        self.committed = true;

        debug!(path = %self.dest.display(), written = self.written, "stored");
        Ok(self.written)
    }

    fn io_err(&self, source: io::Error) -> StorageError {
        StorageError::Io { id: self.id.clone(), source }
    }
}

impl Drop for Upload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.tmp) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.tmp.display(), "discarding upload: {e}");
            }
        }
    }
}
