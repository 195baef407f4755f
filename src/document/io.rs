use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StructeditError;
use crate::hash::hash_bytes;

/// A document file held under an exclusive advisory lock until dropped.
#[derive(Debug)]
pub(super) struct LockedFile<'p> {
    path: &'p Path,
    file: File,
}

impl<'p> LockedFile<'p> {
    pub(super) fn lock(path: &'p Path) -> Result<Self, StructeditError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|error| StructeditError::io(path, error))?;

        file.try_lock_exclusive().map_err(|error| match error.kind() {
            ErrorKind::WouldBlock => StructeditError::ResourceBusy {
                path: path.display().to_string(),
            },
            _ => StructeditError::io(path, error),
        })?;
        Ok(Self { path, file })
    }

    /// Hash of the bytes currently on disk, read through the locked handle.
    fn current_hash(&mut self) -> Result<String, StructeditError> {
        let mut current = Vec::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_end(&mut current))
            .map_err(|error| StructeditError::io(self.path, error))?;
        Ok(hash_bytes(&current))
    }

    /// Swap in `contents` if the file still hashes to `expected_hash`.
    ///
    /// The new text is staged in a sibling temp file and renamed over the
    /// original, so readers see either the old or the new document.
    pub(super) fn replace(
        mut self,
        contents: &str,
        expected_hash: &str,
    ) -> Result<(), StructeditError> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = self
            .file
            .metadata()
            .map_err(|error| StructeditError::io(self.path, error))?
            .permissions();

        let mut staged = tempfile::Builder::new()
            .prefix(".structedit-")
            .tempfile_in(directory)
            .map_err(|error| StructeditError::io(directory, error))?;
        write_staged(&mut staged, contents)?;

        let actual_hash = self.current_hash()?;
        if actual_hash != expected_hash {
            return Err(StructeditError::PreconditionFailed {
                expected_hash: expected_hash.to_string(),
                actual_hash,
            });
        }

        fs::set_permissions(staged.path(), permissions)
            .map_err(|error| StructeditError::io(staged.path(), error))?;
        staged
            .persist(self.path)
            .map_err(|error| StructeditError::io(self.path, error.error))?;
        sync_directory(directory)?;

        debug!(path = %self.path.display(), bytes = contents.len(), "wrote patched document");
        Ok(())
    }
}

fn write_staged(staged: &mut NamedTempFile, contents: &str) -> Result<(), StructeditError> {
    staged
        .write_all(contents.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|error| StructeditError::io(staged.path(), error))
}

#[cfg(unix)]
fn sync_directory(directory: &Path) -> Result<(), StructeditError> {
    File::open(directory)
        .and_then(|handle| handle.sync_all())
        .map_err(|error| StructeditError::io(directory, error))
}

#[cfg(not(unix))]
fn sync_directory(_directory: &Path) -> Result<(), StructeditError> {
    Ok(())
}
