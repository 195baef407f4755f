use std::path::{Path, PathBuf};

use crate::error::StructeditError;
use crate::hash::hash_text;
use crate::syntax::{SyntaxTree, parse_document};

mod io;

/// A document snapshot: its text and the tree parsed from it.
///
/// Edits never mutate a snapshot; apply the patch and open a new one.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    text: String,
    tree: SyntaxTree,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, StructeditError> {
        let bytes = std::fs::read(path).map_err(|error| StructeditError::io(path, error))?;
        let text = String::from_utf8(bytes).map_err(|error| {
            StructeditError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, error),
            )
        })?;

        let mut document = Self::from_text(text)?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn from_text(text: impl Into<String>) -> Result<Self, StructeditError> {
        let text = text.into();
        let tree = parse_document(&text)?;
        Ok(Self {
            path: None,
            text,
            tree,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn hash(&self) -> String {
        hash_text(&self.text)
    }

    /// Fail when the document no longer matches `expected_hash`.
    pub fn check_hash(&self, expected_hash: Option<&str>) -> Result<(), StructeditError> {
        let Some(expected_hash) = expected_hash else {
            return Ok(());
        };
        let actual_hash = self.hash();
        if actual_hash != expected_hash {
            return Err(StructeditError::PreconditionFailed {
                expected_hash: expected_hash.to_string(),
                actual_hash,
            });
        }
        Ok(())
    }

    /// Overwrite the backing file with `patched`.
    ///
    /// Fails if the document was built from text, or if the file changed on
    /// disk since this snapshot was read.
    pub fn write_in_place(&self, patched: &str) -> Result<(), StructeditError> {
        let Some(path) = self.path.as_deref() else {
            return Err(StructeditError::InvalidRequest {
                message: "--in-place requires a document read from a file".to_string(),
            });
        };

        io::LockedFile::lock(path)?.replace(patched, &self.hash())
    }
}
