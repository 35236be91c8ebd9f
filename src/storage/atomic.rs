//! Atomic file writes (write to a temp sibling, then rename)

use crate::error::{PbxError, PbxResult};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes a file through a uniquely named sibling and a rename, so readers
/// never see a half-written target.
pub struct AtomicFileWriter {
    target_path: PathBuf,
    temp_path: PathBuf,
}

impl AtomicFileWriter {
    /// Create a writer for the target path
    pub fn new(target_path: &Path) -> PbxResult<Self> {
        let temp_path = Self::generate_temp_path(target_path)?;

        Ok(AtomicFileWriter {
            target_path: target_path.to_path_buf(),
            temp_path,
        })
    }

    /// Write bytes to the target atomically
    pub fn write_bytes(&self, content: &[u8]) -> PbxResult<()> {
        if let Some(parent) = self.target_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.temp_path, content)?;
        self.commit()
    }

    /// Write pretty JSON to the target atomically
    pub fn write_json<T: serde::Serialize>(&self, data: &T) -> PbxResult<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| PbxError::storage(format!("cannot encode JSON: {}", e)))?;
        self.write_bytes(content.as_bytes())
    }

    fn commit(&self) -> PbxResult<()> {
        fs::rename(&self.temp_path, &self.target_path).map_err(|e| {
            PbxError::storage(format!(
                "cannot move {} into place: {}",
                self.target_path.display(),
                e
            ))
        })
    }

    fn generate_temp_path(target: &Path) -> PbxResult<PathBuf> {
        let parent = target
            .parent()
            .ok_or_else(|| {
                PbxError::storage(format!("{} has no parent directory", target.display()))
            })?;

        let filename = target
            .file_name()
            .ok_or_else(|| PbxError::storage(format!("{} has no file name", target.display())))?;

        let temp_name = format!("{}.tmp.{}", filename.to_string_lossy(), Uuid::new_v4());

        Ok(parent.join(temp_name))
    }
}

impl Drop for AtomicFileWriter {
    fn drop(&mut self) {
        // Leftover temp file means the rename never happened
        if self.temp_path.exists() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Convenience wrappers around [`AtomicFileWriter`]
pub struct AtomicOps;

impl AtomicOps {
    /// Atomically write bytes to a file
    pub fn write_file(path: &Path, content: &[u8]) -> PbxResult<()> {
        AtomicFileWriter::new(path)?.write_bytes(content)
    }

    /// Atomically write JSON data to a file
    pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> PbxResult<()> {
        AtomicFileWriter::new(path)?.write_json(data)
    }
}
