//! Modification history (`modifications.json`).
//!
//! Every successful repack appends one entry: when it happened, which
//! bundle was read, which file was written, what changed, and the hash of
//! the written file.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const DEFAULT_LOG_NAME: &str = "modifications.json";

/// One repack operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEntry {
    pub timestamp: String,
    /// File name of the source bundle.
    pub original: String,
    /// File name of the bundle that was written.
    pub modified: String,
    /// Human-readable change list, e.g. `"Texture2D: hero"`.
    pub changes: Vec<String>,
    /// SHA-256 of the written bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_sha256: Option<String>,
}

impl ModificationEntry {
    /// Build an entry stamped with the current local time.
    pub fn now(original: &Path, modified: &Path, changes: Vec<String>) -> Self {
        ModificationEntry {
            timestamp: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            original: file_name(original),
            modified: file_name(modified),
            changes,
            modified_sha256: None,
        }
    }

    pub fn with_hash(mut self, hash: String) -> Self {
        self.modified_sha256 = Some(hash);
        self
    }
}

/// Flat append-only log persisted as a JSON array.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModificationLog {
    pub entries: Vec<ModificationEntry>,
}

impl ModificationLog {
    /// Load an existing log, or start an empty one if the file is absent.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            return Ok(ModificationLog::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn push(&mut self, entry: ModificationEntry) {
        self.entries.push(entry);
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the log the way `history` prints it.
    pub fn render(&self) -> String {
        let mut out = String::from("Modification History:");
        for entry in &self.entries {
            let _ = write!(out, "\n\n[{}]", entry.timestamp);
            let _ = write!(out, "\nOriginal: {}", entry.original);
            let _ = write!(out, "\nCreated: {}", entry.modified);
            if let Some(hash) = &entry.modified_sha256 {
                let _ = write!(out, "\nSHA-256: {}", hash);
            }
            out.push_str("\nChanges:");
            for change in &entry.changes {
                let _ = write!(out, "\n  - {}", change);
            }
        }
        out
    }
}

/// Compute the SHA-256 hash of a file.
pub fn hash_file(path: &Path) -> Result<String, HistoryError> {
    let data = fs::read(path)?;
    Ok(hash_bytes(&data))
}

/// Compute the SHA-256 hash of a byte slice.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
