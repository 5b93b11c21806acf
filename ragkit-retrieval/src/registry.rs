//! Knowledge-base identifier registry file.
//!
//! A small JSON file `{ "kbs": [ { name, kb_id, ds_id, bucket, prefix } ] }`
//! recording the managed service's opaque identifiers. The file is created
//! if absent and never silently overwritten: an unreadable file is an error,
//! not an excuse to start from empty.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, RetrievalError};

/// One registered knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbEntry {
    /// Display name.
    pub name: String,
    /// Opaque knowledge-base identifier.
    pub kb_id: String,
    /// Opaque data-source identifier.
    pub ds_id: String,
    /// Object-store bucket the knowledge base syncs from.
    pub bucket: String,
    /// Optional key prefix inside the bucket.
    #[serde(default)]
    pub prefix: String,
}

impl KbEntry {
    fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.kb_id = self.kb_id.trim().to_string();
        self.ds_id = self.ds_id.trim().to_string();
        self.bucket = self.bucket.trim().to_string();
        self.prefix = self.prefix.trim().to_string();
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    kbs: Vec<KbEntry>,
}

/// A registry of knowledge-base entries persisted to a JSON file.
pub struct KbRegistry {
    path: PathBuf,
}

impl KbRegistry {
    /// Open a registry at the given path, creating an empty file if absent.
    ///
    /// An existing file is never overwritten by opening.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RetrievalError::Registry(format!("create {parent:?}: {e}")))?;
            }
            Self::write_file(&path, &RegistryFile::default())?;
            info!(path = %path.display(), "created empty knowledge-base registry");
        }
        Ok(Self { path })
    }

    /// All registered entries, with whitespace trimmed.
    pub fn entries(&self) -> Result<Vec<KbEntry>> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| RetrievalError::Registry(format!("read {:?}: {e}", self.path)))?;
        let file: RegistryFile = serde_json::from_str(&text)
            .map_err(|e| RetrievalError::Registry(format!("parse {:?}: {e}", self.path)))?;
        Ok(file.kbs.into_iter().map(KbEntry::trimmed).collect())
    }

    /// Register a new knowledge base.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Registry`] if an entry with the same `kb_id`
    /// already exists.
    pub fn register(&self, entry: KbEntry) -> Result<()> {
        let entry = entry.trimmed();
        let mut entries = self.entries()?;
        if entries.iter().any(|existing| existing.kb_id == entry.kb_id) {
            return Err(RetrievalError::Registry(format!(
                "knowledge base '{}' is already registered",
                entry.kb_id
            )));
        }
        info!(kb_id = %entry.kb_id, name = %entry.name, "registering knowledge base");
        entries.push(entry);
        Self::write_file(&self.path, &RegistryFile { kbs: entries })
    }

    /// Remove a knowledge base by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Registry`] if no entry has the identifier.
    pub fn remove(&self, kb_id: &str) -> Result<()> {
        let entries = self.entries()?;
        let before = entries.len();
        let remaining: Vec<KbEntry> =
            entries.into_iter().filter(|entry| entry.kb_id != kb_id).collect();
        if remaining.len() == before {
            return Err(RetrievalError::Registry(format!("knowledge base '{kb_id}' not found")));
        }
        Self::write_file(&self.path, &RegistryFile { kbs: remaining })
    }

    fn write_file(path: &Path, file: &RegistryFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file)
            .map_err(|e| RetrievalError::Registry(format!("serialize registry: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| RetrievalError::Registry(format!("write {path:?}: {e}")))
    }
}
