//! Statistics persistence.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use crate::document::StatsDocument;
use crate::error::StatsError;

/// Statistics storage trait.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Load the statistics document, or a fresh one if none exists.
    async fn load(&self) -> Result<StatsDocument, StatsError>;

    /// Persist the statistics document.
    async fn save(&self, doc: &StatsDocument) -> Result<(), StatsError>;
}

/// In-memory statistics store for testing.
pub struct MemoryStatsStore {
    doc: tokio::sync::RwLock<Option<StatsDocument>>,
}

impl MemoryStatsStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            doc: tokio::sync::RwLock::new(None),
        }
    }
}

impl Default for MemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn load(&self) -> Result<StatsDocument, StatsError> {
        let doc = self.doc.read().await;
        Ok(doc.clone().unwrap_or_default())
    }

    async fn save(&self, doc: &StatsDocument) -> Result<(), StatsError> {
        let mut slot = self.doc.write().await;
        *slot = Some(doc.clone());
        Ok(())
    }
}

/// File-backed statistics store.
///
/// The whole ledger lives in a single pretty-printed JSON file and is
/// rewritten on every save. A missing or unreadable file yields a fresh
/// document rather than an error, so a corrupt ledger never stops the
/// daemon from monitoring.
pub struct FileStatsStore {
    path: PathBuf,
}

impl FileStatsStore {
    /// Create a new file-backed store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl StatsStore for FileStatsStore {
    async fn load(&self) -> Result<StatsDocument, StatsError> {
        if !self.path.exists() {
            debug!("Stats file {:?} not found, starting fresh", self.path);
            return Ok(StatsDocument::default());
        }

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read stats file {:?}: {}", self.path, e);
                return Ok(StatsDocument::default());
            }
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(
                    "Failed to parse stats file {:?}, starting fresh: {}",
                    self.path, e
                );
                Ok(StatsDocument::default())
            }
        }
    }

    async fn save(&self, doc: &StatsDocument) -> Result<(), StatsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
