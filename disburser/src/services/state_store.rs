//! File-backed ledger storage
//!
//! Each ledger is a newline-delimited text file of lower-case addresses in
//! the state directory. Writes go to a sibling temp file which is then
//! renamed over the ledger, so a crash leaves either the old or the new
//! contents.

use std::path::PathBuf;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use shared::{component_debug, AddressSet, Component};
use crate::error::{DisburserError, DisburserResult};
use crate::traits::StateStore;
use crate::types::LedgerKind;

/// Ledger storage rooted at a directory
pub struct FileStateStore {
    state_dir: PathBuf,
}

impl FileStateStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { state_dir: state_dir.into() }
    }

    /// Path of a ledger file
    pub fn ledger_path(&self, ledger: LedgerKind) -> PathBuf {
        self.state_dir.join(ledger.file_name())
    }

    fn temp_path(&self, ledger: LedgerKind) -> PathBuf {
        self.state_dir.join(format!("{}.tmp", ledger.file_name()))
    }

    fn state_error(operation: &str, ledger: LedgerKind, source: std::io::Error) -> DisburserError {
        DisburserError::StateError {
            operation: operation.to_string(),
            ledger,
            source,
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, ledger: LedgerKind) -> DisburserResult<AddressSet> {
        let path = self.ledger_path(ledger);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                component_debug!(Component::StateStore, "📂 {} ledger not found at {}, starting empty", ledger, path.display());
                return Ok(AddressSet::new());
            }
            Err(e) => return Err(Self::state_error("read", ledger, e)),
        };

        let addresses = AddressSet::from_lines(&content);
        component_debug!(Component::StateStore, "📂 Loaded {} addresses from {} ledger", addresses.len(), ledger);
        Ok(addresses)
    }

    async fn save(&self, ledger: LedgerKind, addresses: &AddressSet) -> DisburserResult<()> {
        fs::create_dir_all(&self.state_dir)
            .await
            .map_err(|e| Self::state_error("create directory", ledger, e))?;

        let temp_path = self.temp_path(ledger);
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Self::state_error("create", ledger, e))?;
        file.write_all(addresses.to_lines().as_bytes())
            .await
            .map_err(|e| Self::state_error("write", ledger, e))?;
        file.sync_all()
            .await
            .map_err(|e| Self::state_error("sync", ledger, e))?;
        drop(file);

        fs::rename(&temp_path, self.ledger_path(ledger))
            .await
            .map_err(|e| Self::state_error("rename", ledger, e))?;

        component_debug!(Component::StateStore, "💾 Saved {} addresses to {} ledger", addresses.len(), ledger);
        Ok(())
    }
}
