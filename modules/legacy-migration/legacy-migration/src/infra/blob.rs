//! Filesystem blob store: legacy uploads on one directory tree, migrated
//! objects on another.

use async_trait::async_trait;
use legacy_migration_sdk::{LegacyId, StorageError, Tenant};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::ports::BlobStore;

pub struct FsBlobStore {
    source_dir: PathBuf,
    destination_dir: PathBuf,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
        }
    }

    /// Destination key of a migrated upload.
    #[must_use]
    pub fn destination_key(tenant: &Tenant, legacy_id: LegacyId, file_name: &str) -> String {
        format!("tenants/{}/private/{legacy_id}-{file_name}", tenant.id)
    }
}

/// Legacy keys are relative paths; anything escaping the source tree is
/// treated as absent.
fn is_plain_relative(key: &Path) -> bool {
    key.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn blob_err(key: &str, err: &std::io::Error) -> StorageError {
    StorageError::Blob {
        key: key.to_owned(),
        message: err.to_string(),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn transfer(
        &self,
        tenant: &Tenant,
        legacy_id: LegacyId,
        source_key: &str,
    ) -> Result<Option<String>, StorageError> {
        let relative = Path::new(source_key);
        let file_name = relative.file_name().and_then(|n| n.to_str());
        let Some(file_name) = file_name.filter(|_| is_plain_relative(relative)) else {
            warn!(%legacy_id, key = source_key, "unusable legacy blob key");
            return Ok(None);
        };

        let bytes = match tokio::fs::read(self.source_dir.join(relative)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(blob_err(source_key, &e)),
        };

        let key = Self::destination_key(tenant, legacy_id, file_name);
        let target = self.destination_dir.join(&key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| blob_err(&key, &e))?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| blob_err(&key, &e))?;
        debug!(%legacy_id, %key, bytes = bytes.len(), "blob copied");
        Ok(Some(key))
    }
}
