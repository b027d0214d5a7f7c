//! Foreign-key resolution: legacy ids to destination ids, within one tenant.

use std::sync::Arc;

use dashmap::DashMap;
use legacy_migration_sdk::{EntityKind, LegacyId, NewId, Resolution, StorageError, TenantId};
use tracing::trace;

use crate::domain::ports::DestinationStore;

type CacheKey = (TenantId, EntityKind, LegacyId);

/// Resolves legacy foreign keys through the destination's identity index.
///
/// The optional cache only ever holds positive answers. A miss is re-queried
/// every time, since a later row of the same run may create the mapping.
pub struct FkResolver {
    store: Arc<dyn DestinationStore>,
    cache: Option<DashMap<CacheKey, NewId>>,
}

impl FkResolver {
    #[must_use]
    pub fn new(store: Arc<dyn DestinationStore>, cache_resolutions: bool) -> Self {
        Self {
            store,
            cache: cache_resolutions.then(DashMap::new),
        }
    }

    /// Resolve `legacy_id` of `kind` within `tenant`.
    ///
    /// An absent input resolves to `Absent` without touching the store.
    ///
    /// # Errors
    /// Returns `StorageError` when the lookup itself fails; "not found" is
    /// `Ok(Resolution::Unresolved)`.
    pub async fn resolve(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        legacy_id: Option<LegacyId>,
    ) -> Result<Resolution, StorageError> {
        let Some(legacy_id) = legacy_id else {
            return Ok(Resolution::Absent);
        };

        let key = (tenant, kind, legacy_id);
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key).map(|e| *e.value())) {
            return Ok(Resolution::Resolved(hit));
        }

        match self.store.find_new_id_by(tenant, kind, legacy_id).await? {
            Some(new_id) => {
                self.remember(tenant, kind, legacy_id, new_id);
                Ok(Resolution::Resolved(new_id))
            }
            None => {
                trace!(%kind, %legacy_id, "no mapping yet");
                Ok(Resolution::Unresolved { kind, legacy_id })
            }
        }
    }

    /// Record a mapping just created by an upsert.
    pub fn remember(&self, tenant: TenantId, kind: EntityKind, legacy_id: LegacyId, new_id: NewId) {
        if let Some(cache) = &self.cache {
            cache.insert((tenant, kind, legacy_id), new_id);
        }
    }
}
