use legacy_migration_sdk::{MigrationError, Tenant, TenantSelector};
use tracing::{debug, instrument};

use crate::domain::ports::DestinationStore;

/// Establish the tenant scope of a run.
///
/// # Errors
/// Returns `MigrationError::TenantNotFound` when no migrated tenant matches;
/// the caller must stop before touching any row.
#[instrument(skip(store), fields(selector = %selector))]
pub async fn resolve_tenant(
    store: &dyn DestinationStore,
    selector: &TenantSelector,
) -> Result<Tenant, MigrationError> {
    let found = match selector {
        TenantSelector::SchemaName(name) => store.find_tenant_by_schema_name(name).await?,
        TenantSelector::LegacyId(id) => store.find_tenant_by_id(*id).await?,
    };

    let tenant = found.ok_or_else(|| MigrationError::TenantNotFound {
        selector: selector.clone(),
    })?;
    debug!(tenant_id = %tenant.id, "tenant resolved");
    Ok(tenant)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::domain::test_support::MemoryStore;
    use legacy_migration_sdk::LegacyId;

    #[tokio::test]
    async fn resolves_by_schema_or_legacy_id() {
        let store = MemoryStore::default();
        let london = store.add_tenant("london", 2);

        let by_schema = resolve_tenant(&store, &TenantSelector::SchemaName("london".to_owned()))
            .await
            .unwrap();
        assert_eq!(by_schema.id, london.id);

        let by_id = resolve_tenant(&store, &TenantSelector::LegacyId(LegacyId::try_from(2_i64).unwrap()))
            .await
            .unwrap();
        assert_eq!(by_id.id, london.id);
    }

    #[tokio::test]
    async fn unknown_tenant_is_fatal() {
        let store = MemoryStore::default();
        store.add_tenant("london", 2);

        let err = resolve_tenant(&store, &TenantSelector::SchemaName("paris".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::TenantNotFound { .. }));
        assert!(err.to_string().contains("paris"));
    }
}
