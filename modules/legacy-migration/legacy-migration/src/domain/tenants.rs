//! Tenant import: one destination tenant per legacy franchise.

use chrono::{DateTime, Utc};
use legacy_migration_sdk::{
    DEFAULT_TIMEZONE, LegacyColumn, LegacyRow, LegacyTable, MigrationError, NewTenant, RowError,
    SkippedRow, TenantImport,
};
use tracing::{info, instrument, warn};

use crate::domain::ports::{DestinationStore, LegacySource};

pub const FRANCHISES: LegacyTable = LegacyTable {
    name: "workery_franchises",
    id_column: LegacyTable::ID,
    columns: &[
        LegacyColumn::text("schema_name"),
        LegacyColumn::text("name"),
        LegacyColumn::text("alternate_name"),
        LegacyColumn::text("description"),
        LegacyColumn::text("url"),
        LegacyColumn::text("timezone"),
        LegacyColumn::timestamp("created"),
        LegacyColumn::timestamp("last_modified"),
    ],
    tenant_column: None,
};

fn new_tenant(row: &LegacyRow) -> Result<NewTenant, RowError> {
    let schema_name = row.required_text("schema_name")?.trim();
    if schema_name.is_empty() {
        return Err(RowError::MissingRequired {
            field: "schema_name",
        });
    }
    let created = row.timestamp("created")?;
    let modified = row.timestamp("last_modified")?;
    // Fallbacks depend only on the row; reruns write identical tenants.
    let created_at = created.or(modified).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let non_blank = |field: &'static str| -> Result<Option<String>, RowError> {
        Ok(row
            .text(field)?
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned))
    };

    Ok(NewTenant {
        old_id: row.id(),
        schema_name: schema_name.to_owned(),
        name: non_blank("name")?.unwrap_or_else(|| schema_name.to_owned()),
        alternate_name: non_blank("alternate_name")?,
        description: non_blank("description")?,
        website_url: non_blank("url")?,
        timezone: non_blank("timezone")?.unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned()),
        created_at,
        modified_at: modified.unwrap_or(created_at),
    })
}

/// Create or refresh a tenant for every legacy franchise.
///
/// Tenant ids survive reruns: the store keys tenants by their legacy id.
///
/// # Errors
/// Storage failures abort the import; malformed franchises are skipped and
/// listed in the result.
#[instrument(skip_all)]
pub async fn import_tenants(
    source: &dyn LegacySource,
    store: &dyn DestinationStore,
) -> Result<TenantImport, MigrationError> {
    let rows = source.fetch_all(&FRANCHISES, None).await?;
    let mut import = TenantImport::default();
    for row in &rows {
        let new = match new_tenant(row) {
            Ok(new) => new,
            Err(e) => {
                let reason = e.to_string();
                warn!(legacy_id = %row.id(), %reason, "skipping franchise");
                import.skipped.push(SkippedRow {
                    legacy_id: row.id(),
                    reason,
                });
                continue;
            }
        };
        let tenant = store
            .upsert_tenant(new)
            .await
            .map_err(|source| MigrationError::StorageAtRow {
                legacy_id: row.id(),
                source,
            })?;
        info!(tenant_id = %tenant.id, schema = %tenant.schema_name, "tenant imported");
        import.tenants.push(tenant);
    }
    info!(
        imported = import.tenants.len(),
        skipped = import.skipped.len(),
        "tenant import finished"
    );
    Ok(import)
}
