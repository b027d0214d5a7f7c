//! Collaborators of the migration core.

use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyId, LegacyRow, LegacyTable, NaturalKey, NewId, NewTenant, StorageError,
    Tenant, TenantId, UpsertRequest,
};

/// Write side of the migration: the multi-tenant destination database.
///
/// Every tenant-owned lookup takes the tenant id; there is no way to ask
/// for a row without naming the tenant it must belong to.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn find_tenant_by_schema_name(
        &self,
        schema_name: &str,
    ) -> Result<Option<Tenant>, StorageError>;

    async fn find_tenant_by_id(&self, legacy_id: LegacyId) -> Result<Option<Tenant>, StorageError>;

    /// Insert or refresh a tenant keyed by its legacy franchise id.
    async fn upsert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StorageError>;

    /// Identity index lookup: the row of `kind` within `tenant` claiming `legacy_id`.
    async fn find_new_id_by(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        legacy_id: LegacyId,
    ) -> Result<Option<NewId>, StorageError>;

    async fn find_new_id_by_natural_key(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        key: &NaturalKey,
    ) -> Result<Option<NewId>, StorageError>;

    /// A text column of an already-migrated row, for denormalised copies.
    async fn read_text(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<String>, StorageError>;

    /// An id column of an already-migrated row.
    async fn read_id(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<NewId>, StorageError>;

    /// Idempotent write; returns the stable new id of the row.
    async fn upsert(&self, tenant: TenantId, request: UpsertRequest) -> Result<NewId, StorageError>;
}

/// Read side of the migration: a snapshot of the legacy schema.
#[async_trait]
pub trait LegacySource: Send + Sync {
    /// Every row of `table`, ordered by ascending legacy id. Shared tables
    /// are filtered to `tenant`.
    async fn fetch_all(
        &self,
        table: &LegacyTable,
        tenant: Option<&Tenant>,
    ) -> Result<Vec<LegacyRow>, StorageError>;
}

/// Carries attachment blobs from the legacy object store to the new one.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Copy the object at `source_key` and return its destination key, or
    /// `None` when the source object does not exist.
    async fn transfer(
        &self,
        tenant: &Tenant,
        legacy_id: LegacyId,
        source_key: &str,
    ) -> Result<Option<String>, StorageError>;
}
