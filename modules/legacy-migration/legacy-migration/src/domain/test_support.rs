//! In-memory ports for unit tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use legacy_migration_sdk::{
    EntityKind, LegacyId, LegacyRow, LegacyTable, NaturalKey, NewId, NewTenant, StorageError,
    TargetRecord, TargetValue, Tenant, TenantId, UpsertRequest,
};

use crate::domain::ports::{BlobStore, DestinationStore, LegacySource};
use crate::domain::resolver::FkResolver;
use crate::domain::rules::RowContext;

#[derive(Debug, Clone)]
pub struct StoredRow {
    pub id: NewId,
    pub old_id: Option<LegacyId>,
    pub record: TargetRecord,
}

#[derive(Default)]
pub struct MemoryStore {
    tenants: Mutex<Vec<Tenant>>,
    rows: Mutex<HashMap<(TenantId, EntityKind), Vec<StoredRow>>>,
    lookups: AtomicUsize,
    broken: AtomicBool,
}

impl MemoryStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn break_writes(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn add_tenant(&self, schema_name: &str, old_id: i64) -> Tenant {
        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::generate(),
            old_id: LegacyId::try_from(old_id).unwrap(),
            schema_name: schema_name.to_owned(),
            name: schema_name.to_owned(),
            alternate_name: None,
            description: None,
            website_url: None,
            timezone: legacy_migration_sdk::DEFAULT_TIMEZONE.to_owned(),
            created_at: now,
            modified_at: now,
        };
        self.tenants.lock().unwrap().push(tenant.clone());
        tenant
    }

    pub fn insert_mapping(&self, tenant: TenantId, kind: EntityKind, legacy_id: LegacyId, id: NewId) {
        self.rows
            .lock()
            .unwrap()
            .entry((tenant, kind))
            .or_default()
            .push(StoredRow {
                id,
                old_id: Some(legacy_id),
                record: TargetRecord::new(),
            });
    }

    /// Seed an already-migrated row carrying `record`.
    pub fn insert_row(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        legacy_id: i64,
        record: TargetRecord,
    ) -> NewId {
        let id = NewId::generate();
        self.rows
            .lock()
            .unwrap()
            .entry((tenant, kind))
            .or_default()
            .push(StoredRow {
                id,
                old_id: Some(LegacyId::try_from(legacy_id).unwrap()),
                record,
            });
        id
    }

    pub fn rows(&self, tenant: TenantId, kind: EntityKind) -> Vec<StoredRow> {
        self.rows
            .lock()
            .unwrap()
            .get(&(tenant, kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn row(&self, tenant: TenantId, kind: EntityKind, legacy_id: i64) -> Option<StoredRow> {
        let legacy_id = LegacyId::try_from(legacy_id).unwrap();
        self.rows(tenant, kind)
            .into_iter()
            .find(|r| r.old_id == Some(legacy_id))
    }
}

fn natural_match(row: &StoredRow, key: &NaturalKey) -> bool {
    row.record.get(key.column).and_then(TargetValue::as_text) == Some(key.value.as_str())
}

#[async_trait]
impl DestinationStore for MemoryStore {
    async fn find_tenant_by_schema_name(
        &self,
        schema_name: &str,
    ) -> Result<Option<Tenant>, StorageError> {
        let tenants = self.tenants.lock().unwrap();
        Ok(tenants.iter().find(|t| t.schema_name == schema_name).cloned())
    }

    async fn find_tenant_by_id(&self, legacy_id: LegacyId) -> Result<Option<Tenant>, StorageError> {
        let tenants = self.tenants.lock().unwrap();
        Ok(tenants.iter().find(|t| t.old_id == legacy_id).cloned())
    }

    async fn upsert_tenant(&self, new: NewTenant) -> Result<Tenant, StorageError> {
        let mut tenants = self.tenants.lock().unwrap();
        let id = tenants
            .iter()
            .find(|t| t.old_id == new.old_id)
            .map_or_else(TenantId::generate, |t| t.id);
        tenants.retain(|t| t.old_id != new.old_id);
        let tenant = Tenant {
            id,
            old_id: new.old_id,
            schema_name: new.schema_name,
            name: new.name,
            alternate_name: new.alternate_name,
            description: new.description,
            website_url: new.website_url,
            timezone: new.timezone,
            created_at: new.created_at,
            modified_at: new.modified_at,
        };
        tenants.push(tenant.clone());
        Ok(tenant)
    }

    async fn find_new_id_by(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        legacy_id: LegacyId,
    ) -> Result<Option<NewId>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows(tenant, kind)
            .iter()
            .find(|r| r.old_id == Some(legacy_id))
            .map(|r| r.id))
    }

    async fn find_new_id_by_natural_key(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        key: &NaturalKey,
    ) -> Result<Option<NewId>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows(tenant, kind)
            .iter()
            .find(|r| natural_match(r, key))
            .map(|r| r.id))
    }

    async fn read_text(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self
            .rows(tenant, kind)
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.record.get(column).and_then(TargetValue::as_text).map(str::to_owned)))
    }

    async fn read_id(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<NewId>, StorageError> {
        Ok(self
            .rows(tenant, kind)
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.record.get(column).and_then(TargetValue::as_id)))
    }

    async fn upsert(&self, tenant: TenantId, request: UpsertRequest) -> Result<NewId, StorageError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("connection reset".to_owned()));
        }
        let mut rows = self.rows.lock().unwrap();
        let bucket = rows.entry((tenant, request.kind)).or_default();
        let legacy_id = request.key.legacy_id();
        let mut existing = legacy_id.and_then(|id| bucket.iter().position(|r| r.old_id == Some(id)));
        if existing.is_none()
            && let Some(key) = request.key.natural()
            && let Some(pos) = bucket.iter().position(|r| natural_match(r, key))
        {
            if let (Some(owner), Some(incoming)) = (bucket[pos].old_id, legacy_id)
                && owner != incoming
            {
                return Err(StorageError::KeyClaimed {
                    table: request.kind.target_table().to_owned(),
                    column: key.column.to_owned(),
                    claimed_by: owner,
                });
            }
            existing = Some(pos);
        }
        match existing {
            Some(pos) => {
                let row = &mut bucket[pos];
                row.record = request.record;
                if legacy_id.is_some() {
                    row.old_id = legacy_id;
                }
                Ok(row.id)
            }
            None => {
                let id = NewId::generate();
                bucket.push(StoredRow {
                    id,
                    old_id: legacy_id,
                    record: request.record,
                });
                Ok(id)
            }
        }
    }
}

/// One tenant over a [`MemoryStore`], for exercising mapping rules.
pub struct RuleHarness {
    pub store: Arc<MemoryStore>,
    pub tenant: Tenant,
    pub resolver: FkResolver,
}

impl Default for RuleHarness {
    fn default() -> Self {
        let store = Arc::new(MemoryStore::default());
        let tenant = store.add_tenant("london", 1);
        let resolver = FkResolver::new(store.clone(), false);
        Self {
            store,
            tenant,
            resolver,
        }
    }
}

impl RuleHarness {
    pub fn ctx(&self, legacy_id: i64) -> RowContext<'_> {
        RowContext::new(
            &self.tenant,
            &self.resolver,
            self.store.as_ref(),
            None,
            LegacyId::try_from(legacy_id).unwrap(),
        )
    }

    pub fn ctx_with_blobs<'a>(&'a self, legacy_id: i64, blobs: &'a dyn BlobStore) -> RowContext<'a> {
        RowContext::new(
            &self.tenant,
            &self.resolver,
            self.store.as_ref(),
            Some(blobs),
            LegacyId::try_from(legacy_id).unwrap(),
        )
    }

    pub fn seed(&self, kind: EntityKind, legacy_id: i64, record: TargetRecord) -> NewId {
        self.store.insert_row(self.tenant.id, kind, legacy_id, record)
    }
}

pub fn row(legacy_id: i64) -> LegacyRow {
    LegacyRow::new(LegacyId::try_from(legacy_id).unwrap())
}

pub fn text_of(record: &TargetRecord, column: &str) -> Option<String> {
    record.get(column).and_then(TargetValue::as_text).map(str::to_owned)
}

#[derive(Default)]
pub struct MemorySource {
    tables: Mutex<HashMap<&'static str, Vec<LegacyRow>>>,
}

impl MemorySource {
    pub fn put(&self, table: &'static str, mut rows: Vec<LegacyRow>) {
        rows.sort_by_key(LegacyRow::id);
        self.tables.lock().unwrap().insert(table, rows);
    }
}

#[async_trait]
impl LegacySource for MemorySource {
    async fn fetch_all(
        &self,
        table: &LegacyTable,
        _tenant: Option<&Tenant>,
    ) -> Result<Vec<LegacyRow>, StorageError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table.name)
            .cloned()
            .unwrap_or_default())
    }
}

/// Source objects by key; transfers record the destination keys written.
#[derive(Default)]
pub struct MemoryBlobs {
    sources: Mutex<Vec<String>>,
    written: Mutex<Vec<String>>,
}

impl MemoryBlobs {
    pub fn with_sources(keys: &[&str]) -> Self {
        Self {
            sources: Mutex::new(keys.iter().map(|k| (*k).to_owned()).collect()),
            written: Mutex::default(),
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn transfer(
        &self,
        tenant: &Tenant,
        legacy_id: LegacyId,
        source_key: &str,
    ) -> Result<Option<String>, StorageError> {
        if !self.sources.lock().unwrap().iter().any(|k| k == source_key) {
            return Ok(None);
        }
        let name = source_key.rsplit('/').next().unwrap();
        let key = format!("tenants/{}/private/{legacy_id}-{name}", tenant.id);
        self.written.lock().unwrap().push(key.clone());
        Ok(Some(key))
    }
}
