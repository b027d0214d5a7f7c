//! `SeaORM` implementation of the destination store.

use async_trait::async_trait;
use etl_db::scoped::{TenantScope, insert_into, select_from, update_table};
use legacy_migration_sdk::{
    EntityKind, LegacyId, NaturalKey, NewId, NewTenant, StorageError, Tenant, TenantId,
    UpsertRequest,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::entity::tenant;
use super::values::{db_err, get, scope_err, scope_for, to_value};
use crate::domain::ports::DestinationStore;

const TENANTS: &str = "tenants";

/// Destination store over any `SeaORM` connection.
///
/// Every tenant-owned statement goes through the scoped query layer, so a
/// lookup or write can only ever see rows of the tenant it was asked for.
#[derive(Clone)]
pub struct SeaOrmDestinationStore {
    conn: DatabaseConnection,
}

impl SeaOrmDestinationStore {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    async fn find_tenant(
        &self,
        filter: sea_orm::sea_query::SimpleExpr,
    ) -> Result<Option<Tenant>, StorageError> {
        tenant::Entity::find()
            .filter(filter)
            .one(&self.conn)
            .await
            .map_err(|e| db_err(TENANTS, &e))?
            .map(Tenant::try_from)
            .transpose()
    }
}

async fn id_where<C>(
    conn: &C,
    scope: &TenantScope,
    table: &str,
    column: &str,
    value: sea_orm::Value,
) -> Result<Option<NewId>, StorageError>
where
    C: ConnectionTrait + Send + Sync,
{
    let row = select_from(table)
        .column("id")
        .scope_with(scope)
        .and_eq(column, value)
        .one(conn)
        .await
        .map_err(|e| scope_err(table, &e))?;
    row.map(|r| get::<Uuid>(&r, table, "id").map(NewId::from))
        .transpose()
}

/// Match an existing row: legacy id first, then the natural key.
///
/// A natural-key match is adopted only when it has no legacy id yet or the
/// same one; a row owned by another legacy id is never taken over.
async fn existing_row<C>(
    conn: &C,
    scope: &TenantScope,
    table: &str,
    request: &UpsertRequest,
) -> Result<Option<NewId>, StorageError>
where
    C: ConnectionTrait + Send + Sync,
{
    let legacy_id = request.key.legacy_id();
    if let Some(legacy_id) = legacy_id {
        let found = id_where(conn, scope, table, "old_id", legacy_id.get().into()).await?;
        if found.is_some() {
            return Ok(found);
        }
    }
    let Some(key) = request.key.natural() else {
        return Ok(None);
    };
    let row = select_from(table)
        .column("id")
        .column("old_id")
        .scope_with(scope)
        .and_eq(key.column, key.value.clone())
        .one(conn)
        .await
        .map_err(|e| scope_err(table, &e))?;
    let Some(row) = row else {
        return Ok(None);
    };
    let owner = get::<Option<i64>>(&row, table, "old_id")?
        .map(|raw| {
            LegacyId::try_from(raw).map_err(|e| StorageError::Decode {
                table: table.to_owned(),
                column: "old_id".to_owned(),
                message: e.to_string(),
            })
        })
        .transpose()?;
    match (owner, legacy_id) {
        (Some(owner), Some(incoming)) if owner != incoming => Err(StorageError::KeyClaimed {
            table: table.to_owned(),
            column: key.column.to_owned(),
            claimed_by: owner,
        }),
        _ => get::<Uuid>(&row, table, "id").map(|id| Some(NewId::from(id))),
    }
}

impl SeaOrmDestinationStore {
    async fn upsert_once(
        &self,
        scope: &TenantScope,
        request: &UpsertRequest,
    ) -> Result<NewId, StorageError> {
        let table = request.kind.target_table();
        let txn = self.conn.begin().await.map_err(|e| db_err(table, &e))?;
        let legacy_id = request.key.legacy_id();

        let id = match existing_row(&txn, scope, table, request).await? {
            Some(id) => {
                let mut update = update_table(table);
                for (column, value) in request.record.iter() {
                    update = update.value(column, to_value(value));
                }
                if let Some(legacy_id) = legacy_id {
                    update = update.value("old_id", legacy_id.get());
                }
                if !request.record.is_empty() || legacy_id.is_some() {
                    update
                        .scope_with(scope)
                        .and_eq("id", id.as_uuid())
                        .exec(&txn)
                        .await
                        .map_err(|e| scope_err(table, &e))?;
                }
                debug!(%id, "updated");
                id
            }
            None => {
                let id = NewId::generate();
                let mut insert = insert_into(table)
                    .value("id", id.as_uuid())
                    .value("old_id", legacy_id.map(LegacyId::get));
                for (column, value) in request.record.iter() {
                    insert = insert.value(column, to_value(value));
                }
                insert
                    .scope_with(scope)
                    .exec(&txn)
                    .await
                    .map_err(|e| scope_err(table, &e))?;
                debug!(%id, "inserted");
                id
            }
        };

        txn.commit().await.map_err(|e| db_err(table, &e))?;
        Ok(id)
    }

    async fn read_column(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<sea_orm::QueryResult>, StorageError> {
        let table = kind.target_table();
        select_from(table)
            .column(column)
            .scope_with(&scope_for(tenant)?)
            .and_eq("id", id.as_uuid())
            .one(&self.conn)
            .await
            .map_err(|e| scope_err(table, &e))
    }
}

#[async_trait]
impl DestinationStore for SeaOrmDestinationStore {
    async fn find_tenant_by_schema_name(
        &self,
        schema_name: &str,
    ) -> Result<Option<Tenant>, StorageError> {
        self.find_tenant(tenant::Column::SchemaName.eq(schema_name))
            .await
    }

    async fn find_tenant_by_id(&self, legacy_id: LegacyId) -> Result<Option<Tenant>, StorageError> {
        self.find_tenant(tenant::Column::OldId.eq(legacy_id.get()))
            .await
    }

    #[instrument(skip(self, new), fields(legacy_id = %new.old_id, schema = %new.schema_name))]
    async fn upsert_tenant(&self, new: NewTenant) -> Result<Tenant, StorageError> {
        let txn = self.conn.begin().await.map_err(|e| db_err(TENANTS, &e))?;
        let existing = tenant::Entity::find()
            .filter(tenant::Column::OldId.eq(new.old_id.get()))
            .one(&txn)
            .await
            .map_err(|e| db_err(TENANTS, &e))?;

        let is_new = existing.is_none();
        let mut model: tenant::ActiveModel = match existing {
            Some(m) => m.into(),
            None => tenant::ActiveModel {
                id: Set(TenantId::generate().as_uuid()),
                old_id: Set(new.old_id.get()),
                ..<tenant::ActiveModel as Default>::default()
            },
        };
        model.schema_name = Set(new.schema_name);
        model.name = Set(new.name);
        model.alternate_name = Set(new.alternate_name);
        model.description = Set(new.description);
        model.website_url = Set(new.website_url);
        model.timezone = Set(new.timezone);
        model.created_at = Set(new.created_at);
        model.modified_at = Set(new.modified_at);

        let saved = if is_new {
            model.insert(&txn).await
        } else {
            model.update(&txn).await
        };
        let saved = saved.map_err(|e| db_err(TENANTS, &e))?;
        txn.commit().await.map_err(|e| db_err(TENANTS, &e))?;
        Tenant::try_from(saved)
    }

    async fn find_new_id_by(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        legacy_id: LegacyId,
    ) -> Result<Option<NewId>, StorageError> {
        let scope = scope_for(tenant)?;
        id_where(
            &self.conn,
            &scope,
            kind.target_table(),
            "old_id",
            legacy_id.get().into(),
        )
        .await
    }

    async fn find_new_id_by_natural_key(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        key: &NaturalKey,
    ) -> Result<Option<NewId>, StorageError> {
        let scope = scope_for(tenant)?;
        id_where(
            &self.conn,
            &scope,
            kind.target_table(),
            key.column,
            key.value.clone().into(),
        )
        .await
    }

    async fn read_text(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<String>, StorageError> {
        let row = self.read_column(tenant, kind, id, column).await?;
        Ok(match row {
            Some(r) => get::<Option<String>>(&r, kind.target_table(), column)?,
            None => None,
        })
    }

    async fn read_id(
        &self,
        tenant: TenantId,
        kind: EntityKind,
        id: NewId,
        column: &'static str,
    ) -> Result<Option<NewId>, StorageError> {
        let row = self.read_column(tenant, kind, id, column).await?;
        Ok(match row {
            Some(r) => get::<Option<Uuid>>(&r, kind.target_table(), column)?.map(NewId::from),
            None => None,
        })
    }

    #[instrument(skip(self, request), fields(tenant_id = %tenant, kind = %request.kind))]
    async fn upsert(&self, tenant: TenantId, request: UpsertRequest) -> Result<NewId, StorageError> {
        let scope = scope_for(tenant)?;
        match self.upsert_once(&scope, &request).await {
            // A concurrent writer inserted the same key after our lookup; the
            // second attempt takes the update branch.
            Err(StorageError::Constraint { message, .. }) => {
                debug!(%message, "retrying upsert after unique violation");
                self.upsert_once(&scope, &request).await
            }
            other => other,
        }
    }
}
