use chrono::{DateTime, Utc};
use legacy_migration_sdk::{LegacyId, StorageError, Tenant};
use sea_orm::entity::prelude::*;

/// Row of the `tenants` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub old_id: i64,
    pub schema_name: String,
    pub name: String,
    pub alternate_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Tenant {
    type Error = StorageError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let old_id = LegacyId::try_from(m.old_id).map_err(|e| StorageError::Decode {
            table: "tenants".to_owned(),
            column: "old_id".to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self {
            id: m.id.into(),
            old_id,
            schema_name: m.schema_name,
            name: m.name,
            alternate_name: m.alternate_name,
            description: m.description,
            website_url: m.website_url,
            timezone: m.timezone,
            created_at: m.created_at,
            modified_at: m.modified_at,
        })
    }
}
