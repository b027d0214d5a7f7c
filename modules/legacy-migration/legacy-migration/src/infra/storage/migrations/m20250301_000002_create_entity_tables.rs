//! The tenant-scoped tables of the core kinds, each carrying the identity
//! index `(tenant_id, old_id)`.

use legacy_migration_sdk::EntityKind;
use sea_orm_migration::prelude::*;

use super::tables::{create_kinds, drop_kinds, index};

#[derive(DeriveMigrationName)]
pub struct Migration;

pub(super) const KINDS: [EntityKind; 19] = [
    EntityKind::User,
    EntityKind::HowHearAboutUsItem,
    EntityKind::Tag,
    EntityKind::ServiceFee,
    EntityKind::Comment,
    EntityKind::Associate,
    EntityKind::Customer,
    EntityKind::Partner,
    EntityKind::Staff,
    EntityKind::OngoingWorkOrder,
    EntityKind::WorkOrder,
    EntityKind::TaskItem,
    EntityKind::AssociateTag,
    EntityKind::CustomerTag,
    EntityKind::WorkOrderTag,
    EntityKind::AssociateComment,
    EntityKind::CustomerComment,
    EntityKind::WorkOrderComment,
    EntityKind::PrivateFile,
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_kinds(manager, &KINDS).await?;
        manager
            .create_index(index(EntityKind::User, "email", &["tenant_id", "email"], true))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_kinds(manager, &KINDS).await
    }
}
