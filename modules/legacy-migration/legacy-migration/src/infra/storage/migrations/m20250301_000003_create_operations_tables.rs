//! Tables of the scheduling, skills and billing kinds.

use legacy_migration_sdk::EntityKind;
use sea_orm_migration::prelude::*;

use super::tables::{create_kinds, drop_kinds};

#[derive(DeriveMigrationName)]
pub struct Migration;

pub(super) const KINDS: [EntityKind; 16] = [
    EntityKind::VehicleType,
    EntityKind::SkillSet,
    EntityKind::InsuranceRequirement,
    EntityKind::SkillSetInsuranceRequirement,
    EntityKind::BulletinBoardItem,
    EntityKind::WorkOrderDeposit,
    EntityKind::WorkOrderInvoice,
    EntityKind::AssociateAwayLog,
    EntityKind::ActivitySheetItem,
    EntityKind::StaffTag,
    EntityKind::StaffComment,
    EntityKind::PartnerComment,
    EntityKind::AssociateVehicleType,
    EntityKind::AssociateSkillSet,
    EntityKind::AssociateInsuranceRequirement,
    EntityKind::WorkOrderSkillSet,
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_kinds(manager, &KINDS).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_kinds(manager, &KINDS).await
    }
}
