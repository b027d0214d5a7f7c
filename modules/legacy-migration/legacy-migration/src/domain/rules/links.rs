//! Join tables: tags, comments, skills and requirements attached to parties,
//! work orders and skill sets.

use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord,
};

use super::{MappingRule, RowContext, tenant_table};

/// One side of a join row.
#[derive(Debug, Clone, Copy)]
struct Side {
    legacy_field: &'static str,
    target: EntityKind,
    column: &'static str,
}

const fn side(legacy_field: &'static str, target: EntityKind, column: &'static str) -> Side {
    Side {
        legacy_field,
        target,
        column,
    }
}

/// A join row resolving two required references.
#[derive(Debug, Clone, Copy)]
pub struct LinkRule {
    kind: EntityKind,
    owner: Side,
    item: Side,
    columns: &'static [LegacyColumn],
}

const fn link(
    kind: EntityKind,
    owner: Side,
    item: Side,
    columns: &'static [LegacyColumn],
) -> LinkRule {
    LinkRule {
        kind,
        owner,
        item,
        columns,
    }
}

const TAG: Side = side("tag_id", EntityKind::Tag, "tag_id");
const COMMENT: Side = side("comment_id", EntityKind::Comment, "comment_id");
const ASSOCIATE: Side = side("associate_id", EntityKind::Associate, "associate_id");
const SKILL_SET: Side = side("skillset_id", EntityKind::SkillSet, "skill_set_id");
const INSURANCE_REQUIREMENT: Side = side(
    "insurancerequirement_id",
    EntityKind::InsuranceRequirement,
    "insurance_requirement_id",
);

/// Comment threads name their owner `about_id`.
const fn about(target: EntityKind, column: &'static str) -> Side {
    side("about_id", target, column)
}

const ASSOCIATE_TAG_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("associate_id"), LegacyColumn::int("tag_id")];
const CUSTOMER_TAG_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("customer_id"), LegacyColumn::int("tag_id")];
const WORK_ORDER_TAG_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("workorder_id"), LegacyColumn::int("tag_id")];
const STAFF_TAG_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("staff_id"), LegacyColumn::int("tag_id")];
const ABOUT_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("about_id"), LegacyColumn::int("comment_id")];
const ASSOCIATE_VEHICLE_TYPE_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("associate_id"), LegacyColumn::int("vehicletype_id")];
const ASSOCIATE_SKILL_SET_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("associate_id"), LegacyColumn::int("skillset_id")];
const ASSOCIATE_INSURANCE_REQUIREMENT_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("associate_id"),
    LegacyColumn::int("insurancerequirement_id"),
];
const WORK_ORDER_SKILL_SET_COLUMNS: &[LegacyColumn] =
    &[LegacyColumn::int("workorder_id"), LegacyColumn::int("skillset_id")];
const SKILL_SET_INSURANCE_REQUIREMENT_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("skillset_id"),
    LegacyColumn::int("insurancerequirement_id"),
];

pub const ASSOCIATE_TAG: LinkRule =
    link(EntityKind::AssociateTag, ASSOCIATE, TAG, ASSOCIATE_TAG_COLUMNS);
pub const CUSTOMER_TAG: LinkRule = link(
    EntityKind::CustomerTag,
    side("customer_id", EntityKind::Customer, "customer_id"),
    TAG,
    CUSTOMER_TAG_COLUMNS,
);
pub const WORK_ORDER_TAG: LinkRule = link(
    EntityKind::WorkOrderTag,
    side("workorder_id", EntityKind::WorkOrder, "work_order_id"),
    TAG,
    WORK_ORDER_TAG_COLUMNS,
);
pub const STAFF_TAG: LinkRule = link(
    EntityKind::StaffTag,
    side("staff_id", EntityKind::Staff, "staff_id"),
    TAG,
    STAFF_TAG_COLUMNS,
);
pub const ASSOCIATE_COMMENT: LinkRule = link(
    EntityKind::AssociateComment,
    about(EntityKind::Associate, "associate_id"),
    COMMENT,
    ABOUT_COLUMNS,
);
pub const CUSTOMER_COMMENT: LinkRule = link(
    EntityKind::CustomerComment,
    about(EntityKind::Customer, "customer_id"),
    COMMENT,
    ABOUT_COLUMNS,
);
pub const WORK_ORDER_COMMENT: LinkRule = link(
    EntityKind::WorkOrderComment,
    about(EntityKind::WorkOrder, "work_order_id"),
    COMMENT,
    ABOUT_COLUMNS,
);
pub const STAFF_COMMENT: LinkRule = link(
    EntityKind::StaffComment,
    about(EntityKind::Staff, "staff_id"),
    COMMENT,
    ABOUT_COLUMNS,
);
pub const PARTNER_COMMENT: LinkRule = link(
    EntityKind::PartnerComment,
    about(EntityKind::Partner, "partner_id"),
    COMMENT,
    ABOUT_COLUMNS,
);
pub const ASSOCIATE_VEHICLE_TYPE: LinkRule = link(
    EntityKind::AssociateVehicleType,
    ASSOCIATE,
    side("vehicletype_id", EntityKind::VehicleType, "vehicle_type_id"),
    ASSOCIATE_VEHICLE_TYPE_COLUMNS,
);
pub const ASSOCIATE_SKILL_SET: LinkRule = link(
    EntityKind::AssociateSkillSet,
    ASSOCIATE,
    SKILL_SET,
    ASSOCIATE_SKILL_SET_COLUMNS,
);
pub const ASSOCIATE_INSURANCE_REQUIREMENT: LinkRule = link(
    EntityKind::AssociateInsuranceRequirement,
    ASSOCIATE,
    INSURANCE_REQUIREMENT,
    ASSOCIATE_INSURANCE_REQUIREMENT_COLUMNS,
);
pub const WORK_ORDER_SKILL_SET: LinkRule = link(
    EntityKind::WorkOrderSkillSet,
    side("workorder_id", EntityKind::WorkOrder, "work_order_id"),
    SKILL_SET,
    WORK_ORDER_SKILL_SET_COLUMNS,
);
pub const SKILL_SET_INSURANCE_REQUIREMENT: LinkRule = link(
    EntityKind::SkillSetInsuranceRequirement,
    SKILL_SET,
    INSURANCE_REQUIREMENT,
    SKILL_SET_INSURANCE_REQUIREMENT_COLUMNS,
);

#[async_trait]
impl MappingRule for LinkRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind, self.columns)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let mut record = TargetRecord::new();
        for side in [self.owner, self.item] {
            let id = ctx.required(row, side.legacy_field, side.target).await?;
            record = record.id(side.column, Some(id));
        }
        Ok(record)
    }
}
