//! Tenant lookup tables and free-standing comments.

use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord,
};

use super::states::record_state;
use super::{MappingRule, RowContext, tenant_table};

/// `created_*` and `modified_*` columns shared by every audited kind.
pub(super) async fn audit_columns(
    ctx: &mut RowContext<'_>,
    row: &LegacyRow,
    record: TargetRecord,
    created_at: &'static str,
    modified_at: &'static str,
) -> Result<TargetRecord, RowError> {
    let created_by = ctx.optional(row, "created_by_id", EntityKind::User).await?;
    let modified_by = ctx
        .optional(row, "last_modified_by_id", EntityKind::User)
        .await?;
    Ok(record
        .timestamp("created_at", row.timestamp(created_at)?)
        .id("created_by_id", created_by)
        .timestamp("modified_at", row.timestamp(modified_at)?)
        .id("modified_by_id", modified_by))
}

pub struct HowHearRule;

const HOW_HEAR_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("text"),
    LegacyColumn::int("sort_number"),
    LegacyColumn::bool("is_for_associate"),
    LegacyColumn::bool("is_for_customer"),
    LegacyColumn::bool("is_for_staff"),
    LegacyColumn::bool("is_for_partner"),
    LegacyColumn::bool("is_archived"),
];

#[async_trait]
impl MappingRule for HowHearRule {
    fn kind(&self) -> EntityKind {
        EntityKind::HowHearAboutUsItem
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), HOW_HEAR_COLUMNS)
    }

    async fn map(
        &self,
        _ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        Ok(TargetRecord::new()
            .text("text", Some(row.required_text("text")?))
            .int("sort_number", row.int("sort_number")?)
            .bool("is_for_associate", row.flag("is_for_associate")?)
            .bool("is_for_customer", row.flag("is_for_customer")?)
            .bool("is_for_staff", row.flag("is_for_staff")?)
            .bool("is_for_partner", row.flag("is_for_partner")?)
            .int("state", record_state(row.flag("is_archived")?)))
    }
}

/// Lookups made of a label, a description and an archived flag: tags,
/// vehicle types and insurance requirements.
pub struct TextLookupRule {
    kind: EntityKind,
}

impl TextLookupRule {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }
}

const TEXT_LOOKUP_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("text"),
    LegacyColumn::text("description"),
    LegacyColumn::bool("is_archived"),
];

#[async_trait]
impl MappingRule for TextLookupRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind, TEXT_LOOKUP_COLUMNS)
    }

    async fn map(
        &self,
        _ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        Ok(TargetRecord::new()
            .text("text", Some(row.required_text("text")?))
            .text("description", row.text("description")?)
            .int("state", record_state(row.flag("is_archived")?)))
    }
}

pub struct SkillSetRule;

const SKILL_SET_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("category"),
    LegacyColumn::text("sub_category"),
    LegacyColumn::text("description"),
    LegacyColumn::bool("is_archived"),
];

#[async_trait]
impl MappingRule for SkillSetRule {
    fn kind(&self) -> EntityKind {
        EntityKind::SkillSet
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), SKILL_SET_COLUMNS)
    }

    async fn map(
        &self,
        _ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        Ok(TargetRecord::new()
            .text("category", Some(row.required_text("category")?))
            .text("sub_category", Some(row.text_or_empty("sub_category")?))
            .text("description", row.text("description")?)
            .int("state", record_state(row.flag("is_archived")?)))
    }
}

pub struct ServiceFeeRule;

const SERVICE_FEE_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("title"),
    LegacyColumn::text("description"),
    LegacyColumn::float("percentage"),
    LegacyColumn::bool("is_archived"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for ServiceFeeRule {
    fn kind(&self) -> EntityKind {
        EntityKind::ServiceFee
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), SERVICE_FEE_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let record = TargetRecord::new()
            .text("title", Some(row.required_text("title")?))
            .text("description", row.text("description")?)
            .float("percentage", row.float("percentage")?)
            .int("state", record_state(row.flag("is_archived")?));
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}

pub struct CommentRule;

const COMMENT_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("text"),
    LegacyColumn::bool("is_archived"),
    LegacyColumn::timestamp("created"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for CommentRule {
    fn kind(&self) -> EntityKind {
        EntityKind::Comment
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), COMMENT_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let record = TargetRecord::new()
            .text("text", Some(row.text_or_empty("text")?))
            .int("state", record_state(row.flag("is_archived")?));
        audit_columns(ctx, row, record, "created", "last_modified").await
    }
}

/// Notices shown to every staff member of the tenant.
pub struct BulletinBoardItemRule;

const BULLETIN_BOARD_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("text"),
    LegacyColumn::bool("is_archived"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::text("created_from"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
    LegacyColumn::text("last_modified_from"),
];

#[async_trait]
impl MappingRule for BulletinBoardItemRule {
    fn kind(&self) -> EntityKind {
        EntityKind::BulletinBoardItem
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), BULLETIN_BOARD_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let record = TargetRecord::new()
            .text("text", Some(row.text_or_empty("text")?))
            .text("created_from", row.text("created_from")?)
            .text("modified_from", row.text("last_modified_from")?)
            .int("state", record_state(row.flag("is_archived")?));
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::domain::rules::states::{STATE_ACTIVE, STATE_INACTIVE};
    use crate::domain::test_support::{RuleHarness, row, text_of};
    use legacy_migration_sdk::TargetValue;

    #[tokio::test]
    async fn archived_tag_is_inactive() {
        let h = RuleHarness::default();
        let record = TextLookupRule::new(EntityKind::Tag)
            .map(&mut h.ctx(4), &row(4).with("text", "Seniors").with("is_archived", true))
            .await
            .unwrap();
        assert_eq!(text_of(&record, "text").as_deref(), Some("Seniors"));
        assert_eq!(record.get("state").and_then(TargetValue::as_int), Some(STATE_INACTIVE));
    }

    #[tokio::test]
    async fn comment_author_resolves_within_tenant() {
        let h = RuleHarness::default();
        let author = h.seed(EntityKind::User, 8, TargetRecord::new());

        let mut ctx = h.ctx(30);
        let legacy = row(30)
            .with("text", "Called back")
            .with("created_by_id", 8_i64)
            .with("last_modified_by_id", 9_i64);
        let record = CommentRule.map(&mut ctx, &legacy).await.unwrap();

        assert_eq!(record.get("created_by_id").and_then(TargetValue::as_id), Some(author));
        assert_eq!(record.get("modified_by_id").and_then(TargetValue::as_id), None);
        assert_eq!(record.get("state").and_then(TargetValue::as_int), Some(STATE_ACTIVE));
        assert_eq!(ctx.into_degraded().len(), 1);
    }

    #[tokio::test]
    async fn vehicle_type_and_skill_set_need_their_label() {
        let h = RuleHarness::default();
        let record = TextLookupRule::new(EntityKind::VehicleType)
            .map(&mut h.ctx(2), &row(2).with("text", "Pickup truck"))
            .await
            .unwrap();
        assert_eq!(text_of(&record, "text").as_deref(), Some("Pickup truck"));
        assert_eq!(record.get("state").and_then(TargetValue::as_int), Some(STATE_ACTIVE));

        let record = SkillSetRule
            .map(
                &mut h.ctx(6),
                &row(6).with("category", "Plumbing").with("is_archived", true),
            )
            .await
            .unwrap();
        assert_eq!(text_of(&record, "sub_category").as_deref(), Some(""));
        assert_eq!(record.get("state").and_then(TargetValue::as_int), Some(STATE_INACTIVE));

        let err = SkillSetRule
            .map(&mut h.ctx(7), &row(7).with("sub_category", "Drains"))
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::MissingRequired { field: "category" }));
    }

    #[tokio::test]
    async fn bulletin_board_item_keeps_its_origin() {
        let h = RuleHarness::default();
        let author = h.seed(EntityKind::User, 1, TargetRecord::new());
        let record = BulletinBoardItemRule
            .map(
                &mut h.ctx(3),
                &row(3)
                    .with("text", "Office closed Monday")
                    .with("created_by_id", 1_i64)
                    .with("created_from", "10.0.0.4"),
            )
            .await
            .unwrap();
        assert_eq!(text_of(&record, "created_from").as_deref(), Some("10.0.0.4"));
        assert_eq!(record.get("created_by_id").and_then(TargetValue::as_id), Some(author));
    }
}
