//! Associate availability: away logs and answers to job offers.

use async_trait::async_trait;
use legacy_migration_sdk::{EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord};

use super::lookups::audit_columns;
use super::orders::party_names;
use super::states::{activity_sheet_state, record_state};
use super::{MappingRule, RowContext, tenant_table};

pub struct AssociateAwayLogRule;

const AWAY_LOG_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("associate_id"),
    LegacyColumn::int("reason"),
    LegacyColumn::text("reason_other"),
    LegacyColumn::bool("until_further_notice"),
    LegacyColumn::date("until_date"),
    LegacyColumn::date("start_date"),
    LegacyColumn::bool("was_deleted"),
    LegacyColumn::timestamp("created"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for AssociateAwayLogRule {
    fn kind(&self) -> EntityKind {
        EntityKind::AssociateAwayLog
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), AWAY_LOG_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let associate = ctx
            .required(row, "associate_id", EntityKind::Associate)
            .await?;
        let record = TargetRecord::new().id("associate_id", Some(associate));
        let record = party_names(
            ctx,
            record,
            EntityKind::Associate,
            Some(associate),
            "associate_name",
            "associate_lexical_name",
        )
        .await?
        .int("reason", row.int("reason")?)
        .text("reason_other", row.text("reason_other")?)
        .bool("until_further_notice", row.flag("until_further_notice")?)
        .date("until_date", row.date("until_date")?)
        .date("start_date", row.date("start_date")?)
        .int("state", record_state(row.flag("was_deleted")?));
        audit_columns(ctx, row, record, "created", "last_modified").await
    }
}

/// An associate accepting or declining a job or ongoing job.
pub struct ActivitySheetItemRule;

const ACTIVITY_SHEET_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("comment"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::text("created_from"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::int("associate_id"),
    LegacyColumn::int("job_id"),
    LegacyColumn::text("state"),
    LegacyColumn::int("ongoing_job_id"),
];

#[async_trait]
impl MappingRule for ActivitySheetItemRule {
    fn kind(&self) -> EntityKind {
        EntityKind::ActivitySheetItem
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), ACTIVITY_SHEET_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let comment = row.text_or_empty("comment")?;
        let created_at = row.timestamp("created_at")?;
        let created_from = row.text("created_from")?;
        let state = activity_sheet_state(row.text("state")?);
        let associate = ctx
            .required(row, "associate_id", EntityKind::Associate)
            .await?;
        let order = ctx.optional(row, "job_id", EntityKind::WorkOrder).await?;
        let ongoing = ctx
            .optional(row, "ongoing_job_id", EntityKind::OngoingWorkOrder)
            .await?;
        let created_by = ctx.optional(row, "created_by_id", EntityKind::User).await?;
        Ok(TargetRecord::new()
            .text("comment", Some(comment))
            .timestamp("created_at", created_at)
            .text("created_from", created_from)
            .id("created_by_id", created_by)
            .id("associate_id", Some(associate))
            .id("work_order_id", order)
            .id("ongoing_work_order_id", ongoing)
            .int("state", state))
    }
}
