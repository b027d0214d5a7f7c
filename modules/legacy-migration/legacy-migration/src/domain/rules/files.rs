use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord,
};

use super::lookups::audit_columns;
use super::states::record_state;
use super::{MappingRule, RowContext, tenant_table};

const COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("data_file"),
    LegacyColumn::text("title"),
    LegacyColumn::text("description"),
    LegacyColumn::int("associate_id"),
    LegacyColumn::int("customer_id"),
    LegacyColumn::int("work_order_id"),
    LegacyColumn::bool("is_archived"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
];

/// Uploaded attachments. The blob is copied before the row is written, so a
/// migrated row always points at an existing object.
pub struct PrivateFileRule;

#[async_trait]
impl MappingRule for PrivateFileRule {
    fn kind(&self) -> EntityKind {
        EntityKind::PrivateFile
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let source_key = row.required_text("data_file")?;
        let associate = ctx
            .optional(row, "associate_id", EntityKind::Associate)
            .await?;
        let customer = ctx.optional(row, "customer_id", EntityKind::Customer).await?;
        let work_order = ctx
            .optional(row, "work_order_id", EntityKind::WorkOrder)
            .await?;

        let file_key = ctx.transfer_blob(source_key).await?;
        let file_name = source_key.rsplit('/').next().unwrap_or(source_key);

        let record = TargetRecord::new()
            .text("title", row.text("title")?)
            .text("description", row.text("description")?)
            .text("file_key", Some(file_key))
            .text("file_name", Some(file_name))
            .id("associate_id", associate)
            .id("customer_id", customer)
            .id("work_order_id", work_order)
            .int("state", record_state(row.flag("is_archived")?));
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}
