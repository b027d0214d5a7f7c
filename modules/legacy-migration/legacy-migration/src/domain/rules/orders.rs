//! Work orders, ongoing work orders, their task items and deposits.

use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyRow, LegacyTable, NewId, RowError, TargetRecord,
};

use super::lookups::audit_columns;
use super::states::{WorkOrderState, ongoing_state, record_state};
use super::{MappingRule, RowContext, tenant_table};

/// Copy the display names of a referenced party onto `record`.
pub(super) async fn party_names(
    ctx: &RowContext<'_>,
    record: TargetRecord,
    party: EntityKind,
    id: Option<NewId>,
    name_column: &'static str,
    lexical_column: &'static str,
) -> Result<TargetRecord, RowError> {
    let name = ctx.read_text(party, id, "name").await?;
    let lexical = ctx.read_text(party, id, "lexical_name").await?;
    Ok(record.text(name_column, name).text(lexical_column, lexical))
}

async fn customer_and_associate(
    ctx: &mut RowContext<'_>,
    row: &LegacyRow,
    record: TargetRecord,
) -> Result<TargetRecord, RowError> {
    let customer = ctx.required(row, "customer_id", EntityKind::Customer).await?;
    let associate = ctx
        .optional(row, "associate_id", EntityKind::Associate)
        .await?;
    let record = record
        .id("customer_id", Some(customer))
        .id("associate_id", associate);
    let record = party_names(
        ctx,
        record,
        EntityKind::Customer,
        Some(customer),
        "customer_name",
        "customer_lexical_name",
    )
    .await?;
    party_names(
        ctx,
        record,
        EntityKind::Associate,
        associate,
        "associate_name",
        "associate_lexical_name",
    )
    .await
}

pub struct OngoingWorkOrderRule;

const ONGOING_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("customer_id"),
    LegacyColumn::int("associate_id"),
    LegacyColumn::text("state"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for OngoingWorkOrderRule {
    fn kind(&self) -> EntityKind {
        EntityKind::OngoingWorkOrder
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), ONGOING_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let record = TargetRecord::new().int("state", ongoing_state(row.text("state")?));
        let record = customer_and_associate(ctx, row, record).await?;
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}

pub struct WorkOrderRule;

const WORK_ORDER_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("customer_id"),
    LegacyColumn::int("associate_id"),
    LegacyColumn::int("ongoing_work_order_id"),
    LegacyColumn::int("cloned_from_id"),
    LegacyColumn::int("invoice_service_fee_id"),
    LegacyColumn::text("description"),
    LegacyColumn::date("assignment_date"),
    LegacyColumn::date("start_date"),
    LegacyColumn::date("completion_date"),
    LegacyColumn::bool("is_ongoing"),
    LegacyColumn::bool("is_home_support_service"),
    LegacyColumn::float("hours"),
    LegacyColumn::int("type_of"),
    LegacyColumn::text("state"),
    LegacyColumn::int("closing_reason"),
    LegacyColumn::text("closing_reason_other"),
    LegacyColumn::float("invoice_total_amount"),
    LegacyColumn::timestamp("created"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for WorkOrderRule {
    fn kind(&self) -> EntityKind {
        EntityKind::WorkOrder
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), WORK_ORDER_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let ongoing = ctx
            .optional(row, "ongoing_work_order_id", EntityKind::OngoingWorkOrder)
            .await?;
        // Clones point at earlier orders of the same run.
        let cloned_from = ctx
            .optional(row, "cloned_from_id", EntityKind::WorkOrder)
            .await?;
        let invoice_fee = ctx
            .optional(row, "invoice_service_fee_id", EntityKind::ServiceFee)
            .await?;
        let state = WorkOrderState::from_legacy(row.text("state")?);

        let record = TargetRecord::new()
            .id("ongoing_work_order_id", ongoing)
            .id("cloned_from_id", cloned_from)
            .id("invoice_service_fee_id", invoice_fee)
            .text("description", row.text("description")?)
            .date("assignment_date", row.date("assignment_date")?)
            .date("start_date", row.date("start_date")?)
            .date("completion_date", row.date("completion_date")?)
            .bool("is_ongoing", row.flag("is_ongoing")?)
            .bool("is_home_support_service", row.flag("is_home_support_service")?)
            .float("hours", row.float("hours")?)
            .int("type_of", row.int("type_of")?)
            .int("state", state.code())
            .int("closing_reason", row.int("closing_reason")?)
            .text("closing_reason_other", row.text("closing_reason_other")?)
            .float("invoice_total_amount", row.float("invoice_total_amount")?);
        let record = customer_and_associate(ctx, row, record).await?;
        audit_columns(ctx, row, record, "created", "last_modified").await
    }
}

pub struct TaskItemRule;

const TASK_ITEM_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("job_id"),
    LegacyColumn::int("ongoing_job_id"),
    LegacyColumn::int("type_of"),
    LegacyColumn::text("title"),
    LegacyColumn::text("description"),
    LegacyColumn::date("due_date"),
    LegacyColumn::bool("is_closed"),
    LegacyColumn::bool("was_postponed"),
    LegacyColumn::int("closing_reason"),
    LegacyColumn::text("closing_reason_other"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
];

#[async_trait]
impl MappingRule for TaskItemRule {
    fn kind(&self) -> EntityKind {
        EntityKind::TaskItem
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), TASK_ITEM_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let job = ctx.required(row, "job_id", EntityKind::WorkOrder).await?;
        let ongoing_job = ctx
            .optional(row, "ongoing_job_id", EntityKind::OngoingWorkOrder)
            .await?;

        // Party columns come from the order, already denormalised there.
        let order = Some(job);
        let mut record = TargetRecord::new()
            .id("work_order_id", order)
            .id("ongoing_work_order_id", ongoing_job)
            .id(
                "customer_id",
                ctx.read_id(EntityKind::WorkOrder, order, "customer_id").await?,
            )
            .id(
                "associate_id",
                ctx.read_id(EntityKind::WorkOrder, order, "associate_id").await?,
            );
        for column in [
            "customer_name",
            "customer_lexical_name",
            "associate_name",
            "associate_lexical_name",
        ] {
            let value = ctx.read_text(EntityKind::WorkOrder, order, column).await?;
            record = record.text(column, value);
        }

        let record = record
            .int("type_of", row.int("type_of")?)
            .text("title", Some(row.text_or_empty("title")?))
            .text("description", row.text("description")?)
            .date("due_date", row.date("due_date")?)
            .bool("is_closed", row.flag("is_closed")?)
            .bool("was_postponed", row.flag("was_postponed")?)
            .int("closing_reason", row.int("closing_reason")?)
            .text("closing_reason_other", row.text("closing_reason_other")?);
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}

/// Money received against a work order before it is invoiced.
pub struct WorkOrderDepositRule;

const DEPOSIT_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::int("order_id"),
    LegacyColumn::timestamp("paid_at"),
    LegacyColumn::int("deposit_method"),
    LegacyColumn::int("paid_to"),
    LegacyColumn::text("amount_currency"),
    LegacyColumn::float("amount"),
    LegacyColumn::int("paid_for"),
    LegacyColumn::bool("is_archived"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::text("created_from"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
    LegacyColumn::text("last_modified_from"),
];

#[async_trait]
impl MappingRule for WorkOrderDepositRule {
    fn kind(&self) -> EntityKind {
        EntityKind::WorkOrderDeposit
    }

    fn legacy_table(&self) -> LegacyTable {
        tenant_table(self.kind(), DEPOSIT_COLUMNS)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let order = ctx.required(row, "order_id", EntityKind::WorkOrder).await?;
        let record = TargetRecord::new()
            .id("work_order_id", Some(order))
            .timestamp("paid_at", row.timestamp("paid_at")?)
            .int("deposit_method", row.int("deposit_method")?)
            .int("paid_to", row.int("paid_to")?)
            .text("currency", row.text("amount_currency")?)
            .float("amount", row.float("amount")?)
            .int("paid_for", row.int("paid_for")?)
            .text("created_from", row.text("created_from")?)
            .text("modified_from", row.text("last_modified_from")?)
            .int("state", record_state(row.flag("is_archived")?));
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}
