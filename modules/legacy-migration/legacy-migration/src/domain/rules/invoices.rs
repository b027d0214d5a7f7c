//! Work-order invoices. The legacy table is keyed by its work order, so an
//! invoice's legacy id is the id of the order it bills.

use async_trait::async_trait;
use legacy_migration_sdk::{
    ColumnKind, EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord,
};

use super::lookups::audit_columns;
use super::states::record_state;
use super::{MappingRule, RowContext};

/// Columns carried to the destination under their legacy names, followed by
/// `$extra`.
macro_rules! invoice_columns {
    (@lines [$($n:literal)*] $($extra:expr),*) => {
        &[
            LegacyColumn::text("invoice_id"),
            LegacyColumn::date("invoice_date"),
            LegacyColumn::text("associate_name"),
            LegacyColumn::text("associate_telephone"),
            LegacyColumn::text("client_name"),
            LegacyColumn::text("client_telephone"),
            LegacyColumn::text("client_email"),
            LegacyColumn::text("client_address"),
            $(
                LegacyColumn::int(concat!("line_", $n, "_qty")),
                LegacyColumn::text(concat!("line_", $n, "_desc")),
                LegacyColumn::float(concat!("line_", $n, "_price")),
                LegacyColumn::float(concat!("line_", $n, "_amount")),
            )*
            LegacyColumn::int("invoice_quote_days"),
            LegacyColumn::text("invoice_associate_tax"),
            LegacyColumn::date("invoice_quote_date"),
            LegacyColumn::text("invoice_customers_approval"),
            LegacyColumn::text("line_01_notes"),
            LegacyColumn::text("line_02_notes"),
            LegacyColumn::float("total_labour"),
            LegacyColumn::float("total_materials"),
            LegacyColumn::float("other_costs"),
            LegacyColumn::float("sub_total"),
            LegacyColumn::float("tax"),
            LegacyColumn::float("total"),
            LegacyColumn::float("deposit"),
            LegacyColumn::float("amount_due"),
            LegacyColumn::float("payment_amount"),
            LegacyColumn::date("payment_date"),
            LegacyColumn::bool("is_cash"),
            LegacyColumn::bool("is_cheque"),
            LegacyColumn::bool("is_debit"),
            LegacyColumn::bool("is_credit"),
            LegacyColumn::bool("is_other"),
            LegacyColumn::text("client_signature"),
            LegacyColumn::date("associate_sign_date"),
            LegacyColumn::text("associate_signature"),
            LegacyColumn::int("revision_version"),
            LegacyColumn::text("created_from"),
            LegacyColumn::text("last_modified_from"),
            LegacyColumn::bool("is_archived"),
            $($extra),*
        ]
    };
    ($($extra:expr),* $(,)?) => {
        invoice_columns!(
            @lines ["01" "02" "03" "04" "05" "06" "07" "08" "09" "10" "11" "12" "13" "14" "15"]
            $($extra),*
        )
    };
}

const COPIED_COLUMNS: &[LegacyColumn] = invoice_columns!();

const INVOICE_COLUMNS: &[LegacyColumn] = invoice_columns!(
    LegacyColumn::int("order_id"),
    LegacyColumn::timestamp("created_at"),
    LegacyColumn::int("created_by_id"),
    LegacyColumn::timestamp("last_modified_at"),
    LegacyColumn::int("last_modified_by_id"),
);

/// Renamed or derived on the way; every other copied column keeps its name.
fn destination_column(legacy: &'static str) -> &'static str {
    match legacy {
        "last_modified_from" => "modified_from",
        "is_archived" => "state",
        other => other,
    }
}

fn copy_column(
    record: TargetRecord,
    row: &LegacyRow,
    column: LegacyColumn,
) -> Result<TargetRecord, RowError> {
    let name = column.name;
    let target = destination_column(name);
    Ok(match column.kind {
        ColumnKind::Int => record.int(target, row.int(name)?),
        ColumnKind::Float => record.float(target, row.float(name)?),
        ColumnKind::Bool if target == "state" => record.int(target, record_state(row.flag(name)?)),
        ColumnKind::Bool => record.bool(target, row.flag(name)?),
        ColumnKind::Text => record.text(target, row.text(name)?),
        ColumnKind::Timestamp => record.timestamp(target, row.timestamp(name)?),
        ColumnKind::Date => record.date(target, row.date(name)?),
    })
}

pub struct WorkOrderInvoiceRule;

#[async_trait]
impl MappingRule for WorkOrderInvoiceRule {
    fn kind(&self) -> EntityKind {
        EntityKind::WorkOrderInvoice
    }

    fn legacy_table(&self) -> LegacyTable {
        LegacyTable {
            name: self.kind().legacy_table(),
            id_column: "order_id",
            columns: INVOICE_COLUMNS,
            tenant_column: None,
        }
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let mut record = TargetRecord::new();
        for column in COPIED_COLUMNS {
            record = copy_column(record, row, *column)?;
        }
        let order = ctx.required(row, "order_id", EntityKind::WorkOrder).await?;
        let record = record.id("work_order_id", Some(order));
        audit_columns(ctx, row, record, "created_at", "last_modified_at").await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::domain::rules::states::STATE_ACTIVE;
    use crate::domain::test_support::{RuleHarness, row, text_of};
    use legacy_migration_sdk::TargetValue;

    #[test]
    fn every_line_item_is_selected_once() {
        let names: Vec<_> = INVOICE_COLUMNS.iter().map(|c| c.name).collect();
        for n in 1..=15 {
            for field in ["qty", "desc", "price", "amount"] {
                let name = format!("line_{n:02}_{field}");
                assert_eq!(names.iter().filter(|c| **c == name).count(), 1, "{name}");
            }
        }
        assert_eq!(names.iter().filter(|c| **c == "order_id").count(), 1);
        assert!(!COPIED_COLUMNS.iter().any(|c| c.name == "order_id"));
        assert_eq!(WorkOrderInvoiceRule.legacy_table().id_column, "order_id");
    }

    #[tokio::test]
    async fn invoice_copies_lines_and_bills_its_order() {
        let h = RuleHarness::default();
        let order = h.seed(EntityKind::WorkOrder, 7, TargetRecord::new());
        let legacy = row(7)
            .with("order_id", 7_i64)
            .with("invoice_id", "INV-0007")
            .with("line_15_desc", "Haul away debris")
            .with("line_15_amount", 80.0_f64)
            .with("total", 92.4_f64)
            .with("is_cash", 1_i64)
            .with("last_modified_from", "10.0.0.9");
        let record = WorkOrderInvoiceRule.map(&mut h.ctx(7), &legacy).await.unwrap();
        assert_eq!(record.get("work_order_id").and_then(TargetValue::as_id), Some(order));
        assert_eq!(text_of(&record, "invoice_id").as_deref(), Some("INV-0007"));
        assert_eq!(text_of(&record, "line_15_desc").as_deref(), Some("Haul away debris"));
        assert_eq!(record.get("line_15_amount"), Some(&TargetValue::Float(Some(80.0))));
        assert_eq!(record.get("line_01_qty"), Some(&TargetValue::Int(None)));
        assert_eq!(record.get("is_cash"), Some(&TargetValue::Bool(Some(true))));
        assert_eq!(text_of(&record, "modified_from").as_deref(), Some("10.0.0.9"));
        assert_eq!(record.get("state").and_then(TargetValue::as_int), Some(STATE_ACTIVE));
        assert!(record.get("is_archived").is_none());
    }

    #[tokio::test]
    async fn malformed_invoice_is_rejected_before_resolving_its_order() {
        let h = RuleHarness::default();
        let err = WorkOrderInvoiceRule
            .map(&mut h.ctx(7), &row(7).with("order_id", 7_i64).with("total", "lots"))
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::InvalidValue { field: "total", .. }));
    }
}
