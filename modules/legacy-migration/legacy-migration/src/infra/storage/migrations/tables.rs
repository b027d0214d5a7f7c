//! Column layouts of the per-kind tables and the statements creating them.

use legacy_migration_sdk::EntityKind;
use sea_orm_migration::prelude::*;

#[derive(Clone, Copy)]
enum Col {
    Id,
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
    Date,
}

const AUDIT: &[(&str, Col)] = &[
    ("created_at", Col::Timestamp),
    ("created_by_id", Col::Id),
    ("modified_at", Col::Timestamp),
    ("modified_by_id", Col::Id),
];

const PARTY: &[(&str, Col)] = &[
    ("user_id", Col::Id),
    ("given_name", Col::Text),
    ("middle_name", Col::Text),
    ("last_name", Col::Text),
    ("name", Col::Text),
    ("lexical_name", Col::Text),
    ("email", Col::Text),
    ("telephone", Col::Text),
    ("organization_name", Col::Text),
    ("address_country", Col::Text),
    ("address_region", Col::Text),
    ("address_locality", Col::Text),
    ("postal_code", Col::Text),
    ("street_address", Col::Text),
    ("street_address_extra", Col::Text),
    ("full_address_without_postal_code", Col::Text),
    ("full_address_with_postal_code", Col::Text),
    ("full_address_url", Col::Text),
    ("how_hear_id", Col::Id),
    ("how_hear_other", Col::Text),
    ("how_hear_text", Col::Text),
    ("join_date", Col::Date),
    ("birthdate", Col::Date),
    ("is_ok_to_email", Col::Bool),
    ("is_ok_to_text", Col::Bool),
    ("type_of", Col::Int),
    ("state", Col::Int),
];

const ORDER_PARTIES: &[(&str, Col)] = &[
    ("customer_id", Col::Id),
    ("associate_id", Col::Id),
    ("customer_name", Col::Text),
    ("customer_lexical_name", Col::Text),
    ("associate_name", Col::Text),
    ("associate_lexical_name", Col::Text),
];

const USER: &[(&str, Col)] = &[
    ("email", Col::Text),
    ("first_name", Col::Text),
    ("last_name", Col::Text),
    ("name", Col::Text),
    ("lexical_name", Col::Text),
    ("role_id", Col::Int),
    ("state", Col::Int),
    ("timezone", Col::Text),
    ("joined_at", Col::Timestamp),
    ("created_at", Col::Timestamp),
    ("modified_at", Col::Timestamp),
    ("was_email_activated", Col::Bool),
];

const HOW_HEAR: &[(&str, Col)] = &[
    ("text", Col::Text),
    ("sort_number", Col::Int),
    ("is_for_associate", Col::Bool),
    ("is_for_customer", Col::Bool),
    ("is_for_staff", Col::Bool),
    ("is_for_partner", Col::Bool),
    ("state", Col::Int),
];

const TEXT_LOOKUP: &[(&str, Col)] = &[
    ("text", Col::Text),
    ("description", Col::Text),
    ("state", Col::Int),
];

const SERVICE_FEE: &[(&str, Col)] = &[
    ("title", Col::Text),
    ("description", Col::Text),
    ("percentage", Col::Float),
    ("state", Col::Int),
];

const COMMENT: &[(&str, Col)] = &[("text", Col::Text), ("state", Col::Int)];

const WORK_ORDER: &[(&str, Col)] = &[
    ("ongoing_work_order_id", Col::Id),
    ("cloned_from_id", Col::Id),
    ("invoice_service_fee_id", Col::Id),
    ("description", Col::Text),
    ("assignment_date", Col::Date),
    ("start_date", Col::Date),
    ("completion_date", Col::Date),
    ("is_ongoing", Col::Bool),
    ("is_home_support_service", Col::Bool),
    ("hours", Col::Float),
    ("type_of", Col::Int),
    ("state", Col::Int),
    ("closing_reason", Col::Int),
    ("closing_reason_other", Col::Text),
    ("invoice_total_amount", Col::Float),
];

const TASK_ITEM: &[(&str, Col)] = &[
    ("work_order_id", Col::Id),
    ("ongoing_work_order_id", Col::Id),
    ("type_of", Col::Int),
    ("title", Col::Text),
    ("description", Col::Text),
    ("due_date", Col::Date),
    ("is_closed", Col::Bool),
    ("was_postponed", Col::Bool),
    ("closing_reason", Col::Int),
    ("closing_reason_other", Col::Text),
];

const PRIVATE_FILE: &[(&str, Col)] = &[
    ("title", Col::Text),
    ("description", Col::Text),
    ("file_key", Col::Text),
    ("file_name", Col::Text),
    ("associate_id", Col::Id),
    ("customer_id", Col::Id),
    ("work_order_id", Col::Id),
    ("state", Col::Int),
];

const SKILL_SET: &[(&str, Col)] = &[
    ("category", Col::Text),
    ("sub_category", Col::Text),
    ("description", Col::Text),
    ("state", Col::Int),
];

const BULLETIN_BOARD_ITEM: &[(&str, Col)] = &[
    ("text", Col::Text),
    ("created_from", Col::Text),
    ("modified_from", Col::Text),
    ("state", Col::Int),
];

const DEPOSIT: &[(&str, Col)] = &[
    ("work_order_id", Col::Id),
    ("paid_at", Col::Timestamp),
    ("deposit_method", Col::Int),
    ("paid_to", Col::Int),
    ("currency", Col::Text),
    ("amount", Col::Float),
    ("paid_for", Col::Int),
    ("created_from", Col::Text),
    ("modified_from", Col::Text),
    ("state", Col::Int),
];

const INVOICE_HEADER: &[(&str, Col)] = &[
    ("work_order_id", Col::Id),
    ("invoice_id", Col::Text),
    ("invoice_date", Col::Date),
    ("associate_name", Col::Text),
    ("associate_telephone", Col::Text),
    ("client_name", Col::Text),
    ("client_telephone", Col::Text),
    ("client_email", Col::Text),
    ("client_address", Col::Text),
];

const INVOICE_LINE: &[(&str, Col)] = &[
    ("qty", Col::Int),
    ("desc", Col::Text),
    ("price", Col::Float),
    ("amount", Col::Float),
];

const INVOICE_LINES: usize = 15;

const INVOICE_TRAILER: &[(&str, Col)] = &[
    ("invoice_quote_days", Col::Int),
    ("invoice_associate_tax", Col::Text),
    ("invoice_quote_date", Col::Date),
    ("invoice_customers_approval", Col::Text),
    ("line_01_notes", Col::Text),
    ("line_02_notes", Col::Text),
    ("total_labour", Col::Float),
    ("total_materials", Col::Float),
    ("other_costs", Col::Float),
    ("sub_total", Col::Float),
    ("tax", Col::Float),
    ("total", Col::Float),
    ("deposit", Col::Float),
    ("amount_due", Col::Float),
    ("payment_amount", Col::Float),
    ("payment_date", Col::Date),
    ("is_cash", Col::Bool),
    ("is_cheque", Col::Bool),
    ("is_debit", Col::Bool),
    ("is_credit", Col::Bool),
    ("is_other", Col::Bool),
    ("client_signature", Col::Text),
    ("associate_sign_date", Col::Date),
    ("associate_signature", Col::Text),
    ("revision_version", Col::Int),
    ("created_from", Col::Text),
    ("modified_from", Col::Text),
    ("state", Col::Int),
];

const AWAY_LOG: &[(&str, Col)] = &[
    ("associate_id", Col::Id),
    ("associate_name", Col::Text),
    ("associate_lexical_name", Col::Text),
    ("reason", Col::Int),
    ("reason_other", Col::Text),
    ("until_further_notice", Col::Bool),
    ("until_date", Col::Date),
    ("start_date", Col::Date),
    ("state", Col::Int),
];

const ACTIVITY_SHEET_ITEM: &[(&str, Col)] = &[
    ("comment", Col::Text),
    ("created_at", Col::Timestamp),
    ("created_from", Col::Text),
    ("created_by_id", Col::Id),
    ("associate_id", Col::Id),
    ("work_order_id", Col::Id),
    ("ongoing_work_order_id", Col::Id),
    ("state", Col::Int),
];

fn pair(owner: &str, item: &str) -> Vec<(String, Col)> {
    vec![(owner.to_owned(), Col::Id), (item.to_owned(), Col::Id)]
}

/// Domain columns of `kind`, after `id`, `tenant_id` and `old_id`.
fn domain_columns(kind: EntityKind) -> Vec<(String, Col)> {
    match kind {
        EntityKind::User => owned(&[USER]),
        EntityKind::HowHearAboutUsItem => owned(&[HOW_HEAR]),
        EntityKind::Tag | EntityKind::VehicleType | EntityKind::InsuranceRequirement => {
            owned(&[TEXT_LOOKUP])
        }
        EntityKind::ServiceFee => owned(&[SERVICE_FEE, AUDIT]),
        EntityKind::Comment => owned(&[COMMENT, AUDIT]),
        EntityKind::SkillSet => owned(&[SKILL_SET]),
        EntityKind::SkillSetInsuranceRequirement => {
            pair("skill_set_id", "insurance_requirement_id")
        }
        EntityKind::BulletinBoardItem => owned(&[BULLETIN_BOARD_ITEM, AUDIT]),
        EntityKind::Associate => owned(&[PARTY, &[("service_fee_id", Col::Id)], AUDIT]),
        EntityKind::Customer | EntityKind::Partner | EntityKind::Staff => owned(&[PARTY, AUDIT]),
        EntityKind::OngoingWorkOrder => owned(&[&[("state", Col::Int)], ORDER_PARTIES, AUDIT]),
        EntityKind::WorkOrder => owned(&[WORK_ORDER, ORDER_PARTIES, AUDIT]),
        EntityKind::TaskItem => owned(&[TASK_ITEM, ORDER_PARTIES, AUDIT]),
        EntityKind::WorkOrderDeposit => owned(&[DEPOSIT, AUDIT]),
        EntityKind::WorkOrderInvoice => invoice_columns(),
        EntityKind::AssociateAwayLog => owned(&[AWAY_LOG, AUDIT]),
        EntityKind::ActivitySheetItem => owned(&[ACTIVITY_SHEET_ITEM]),
        EntityKind::AssociateTag => pair("associate_id", "tag_id"),
        EntityKind::CustomerTag => pair("customer_id", "tag_id"),
        EntityKind::WorkOrderTag => pair("work_order_id", "tag_id"),
        EntityKind::StaffTag => pair("staff_id", "tag_id"),
        EntityKind::AssociateComment => pair("associate_id", "comment_id"),
        EntityKind::CustomerComment => pair("customer_id", "comment_id"),
        EntityKind::WorkOrderComment => pair("work_order_id", "comment_id"),
        EntityKind::StaffComment => pair("staff_id", "comment_id"),
        EntityKind::PartnerComment => pair("partner_id", "comment_id"),
        EntityKind::AssociateVehicleType => pair("associate_id", "vehicle_type_id"),
        EntityKind::AssociateSkillSet => pair("associate_id", "skill_set_id"),
        EntityKind::AssociateInsuranceRequirement => {
            pair("associate_id", "insurance_requirement_id")
        }
        EntityKind::WorkOrderSkillSet => pair("work_order_id", "skill_set_id"),
        EntityKind::PrivateFile => owned(&[PRIVATE_FILE, AUDIT]),
    }
}

fn owned(groups: &[&[(&str, Col)]]) -> Vec<(String, Col)> {
    groups
        .iter()
        .flat_map(|g| g.iter().map(|(name, col)| ((*name).to_owned(), *col)))
        .collect()
}

/// Header, fifteen `line_NN_<field>` groups, then totals and audit columns.
fn invoice_columns() -> Vec<(String, Col)> {
    let mut columns = owned(&[INVOICE_HEADER]);
    for n in 1..=INVOICE_LINES {
        for (field, col) in INVOICE_LINE {
            columns.push((format!("line_{n:02}_{field}"), *col));
        }
    }
    columns.extend(owned(&[INVOICE_TRAILER, AUDIT]));
    columns
}

fn column(name: &str, col: Col) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(name));
    match col {
        Col::Id => def.uuid(),
        Col::Int => def.big_integer(),
        Col::Float => def.double(),
        Col::Bool => def.boolean(),
        Col::Text => def.text(),
        Col::Timestamp => def.timestamp_with_time_zone(),
        Col::Date => def.date(),
    };
    def
}

fn entity_table(kind: EntityKind) -> TableCreateStatement {
    let mut old_id = ColumnDef::new(Alias::new("old_id"));
    old_id.big_integer();
    // Accounts derived for ownerless parties have no legacy row.
    if kind != EntityKind::User {
        old_id.not_null();
    }

    let mut table = Table::create();
    table
        .table(Alias::new(kind.target_table()))
        .if_not_exists()
        .col(ColumnDef::new(Alias::new("id")).uuid().not_null().primary_key())
        .col(ColumnDef::new(Alias::new("tenant_id")).uuid().not_null())
        .col(old_id);
    for (name, col) in domain_columns(kind) {
        table.col(column(&name, col));
    }
    table
}

pub(super) fn index(
    kind: EntityKind,
    suffix: &str,
    columns: &[&str],
    unique: bool,
) -> IndexCreateStatement {
    let table = kind.target_table();
    let prefix = if unique { "ux" } else { "idx" };
    let mut index = Index::create();
    index
        .if_not_exists()
        .name(format!("{prefix}_{table}_{suffix}"))
        .table(Alias::new(table));
    for col in columns {
        index.col(Alias::new(*col));
    }
    if unique {
        index.unique();
    }
    index
}

/// Create the table of each of `kinds` with its tenant and identity indexes.
pub(super) async fn create_kinds(
    manager: &SchemaManager<'_>,
    kinds: &[EntityKind],
) -> Result<(), DbErr> {
    for &kind in kinds {
        manager.create_table(entity_table(kind)).await?;
        manager
            .create_index(index(kind, "tenant", &["tenant_id"], false))
            .await?;
        manager
            .create_index(index(kind, "old_id", &["tenant_id", "old_id"], true))
            .await?;
    }
    Ok(())
}

/// Drop the tables of `kinds`, last first.
pub(super) async fn drop_kinds(
    manager: &SchemaManager<'_>,
    kinds: &[EntityKind],
) -> Result<(), DbErr> {
    for kind in kinds.iter().rev() {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new(kind.target_table()))
                    .if_exists()
                    .to_owned(),
            )
            .await?;
    }
    Ok(())
}
