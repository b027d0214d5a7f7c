use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyRow, LegacyTable, RowError, TargetRecord,
};

use super::states::{STATE_ACTIVE, STATE_INACTIVE};
use super::text::{full_name, lexical_name};
use super::{MappingRule, RowContext};

pub(super) const EMAIL: &str = "email";

/// Accounts live in the shared schema, one franchise per row.
const COLUMNS: &[LegacyColumn] = &[
    LegacyColumn::text("email"),
    LegacyColumn::text("first_name"),
    LegacyColumn::text("last_name"),
    LegacyColumn::timestamp("date_joined"),
    LegacyColumn::timestamp("last_modified"),
    LegacyColumn::bool("is_active"),
    LegacyColumn::bool("was_email_activated"),
];

/// Emails are compared case-insensitively by the destination.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserRule;

#[async_trait]
impl MappingRule for UserRule {
    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn legacy_table(&self) -> LegacyTable {
        LegacyTable {
            name: EntityKind::User.legacy_table(),
            id_column: LegacyTable::ID,
            columns: COLUMNS,
            tenant_column: Some("franchise_id"),
        }
    }

    fn natural_key_column(&self) -> Option<&'static str> {
        Some(EMAIL)
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let email = normalize_email(row.required_text("email")?);
        if email.is_empty() {
            return Err(RowError::MissingRequired { field: "email" });
        }
        let first = row.text_or_empty("first_name")?;
        let last = row.text_or_empty("last_name")?;
        let joined = row.timestamp("date_joined")?;
        let state = if row.flag("is_active")? {
            STATE_ACTIVE
        } else {
            STATE_INACTIVE
        };

        Ok(TargetRecord::new()
            .text(EMAIL, Some(email))
            .text("first_name", Some(first))
            .text("last_name", Some(last))
            .text("name", Some(full_name(first, "", last)))
            .text("lexical_name", Some(lexical_name(first, "", last)))
            .int("state", state)
            .text("timezone", Some(ctx.tenant().timezone.as_str()))
            .timestamp("joined_at", joined)
            .timestamp("created_at", joined)
            .timestamp("modified_at", row.timestamp("last_modified")?)
            .bool("was_email_activated", row.flag("was_email_activated")?))
    }
}
