//! Associates, customers, partners and staff.
//!
//! Every party is owned by a user account. Legacy parties without an owner get
//! one derived from their email, matched on the account's natural key so a
//! rerun reuses it.

use async_trait::async_trait;
use legacy_migration_sdk::{
    EntityKind, LegacyColumn, LegacyId, LegacyRow, LegacyTable, NaturalKey, NewId, Resolution,
    RowError, TargetRecord, UpsertKey, UpsertRequest,
};
use tracing::debug;

use super::lookups::audit_columns;
use super::states::record_state;
use super::text::{Address, full_name, lexical_name};
use super::users::{EMAIL, normalize_email};
use super::{MappingRule, RowContext};

const ROLE_FRONTLINE_STAFF: i64 = 3;
const ROLE_ASSOCIATE: i64 = 4;
const ROLE_CUSTOMER: i64 = 5;

/// Legacy id of the "other" how-hear item, whose text is free-form.
const HOW_HEAR_OTHER: i64 = 1;

macro_rules! party_columns {
    ($($extra:expr),* $(,)?) => {
        &[
            LegacyColumn::int("owner_id"),
            LegacyColumn::text("given_name"),
            LegacyColumn::text("middle_name"),
            LegacyColumn::text("last_name"),
            LegacyColumn::text("email"),
            LegacyColumn::text("telephone"),
            LegacyColumn::text("organization_name"),
            LegacyColumn::text("address_country"),
            LegacyColumn::text("address_region"),
            LegacyColumn::text("address_locality"),
            LegacyColumn::text("postal_code"),
            LegacyColumn::text("street_address"),
            LegacyColumn::text("street_address_extra"),
            LegacyColumn::int("how_hear_id"),
            LegacyColumn::text("how_hear_other"),
            LegacyColumn::date("join_date"),
            LegacyColumn::date("birthdate"),
            LegacyColumn::bool("is_ok_to_email"),
            LegacyColumn::bool("is_ok_to_text"),
            LegacyColumn::int("type_of"),
            LegacyColumn::bool("is_archived"),
            LegacyColumn::timestamp("created"),
            LegacyColumn::int("created_by_id"),
            LegacyColumn::timestamp("last_modified"),
            LegacyColumn::int("last_modified_by_id"),
            $($extra),*
        ]
    };
}

const PARTY_COLUMNS: &[LegacyColumn] = party_columns!();
const ASSOCIATE_COLUMNS: &[LegacyColumn] = party_columns!(LegacyColumn::int("service_fee_id"));

pub struct PartyRule {
    kind: EntityKind,
}

impl PartyRule {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    fn role(&self) -> i64 {
        match self.kind {
            EntityKind::Staff => ROLE_FRONTLINE_STAFF,
            EntityKind::Customer => ROLE_CUSTOMER,
            _ => ROLE_ASSOCIATE,
        }
    }

    fn has_service_fee(&self) -> bool {
        self.kind == EntityKind::Associate
    }

    /// The owning account: the migrated `owner_id` user, or one derived from
    /// the party's email when the legacy row has no owner.
    async fn owner(
        &self,
        ctx: &RowContext<'_>,
        row: &LegacyRow,
        names: &Names,
        state: i64,
    ) -> Result<NewId, RowError> {
        match ctx.reference(row, "owner_id", EntityKind::User).await? {
            Resolution::Resolved(id) => Ok(id),
            Resolution::Unresolved { kind, legacy_id } => Err(RowError::Unresolved {
                field: "owner_id",
                kind,
                legacy_id,
            }),
            Resolution::Absent => {
                let email = row
                    .text("email")?
                    .map(normalize_email)
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| format!("{}+{}@workery.ca", self.kind, row.id()));
                let key = NaturalKey::new(EMAIL, email.clone());
                if let Some(existing) = ctx.find_by_natural_key(EntityKind::User, &key).await? {
                    return Ok(existing);
                }

                let account = TargetRecord::new()
                    .text(EMAIL, Some(email))
                    .text("first_name", Some(names.given.as_str()))
                    .text("last_name", Some(names.last.as_str()))
                    .text("name", Some(names.full.as_str()))
                    .text("lexical_name", Some(names.lexical.as_str()))
                    .int("role_id", self.role())
                    .int("state", state)
                    .text("timezone", Some(ctx.tenant().timezone.as_str()))
                    .bool("was_email_activated", false);
                let id = ctx
                    .upsert_derived(UpsertRequest::new(
                        EntityKind::User,
                        UpsertKey::Natural(key),
                        account,
                    ))
                    .await?;
                debug!(party = %self.kind, legacy_id = %row.id(), user = %id, "derived owner account");
                Ok(id)
            }
        }
    }
}

struct Names {
    given: String,
    last: String,
    full: String,
    lexical: String,
}

impl Names {
    fn of(row: &LegacyRow) -> Result<Self, RowError> {
        let given = row.text_or_empty("given_name")?;
        let middle = row.text_or_empty("middle_name")?;
        let last = row.text_or_empty("last_name")?;
        Ok(Self {
            given: given.trim().to_owned(),
            last: last.trim().to_owned(),
            full: full_name(given, middle, last),
            lexical: lexical_name(given, middle, last),
        })
    }
}

/// Text shown for the how-hear answer: the free-form answer for "other",
/// otherwise the migrated item's text.
async fn how_hear_text(
    ctx: &RowContext<'_>,
    row: &LegacyRow,
    item: Option<NewId>,
) -> Result<Option<String>, RowError> {
    let legacy_item = row.reference("how_hear_id")?;
    if legacy_item.map(LegacyId::get) == Some(HOW_HEAR_OTHER) {
        let other = row.text_or_empty("how_hear_other")?.trim();
        let text = if other.is_empty() { "-" } else { other };
        return Ok(Some(text.to_owned()));
    }
    ctx.read_text(EntityKind::HowHearAboutUsItem, item, "text").await
}

#[async_trait]
impl MappingRule for PartyRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn legacy_table(&self) -> LegacyTable {
        LegacyTable {
            name: self.kind.legacy_table(),
            id_column: LegacyTable::ID,
            columns: if self.has_service_fee() {
                ASSOCIATE_COLUMNS
            } else {
                PARTY_COLUMNS
            },
            tenant_column: None,
        }
    }

    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError> {
        let names = Names::of(row)?;
        let state = record_state(row.flag("is_archived")?);

        let how_hear = ctx
            .optional(row, "how_hear_id", EntityKind::HowHearAboutUsItem)
            .await?;
        let how_hear_text = how_hear_text(ctx, row, how_hear).await?;

        let address = Address {
            street: row.text_or_empty("street_address")?,
            street_extra: row.text_or_empty("street_address_extra")?,
            locality: row.text_or_empty("address_locality")?,
            region: row.text_or_empty("address_region")?,
            country: row.text_or_empty("address_country")?,
            postal_code: row.text_or_empty("postal_code")?,
        };

        let mut record = TargetRecord::new()
            .text("given_name", Some(names.given.as_str()))
            .text("middle_name", row.text("middle_name")?)
            .text("last_name", Some(names.last.as_str()))
            .text("name", Some(names.full.as_str()))
            .text("lexical_name", Some(names.lexical.as_str()))
            .text("email", row.text("email")?)
            .text("telephone", row.text("telephone")?)
            .text("organization_name", row.text("organization_name")?)
            .text("address_country", Some(address.country))
            .text("address_region", Some(address.region))
            .text("address_locality", Some(address.locality))
            .text("postal_code", Some(address.postal_code))
            .text("street_address", Some(address.street))
            .text("street_address_extra", Some(address.street_extra))
            .text("full_address_without_postal_code", Some(address.without_postal_code()))
            .text("full_address_with_postal_code", Some(address.with_postal_code()))
            .text("full_address_url", Some(address.maps_url()))
            .id("how_hear_id", how_hear)
            .text("how_hear_other", row.text("how_hear_other")?)
            .text("how_hear_text", how_hear_text)
            .date("join_date", row.date("join_date")?)
            .date("birthdate", row.date("birthdate")?)
            .bool("is_ok_to_email", row.flag("is_ok_to_email")?)
            .bool("is_ok_to_text", row.flag("is_ok_to_text")?)
            .int("type_of", row.int("type_of")?)
            .int("state", state);

        if self.has_service_fee() {
            let fee = ctx
                .optional(row, "service_fee_id", EntityKind::ServiceFee)
                .await?;
            record = record.id("service_fee_id", fee);
        }
        let record = audit_columns(ctx, row, record, "created", "last_modified").await?;

        // Last fallible step: deriving an owner writes an account.
        let user_id = self.owner(ctx, row, &names, state).await?;
        Ok(record.id("user_id", Some(user_id)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::domain::test_support::{RuleHarness, row, text_of};
    use legacy_migration_sdk::TargetValue;

    fn associate(id: i64) -> LegacyRow {
        row(id)
            .with("given_name", "Ada")
            .with("last_name", "Lovelace")
            .with("street_address", "78 Riverside Dr")
            .with("address_locality", "London")
            .with("address_region", "Ontario")
            .with("address_country", "Canada")
    }

    #[tokio::test]
    async fn ownerless_party_derives_account_by_email() {
        let h = RuleHarness::default();
        let rule = PartyRule::new(EntityKind::Associate);

        let legacy = associate(42).with("email", "a@b.com");
        let record = rule.map(&mut h.ctx(42), &legacy).await.unwrap();

        let users = h.store.rows(h.tenant.id, EntityKind::User);
        assert_eq!(users.len(), 1);
        assert_eq!(text_of(&users[0].record, "email").as_deref(), Some("a@b.com"));
        assert_eq!(users[0].record.get("role_id").and_then(TargetValue::as_int), Some(ROLE_ASSOCIATE));
        assert_eq!(users[0].old_id, None);
        assert_eq!(record.get("user_id").and_then(TargetValue::as_id), Some(users[0].id));

        rule.map(&mut h.ctx(42), &legacy).await.unwrap();
        assert_eq!(h.store.rows(h.tenant.id, EntityKind::User).len(), 1);
    }

    #[tokio::test]
    async fn ownerless_party_without_email_gets_placeholder() {
        let h = RuleHarness::default();
        PartyRule::new(EntityKind::Customer)
            .map(&mut h.ctx(7), &associate(7))
            .await
            .unwrap();

        let users = h.store.rows(h.tenant.id, EntityKind::User);
        assert_eq!(text_of(&users[0].record, "email").as_deref(), Some("customer+7@workery.ca"));
        assert_eq!(users[0].record.get("role_id").and_then(TargetValue::as_int), Some(ROLE_CUSTOMER));
    }

    #[tokio::test]
    async fn unmigrated_owner_skips_the_row() {
        let h = RuleHarness::default();
        let err = PartyRule::new(EntityKind::Staff)
            .map(&mut h.ctx(5), &associate(5).with("owner_id", 77_i64))
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::Unresolved { field: "owner_id", .. }));
        assert!(h.store.rows(h.tenant.id, EntityKind::User).is_empty());
    }

    #[tokio::test]
    async fn invalid_row_derives_no_account() {
        let h = RuleHarness::default();
        let rule = PartyRule::new(EntityKind::Associate);

        let bad_date = associate(8).with("email", "a@b.com").with("birthdate", "someday");
        let err = rule.map(&mut h.ctx(8), &bad_date).await.unwrap_err();
        assert!(matches!(err, RowError::InvalidValue { field: "birthdate", .. }));

        let bad_flag = associate(8).with("email", "a@b.com").with("is_ok_to_text", "yes");
        let err = rule.map(&mut h.ctx(8), &bad_flag).await.unwrap_err();
        assert!(matches!(err, RowError::InvalidValue { field: "is_ok_to_text", .. }));

        assert!(h.store.rows(h.tenant.id, EntityKind::User).is_empty());
    }

    #[tokio::test]
    async fn how_hear_text_and_address() {
        let h = RuleHarness::default();
        let owner = h.seed(EntityKind::User, 3, TargetRecord::new());
        h.seed(
            EntityKind::HowHearAboutUsItem,
            1,
            TargetRecord::new().text("text", Some("Other")),
        );
        h.seed(
            EntityKind::HowHearAboutUsItem,
            2,
            TargetRecord::new().text("text", Some("Friend")),
        );
        let rule = PartyRule::new(EntityKind::Partner);

        let record = rule
            .map(&mut h.ctx(9), &associate(9).with("owner_id", 3_i64).with("how_hear_id", 2_i64))
            .await
            .unwrap();
        assert_eq!(record.get("user_id").and_then(TargetValue::as_id), Some(owner));
        assert_eq!(text_of(&record, "how_hear_text").as_deref(), Some("Friend"));
        assert_eq!(text_of(&record, "full_address_with_postal_code").as_deref(), Some("-"));
        assert_eq!(
            text_of(&record, "full_address_without_postal_code").as_deref(),
            Some("78 Riverside Dr, London, Ontario, Canada")
        );
        assert!(record.get("service_fee_id").is_none());

        let record = rule
            .map(&mut h.ctx(9), &associate(9).with("owner_id", 3_i64).with("how_hear_id", 1_i64))
            .await
            .unwrap();
        assert_eq!(text_of(&record, "how_hear_text").as_deref(), Some("-"));
    }
}
