//! Per-entity mapping rules: one legacy row in, one destination record out.
//!
//! A rule never writes its own row; the pipeline upserts the returned record.
//! Rules only read the destination through [`RowContext`], which resolves
//! references within the run's tenant and collects degraded references.

mod activity;
mod files;
mod invoices;
mod links;
mod lookups;
mod orders;
mod parties;
pub mod states;
pub mod text;
mod users;

use async_trait::async_trait;
use legacy_migration_sdk::{
    DegradedReference, EntityKind, LegacyColumn, LegacyId, LegacyRow, LegacyTable, NaturalKey, NewId,
    Resolution, RowError, StorageError, TargetRecord, Tenant, UpsertRequest,
};
use tracing::warn;

use crate::domain::ports::{BlobStore, DestinationStore};
use crate::domain::resolver::FkResolver;

/// Maps the rows of one legacy table to destination records.
#[async_trait]
pub trait MappingRule: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Columns to select from the legacy source.
    fn legacy_table(&self) -> LegacyTable;

    /// Record column forming a second uniqueness axis, if the kind has one.
    fn natural_key_column(&self) -> Option<&'static str> {
        None
    }

    /// Build the destination record for `row`.
    ///
    /// # Errors
    /// `RowError` skips the row, except `RowError::Fatal` which ends the run.
    async fn map(
        &self,
        ctx: &mut RowContext<'_>,
        row: &LegacyRow,
    ) -> Result<TargetRecord, RowError>;
}

/// The rule migrating `kind`.
#[must_use]
pub fn rule_for(kind: EntityKind) -> Box<dyn MappingRule> {
    match kind {
        EntityKind::User => Box::new(users::UserRule),
        EntityKind::HowHearAboutUsItem => Box::new(lookups::HowHearRule),
        EntityKind::Tag | EntityKind::VehicleType | EntityKind::InsuranceRequirement => {
            Box::new(lookups::TextLookupRule::new(kind))
        }
        EntityKind::ServiceFee => Box::new(lookups::ServiceFeeRule),
        EntityKind::Comment => Box::new(lookups::CommentRule),
        EntityKind::SkillSet => Box::new(lookups::SkillSetRule),
        EntityKind::SkillSetInsuranceRequirement => {
            Box::new(links::SKILL_SET_INSURANCE_REQUIREMENT)
        }
        EntityKind::BulletinBoardItem => Box::new(lookups::BulletinBoardItemRule),
        EntityKind::Associate
        | EntityKind::Customer
        | EntityKind::Partner
        | EntityKind::Staff => Box::new(parties::PartyRule::new(kind)),
        EntityKind::OngoingWorkOrder => Box::new(orders::OngoingWorkOrderRule),
        EntityKind::WorkOrder => Box::new(orders::WorkOrderRule),
        EntityKind::TaskItem => Box::new(orders::TaskItemRule),
        EntityKind::WorkOrderDeposit => Box::new(orders::WorkOrderDepositRule),
        EntityKind::WorkOrderInvoice => Box::new(invoices::WorkOrderInvoiceRule),
        EntityKind::AssociateAwayLog => Box::new(activity::AssociateAwayLogRule),
        EntityKind::ActivitySheetItem => Box::new(activity::ActivitySheetItemRule),
        EntityKind::AssociateTag => Box::new(links::ASSOCIATE_TAG),
        EntityKind::CustomerTag => Box::new(links::CUSTOMER_TAG),
        EntityKind::WorkOrderTag => Box::new(links::WORK_ORDER_TAG),
        EntityKind::StaffTag => Box::new(links::STAFF_TAG),
        EntityKind::AssociateComment => Box::new(links::ASSOCIATE_COMMENT),
        EntityKind::CustomerComment => Box::new(links::CUSTOMER_COMMENT),
        EntityKind::WorkOrderComment => Box::new(links::WORK_ORDER_COMMENT),
        EntityKind::StaffComment => Box::new(links::STAFF_COMMENT),
        EntityKind::PartnerComment => Box::new(links::PARTNER_COMMENT),
        EntityKind::AssociateVehicleType => Box::new(links::ASSOCIATE_VEHICLE_TYPE),
        EntityKind::AssociateSkillSet => Box::new(links::ASSOCIATE_SKILL_SET),
        EntityKind::AssociateInsuranceRequirement => {
            Box::new(links::ASSOCIATE_INSURANCE_REQUIREMENT)
        }
        EntityKind::WorkOrderSkillSet => Box::new(links::WORK_ORDER_SKILL_SET),
        EntityKind::PrivateFile => Box::new(files::PrivateFileRule),
    }
}

/// Select list of a table living in the tenant's own legacy schema.
fn tenant_table(kind: EntityKind, columns: &'static [LegacyColumn]) -> LegacyTable {
    LegacyTable {
        name: kind.legacy_table(),
        id_column: LegacyTable::ID,
        columns,
        tenant_column: None,
    }
}

/// Per-row view of the run: tenant, resolver and read access to the
/// destination.
pub struct RowContext<'a> {
    tenant: &'a Tenant,
    resolver: &'a FkResolver,
    store: &'a dyn DestinationStore,
    blobs: Option<&'a dyn BlobStore>,
    row_id: LegacyId,
    degraded: Vec<DegradedReference>,
}

impl<'a> RowContext<'a> {
    #[must_use]
    pub fn new(
        tenant: &'a Tenant,
        resolver: &'a FkResolver,
        store: &'a dyn DestinationStore,
        blobs: Option<&'a dyn BlobStore>,
        row_id: LegacyId,
    ) -> Self {
        Self {
            tenant,
            resolver,
            store,
            blobs,
            row_id,
            degraded: Vec::new(),
        }
    }

    #[must_use]
    pub fn tenant(&self) -> &Tenant {
        self.tenant
    }

    /// Resolve the legacy reference held in `field`.
    ///
    /// # Errors
    /// `RowError::InvalidValue` for a malformed id, `RowError::Fatal` when the
    /// lookup fails.
    pub async fn reference(
        &self,
        row: &LegacyRow,
        field: &'static str,
        kind: EntityKind,
    ) -> Result<Resolution, RowError> {
        let legacy_id = row.reference(field)?;
        Ok(self.resolver.resolve(self.tenant.id, kind, legacy_id).await?)
    }

    /// A reference the row cannot exist without.
    ///
    /// # Errors
    /// `RowError::MissingRequired` when the legacy value is null and
    /// `RowError::Unresolved` when its target has not been migrated.
    pub async fn required(
        &self,
        row: &LegacyRow,
        field: &'static str,
        kind: EntityKind,
    ) -> Result<NewId, RowError> {
        match self.reference(row, field, kind).await? {
            Resolution::Resolved(id) => Ok(id),
            Resolution::Absent => Err(RowError::MissingRequired { field }),
            Resolution::Unresolved { kind, legacy_id } => Err(RowError::Unresolved {
                field,
                kind,
                legacy_id,
            }),
        }
    }

    /// A reference the row may lack. An unresolved target leaves the field
    /// unset and is recorded as degraded.
    ///
    /// # Errors
    /// Only malformed ids and storage failures.
    pub async fn optional(
        &mut self,
        row: &LegacyRow,
        field: &'static str,
        kind: EntityKind,
    ) -> Result<Option<NewId>, RowError> {
        match self.reference(row, field, kind).await? {
            Resolution::Resolved(id) => Ok(Some(id)),
            Resolution::Absent => Ok(None),
            Resolution::Unresolved { kind, legacy_id } => {
                warn!(
                    row = %self.row_id,
                    field,
                    target = %kind,
                    missing = %legacy_id,
                    "optional reference not migrated, leaving it unset"
                );
                self.degraded.push(DegradedReference {
                    legacy_id: self.row_id,
                    field,
                    target: kind,
                    missing: legacy_id,
                });
                Ok(None)
            }
        }
    }

    /// Look up a row of `kind` by its natural key.
    ///
    /// # Errors
    /// Storage failures, as `RowError::Fatal`.
    pub async fn find_by_natural_key(
        &self,
        kind: EntityKind,
        key: &NaturalKey,
    ) -> Result<Option<NewId>, RowError> {
        Ok(self
            .store
            .find_new_id_by_natural_key(self.tenant.id, kind, key)
            .await?)
    }

    /// Upsert a record the current row depends on, e.g. a derived account.
    ///
    /// # Errors
    /// Storage failures, as `RowError::Fatal`.
    pub async fn upsert_derived(&self, request: UpsertRequest) -> Result<NewId, RowError> {
        Ok(self.store.upsert(self.tenant.id, request).await?)
    }

    /// A text column of a referenced destination row; `None` passes through.
    ///
    /// # Errors
    /// Storage failures, as `RowError::Fatal`.
    pub async fn read_text(
        &self,
        kind: EntityKind,
        id: Option<NewId>,
        column: &'static str,
    ) -> Result<Option<String>, RowError> {
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(self.store.read_text(self.tenant.id, kind, id, column).await?)
    }

    /// An id column of a referenced destination row; `None` passes through.
    ///
    /// # Errors
    /// Storage failures, as `RowError::Fatal`.
    pub async fn read_id(
        &self,
        kind: EntityKind,
        id: Option<NewId>,
        column: &'static str,
    ) -> Result<Option<NewId>, RowError> {
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(self.store.read_id(self.tenant.id, kind, id, column).await?)
    }

    /// Copy an attachment into the destination store.
    ///
    /// # Errors
    /// `RowError::BlobMissing` when the source object does not exist;
    /// `RowError::Fatal` when no blob store is configured or the copy fails.
    pub async fn transfer_blob(&self, source_key: &str) -> Result<String, RowError> {
        let blobs = self.blobs.ok_or_else(|| StorageError::Blob {
            key: source_key.to_owned(),
            message: "no blob store configured".to_owned(),
        })?;
        blobs
            .transfer(self.tenant, self.row_id, source_key)
            .await?
            .ok_or_else(|| RowError::BlobMissing {
                key: source_key.to_owned(),
            })
    }

    #[must_use]
    pub fn into_degraded(self) -> Vec<DegradedReference> {
        self.degraded
    }
}
