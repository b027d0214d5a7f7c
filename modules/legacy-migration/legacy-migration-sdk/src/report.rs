//! The informational result of one run.

use serde::Serialize;
use std::fmt;

use crate::entity::EntityKind;
use crate::ids::{LegacyId, TenantId};
use crate::tenant::Tenant;

/// A row that was not migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub legacy_id: LegacyId,
    pub reason: String,
}

/// An optional reference that was given but could not be resolved; the row
/// was migrated with the field unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedReference {
    pub legacy_id: LegacyId,
    pub field: &'static str,
    pub target: EntityKind,
    pub missing: LegacyId,
}

/// Counts and skipped ids of one run, for audit. Reruns are driven by
/// re-invoking the command, not by this report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub entity: EntityKind,
    pub tenant_id: TenantId,
    pub processed: u64,
    pub imported: u64,
    pub skipped: Vec<SkippedRow>,
    pub degraded: Vec<DegradedReference>,
}

impl MigrationReport {
    #[must_use]
    pub fn new(entity: EntityKind, tenant_id: TenantId) -> Self {
        Self {
            entity,
            tenant_id,
            processed: 0,
            imported: 0,
            skipped: Vec::new(),
            degraded: Vec::new(),
        }
    }

    pub fn record_imported(&mut self) {
        self.processed += 1;
        self.imported += 1;
    }

    pub fn record_skipped(&mut self, legacy_id: LegacyId, reason: impl Into<String>) {
        self.processed += 1;
        self.skipped.push(SkippedRow {
            legacy_id,
            reason: reason.into(),
        });
    }

    #[must_use]
    pub fn skipped_ids(&self) -> Vec<LegacyId> {
        self.skipped.iter().map(|s| s.legacy_id).collect()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: processed {}, imported {}, skipped {}",
            self.entity,
            self.processed,
            self.imported,
            self.skipped.len()
        )?;
        if !self.degraded.is_empty() {
            write!(f, ", unresolved optional references {}", self.degraded.len())?;
        }
        Ok(())
    }
}

/// Outcome of a tenant import: the tenants written and the franchises that
/// could not be turned into one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TenantImport {
    pub tenants: Vec<Tenant>,
    pub skipped: Vec<SkippedRow>,
}

impl fmt::Display for TenantImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tenants: imported {}, skipped {}",
            self.tenants.len(),
            self.skipped.len()
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use uuid::Uuid;

    #[test]
    fn counts_and_summary() {
        let mut report = MigrationReport::new(EntityKind::TaskItem, TenantId::from(Uuid::nil()));
        report.record_imported();
        report.record_skipped(LegacyId::try_from(3_i64).unwrap(), "job unresolved");
        assert_eq!(report.processed, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped_ids(), vec![LegacyId::try_from(3_i64).unwrap()]);
        assert_eq!(
            report.to_string(),
            "task_item: processed 2, imported 1, skipped 1"
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entity"], "task_item");
        assert_eq!(json["skipped"][0]["legacy_id"], 3);
    }
}
