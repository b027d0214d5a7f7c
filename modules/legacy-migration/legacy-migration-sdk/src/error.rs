//! Error taxonomy of a migration run.
//!
//! [`MigrationError`] ends a run. [`RowError`] ends only the current row; its
//! single `Fatal` variant is the escape hatch for storage failures that make
//! continuing pointless.

use thiserror::Error;

use crate::entity::EntityKind;
use crate::ids::LegacyId;
use crate::tenant::TenantSelector;

/// The source or destination store cannot serve a request.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query on `{table}` failed: {message}")]
    Query { table: String, message: String },

    #[error("constraint violation on `{table}`: {message}")]
    Constraint { table: String, message: String },

    #[error("cannot decode `{table}.{column}`: {message}")]
    Decode {
        table: String,
        column: String,
        message: String,
    },

    #[error("blob transfer of `{key}` failed: {message}")]
    Blob { key: String, message: String },

    /// The natural key of an upsert already belongs to the row of another
    /// legacy id. Affects only the row being written.
    #[error("`{table}.{column}` value already belongs to legacy id #{claimed_by}")]
    KeyClaimed {
        table: String,
        column: String,
        claimed_by: LegacyId,
    },
}

/// Why a single legacy row could not be migrated.
#[derive(Debug, Error)]
pub enum RowError {
    /// A present legacy reference has no migrated counterpart yet.
    #[error("`{field}` references {kind} #{legacy_id} which has not been migrated")]
    Unresolved {
        field: &'static str,
        kind: EntityKind,
        legacy_id: LegacyId,
    },

    #[error("required field `{field}` is empty")]
    MissingRequired { field: &'static str },

    #[error("invalid value in `{field}`: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("attachment `{key}` is missing from the source store")]
    BlobMissing { key: String },

    /// Storage failure; aborts the whole run.
    #[error(transparent)]
    Fatal(#[from] StorageError),
}

/// A failure that aborts the run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("tenant not found for {selector}")]
    TenantNotFound { selector: TenantSelector },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("storage failure while migrating legacy id #{legacy_id}: {source}")]
    StorageAtRow {
        legacy_id: LegacyId,
        #[source]
        source: StorageError,
    },
}

impl MigrationError {
    /// The legacy row being processed when the run failed, if any.
    #[must_use]
    pub fn legacy_id(&self) -> Option<LegacyId> {
        match self {
            Self::StorageAtRow { legacy_id, .. } => Some(*legacy_id),
            Self::TenantNotFound { .. } | Self::Storage(_) => None,
        }
    }
}
