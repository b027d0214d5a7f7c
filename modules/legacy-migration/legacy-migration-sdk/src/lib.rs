//! Legacy migration SDK
//!
//! Transport-agnostic contract types shared by the migration core, its
//! storage adapters and the command surface.

pub mod entity;
pub mod error;
pub mod ids;
pub mod record;
pub mod report;
pub mod resolution;
pub mod row;
pub mod tenant;

pub use entity::{EntityKind, UnknownEntityKind};
pub use error::{MigrationError, RowError, StorageError};
pub use ids::{InvalidLegacyId, LegacyId, NewId, TenantId};
pub use record::{NaturalKey, TargetRecord, TargetValue, UpsertKey, UpsertRequest};
pub use report::{DegradedReference, MigrationReport, SkippedRow, TenantImport};
pub use resolution::Resolution;
pub use row::{ColumnKind, LegacyColumn, LegacyRow, LegacyTable, LegacyValue};
pub use tenant::{DEFAULT_TIMEZONE, NewTenant, Tenant, TenantSelector};
