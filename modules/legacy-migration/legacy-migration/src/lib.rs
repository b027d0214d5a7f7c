//! Legacy migration core
//!
//! Moves one single-tenant Workery deployment into the shared multi-tenant
//! schema, one entity kind at a time:
//!
//! - Tenant resolution from a legacy schema name or integer id
//! - Foreign-key translation through the per-tenant identity index
//! - Per-row mapping with row-level vs fatal error classification
//! - Idempotent upserts keyed by legacy id and natural key
//!
//! ## Architecture
//!
//! ```text
//!   LegacySource ──rows──▶ MigrationPipeline ──UpsertRequest──▶ DestinationStore
//!                              │      ▲
//!                   MappingRule│      │FkResolver (tenant, kind, legacy id)
//!                              ▼      │
//!                          RowContext ┘──▶ BlobStore
//! ```

// === PUBLIC API (from SDK) ===
pub use legacy_migration_sdk::{
    // Identifiers
    EntityKind,
    LegacyId,
    NewId,
    TenantId,
    // Rows and records
    LegacyRow,
    LegacyTable,
    LegacyValue,
    TargetRecord,
    UpsertKey,
    UpsertRequest,
    // Outcomes
    MigrationReport,
    Resolution,
    SkippedRow,
    TenantImport,
    // Tenants
    Tenant,
    TenantSelector,
    // Error types
    MigrationError,
    RowError,
    StorageError,
};

// === ORCHESTRATION ===
pub use domain::pipeline::{MigrationPipeline, NoProgress, PipelineConfig, ProgressSink};
pub use domain::ports::{BlobStore, DestinationStore, LegacySource};
pub use domain::tenants::import_tenants;

// === ADAPTERS ===
pub use infra::blob::FsBlobStore;
pub use infra::storage::legacy::SeaOrmLegacySource;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::store::SeaOrmDestinationStore;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
