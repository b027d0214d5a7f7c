//! Tenant-scoped statements over tenant-owned tables.
//!
//! Every migrated table carries a `tenant_id` column. Statements built here
//! start in the [`Unscoped`] state and only gain their execution methods once
//! [`scope_with`](ScopedSelect::scope_with) has added the tenant predicate
//! (selects, updates) or stamped the tenant column (inserts). Forgetting the
//! scope is a compile error, not a data leak.
//!
//! ```rust,ignore
//! use etl_db::scoped::{TenantScope, select_from};
//!
//! let scope = TenantScope::new(tenant_id)?;
//! let row = select_from("work_orders")
//!     .column("id")
//!     .scope_with(&scope)
//!     .and_eq("old_id", 7_i64)
//!     .one(&conn)
//!     .await?;
//! ```

mod error;
mod select;
mod write;


pub use error::ScopeError;
pub use select::{ScopedSelect, select_from};
pub use write::{ScopedInsert, ScopedUpdate, insert_into, update_table};

use uuid::Uuid;

/// Name of the ownership column present on every tenant-owned table.
pub const TENANT_COL: &str = "tenant_id";

/// Typestate marker: statement has not been bound to a tenant.
#[derive(Debug, Clone, Copy)]
pub struct Unscoped;

/// Typestate marker: statement is restricted to exactly one tenant.
#[derive(Debug, Clone, Copy)]
pub struct Scoped;

/// The single tenant a statement is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantScope {
    tenant_id: Uuid,
}

impl TenantScope {
    /// # Errors
    /// Returns `ScopeError::Invalid` for the nil UUID, which never names a tenant.
    pub fn new(tenant_id: Uuid) -> Result<Self, ScopeError> {
        if tenant_id.is_nil() {
            return Err(ScopeError::Invalid("tenant scope requires a non-nil tenant id"));
        }
        Ok(Self { tenant_id })
    }

    #[must_use]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}
