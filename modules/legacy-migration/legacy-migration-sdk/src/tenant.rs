//! Tenants: the isolation boundary of every migrated row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{LegacyId, TenantId};

/// Default timezone of tenants whose legacy franchise has none.
pub const DEFAULT_TIMEZONE: &str = "America/Toronto";

/// A tenant of the destination schema, created from one legacy franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub old_id: LegacyId,
    pub schema_name: String,
    pub name: String,
    pub alternate_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Tenant attributes read from a legacy franchise, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub old_id: LegacyId,
    pub schema_name: String,
    pub name: String,
    pub alternate_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// How the operator names the tenant of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantSelector {
    /// Legacy schema the franchise data lives in.
    SchemaName(String),
    /// Legacy franchise id, for entities migrated without a schema.
    LegacyId(LegacyId),
}

impl fmt::Display for TenantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaName(name) => write!(f, "schema '{name}'"),
            Self::LegacyId(id) => write!(f, "legacy tenant #{id}"),
        }
    }
}
