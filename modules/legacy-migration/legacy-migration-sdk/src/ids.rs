//! Identifiers on both sides of the migration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroI64;
use uuid::Uuid;

/// Primary key of a row in the single-tenant legacy schema.
///
/// Legacy tables use `0` to mean "no reference", so a `LegacyId` is never
/// zero: absence is `Option<LegacyId>::None`, never a reserved value. Ids are
/// also bounded by `i64::MAX`, the range of the `old_id` column they are
/// stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LegacyId(NonZeroI64);

/// A raw legacy value that cannot be a [`LegacyId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidLegacyId {
    #[error("legacy id 0 means absent")]
    Zero,
    #[error("legacy id {0} is negative")]
    Negative(i64),
    #[error("legacy id {0} exceeds the destination range")]
    OutOfRange(u64),
}

impl LegacyId {
    /// Interpret a raw legacy foreign-key column where `0` denotes absence.
    ///
    /// # Errors
    /// Returns `InvalidLegacyId::Negative` for negative values.
    pub fn from_column(raw: i64) -> Result<Option<Self>, InvalidLegacyId> {
        match Self::try_from(raw) {
            Ok(id) => Ok(Some(id)),
            Err(InvalidLegacyId::Zero) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn get(self) -> i64 {
        self.0.get()
    }
}

impl TryFrom<i64> for LegacyId {
    type Error = InvalidLegacyId;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw < 0 {
            return Err(InvalidLegacyId::Negative(raw));
        }
        NonZeroI64::new(raw).map(Self).ok_or(InvalidLegacyId::Zero)
    }
}

impl TryFrom<u64> for LegacyId {
    type Error = InvalidLegacyId;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let signed = i64::try_from(raw).map_err(|_| InvalidLegacyId::OutOfRange(raw))?;
        Self::try_from(signed)
    }
}

impl From<LegacyId> for i64 {
    fn from(id: LegacyId) -> Self {
        id.get()
    }
}

impl fmt::Display for LegacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate key assigned in the multi-tenant destination schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewId(Uuid);

impl NewId {
    /// Fresh globally-unique id for an inserted row.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for NewId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for NewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a tenant in the destination schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
