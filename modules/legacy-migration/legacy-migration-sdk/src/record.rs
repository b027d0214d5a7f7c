//! Destination records and the keys they are upserted by.

use chrono::{DateTime, NaiveDate, Utc};

use crate::entity::EntityKind;
use crate::ids::{LegacyId, NewId};

/// A typed, nullable destination column value.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetValue {
    Id(Option<NewId>),
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
    Date(Option<NaiveDate>),
}

impl TargetValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(Some(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_id(&self) -> Option<NewId> {
        match self {
            Self::Id(id) => *id,
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => *v,
            _ => None,
        }
    }
}

/// The mutable domain fields of one destination row.
///
/// The surrogate id, tenant and `old_id` columns are owned by the store and
/// never appear here. An upsert writes every listed column, so a field left
/// unset on a rerun is cleared rather than kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetRecord {
    fields: Vec<(&'static str, TargetValue)>,
}

impl TargetRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, column: &'static str, value: TargetValue) -> Self {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    #[must_use]
    pub fn id(self, column: &'static str, value: Option<NewId>) -> Self {
        self.set(column, TargetValue::Id(value))
    }

    #[must_use]
    pub fn int(self, column: &'static str, value: impl Into<Option<i64>>) -> Self {
        self.set(column, TargetValue::Int(value.into()))
    }

    #[must_use]
    pub fn float(self, column: &'static str, value: Option<f64>) -> Self {
        self.set(column, TargetValue::Float(value))
    }

    #[must_use]
    pub fn bool(self, column: &'static str, value: impl Into<Option<bool>>) -> Self {
        self.set(column, TargetValue::Bool(value.into()))
    }

    #[must_use]
    pub fn text<T: Into<String>>(self, column: &'static str, value: Option<T>) -> Self {
        self.set(column, TargetValue::Text(value.map(Into::into)))
    }

    #[must_use]
    pub fn timestamp(self, column: &'static str, value: Option<DateTime<Utc>>) -> Self {
        self.set(column, TargetValue::Timestamp(value))
    }

    #[must_use]
    pub fn date(self, column: &'static str, value: Option<NaiveDate>) -> Self {
        self.set(column, TargetValue::Date(value))
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&TargetValue> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TargetValue)> {
        self.fields.iter().map(|(c, v)| (*c, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A uniqueness axis other than the legacy id, e.g. a user's email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    pub column: &'static str,
    pub value: String,
}

impl NaturalKey {
    #[must_use]
    pub fn new(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// The key(s) an upsert matches an existing row by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertKey {
    Legacy(LegacyId),
    Natural(NaturalKey),
    /// Both axes apply; a legacy-id match wins over a natural-key match.
    Both {
        legacy_id: LegacyId,
        natural: NaturalKey,
    },
}

impl UpsertKey {
    #[must_use]
    pub fn legacy_id(&self) -> Option<LegacyId> {
        match self {
            Self::Legacy(id) | Self::Both { legacy_id: id, .. } => Some(*id),
            Self::Natural(_) => None,
        }
    }

    #[must_use]
    pub fn natural(&self) -> Option<&NaturalKey> {
        match self {
            Self::Natural(key) | Self::Both { natural: key, .. } => Some(key),
            Self::Legacy(_) => None,
        }
    }
}

/// One idempotent write request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertRequest {
    pub kind: EntityKind,
    pub key: UpsertKey,
    pub record: TargetRecord,
}

impl UpsertRequest {
    #[must_use]
    pub fn new(kind: EntityKind, key: UpsertKey, record: TargetRecord) -> Self {
        Self { kind, key, record }
    }
}
