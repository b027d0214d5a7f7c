//! Flat legacy rows as delivered by the legacy source.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use crate::error::RowError;
use crate::ids::LegacyId;

/// A single typed, nullable legacy column value.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl LegacyValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Date(_) => "date",
        }
    }
}

impl From<i64> for LegacyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for LegacyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for LegacyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for LegacyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for LegacyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for LegacyValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<NaiveDate> for LegacyValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl<T: Into<LegacyValue>> From<Option<T>> for LegacyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Declared type of a legacy column, used to decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
    Date,
}

/// One selected legacy column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl LegacyColumn {
    #[must_use]
    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Int }
    }

    #[must_use]
    pub const fn float(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Float }
    }

    #[must_use]
    pub const fn bool(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Bool }
    }

    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    #[must_use]
    pub const fn timestamp(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Timestamp }
    }

    #[must_use]
    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Date }
    }
}

/// The select list of one legacy table. The integer primary key named by
/// `id_column` is always selected and becomes the row's [`LegacyId`].
#[derive(Debug, Clone, Copy)]
pub struct LegacyTable {
    pub name: &'static str,
    /// Primary key column; [`LegacyTable::ID`] for all but a few tables keyed
    /// by their parent's id.
    pub id_column: &'static str,
    pub columns: &'static [LegacyColumn],
    /// For tables shared by every tenant: the column holding the owning
    /// tenant's legacy id. Rows of other tenants are not delivered.
    pub tenant_column: Option<&'static str>,
}

impl LegacyTable {
    pub const ID: &'static str = "id";
}

/// A legacy row keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRow {
    id: LegacyId,
    fields: HashMap<String, LegacyValue>,
}

impl LegacyRow {
    #[must_use]
    pub fn new(id: LegacyId) -> Self {
        Self {
            id,
            fields: HashMap::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<LegacyValue>) -> Self {
        self.insert(field, value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: LegacyValue) {
        self.fields.insert(field.into(), value);
    }

    #[must_use]
    pub fn id(&self) -> LegacyId {
        self.id
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&LegacyValue> {
        self.fields.get(field)
    }

    /// Columns absent from the row read as null.
    fn value(&self, field: &str) -> &LegacyValue {
        const NULL: &LegacyValue = &LegacyValue::Null;
        self.fields.get(field).unwrap_or(NULL)
    }

    fn mismatch(field: &'static str, expected: &str, got: &LegacyValue) -> RowError {
        RowError::InvalidValue {
            field,
            message: format!("expected {expected}, found {}", got.type_name()),
        }
    }

    /// A legacy foreign key: null and `0` both mean "no reference".
    ///
    /// # Errors
    /// Returns `RowError::InvalidValue` for non-integer or negative values.
    pub fn reference(&self, field: &'static str) -> Result<Option<LegacyId>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Int(raw) => {
                LegacyId::from_column(*raw).map_err(|e| RowError::InvalidValue {
                    field,
                    message: e.to_string(),
                })
            }
            other => Err(Self::mismatch(field, "integer id", other)),
        }
    }

    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not text.
    pub fn text(&self, field: &'static str) -> Result<Option<&str>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Text(s) => Ok(Some(s.as_str())),
            other => Err(Self::mismatch(field, "text", other)),
        }
    }

    /// Text that must be present.
    ///
    /// # Errors
    /// Returns `RowError::MissingRequired` for null.
    pub fn required_text(&self, field: &'static str) -> Result<&str, RowError> {
        self.text(field)?.ok_or(RowError::MissingRequired { field })
    }

    /// Text with null read as the empty string.
    ///
    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not text.
    pub fn text_or_empty(&self, field: &'static str) -> Result<&str, RowError> {
        Ok(self.text(field)?.unwrap_or_default())
    }

    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not an integer.
    pub fn int(&self, field: &'static str) -> Result<Option<i64>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Int(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(field, "integer", other)),
        }
    }

    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not a float.
    pub fn float(&self, field: &'static str) -> Result<Option<f64>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Float(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(field, "float", other)),
        }
    }

    /// A boolean flag; null reads as `false`.
    ///
    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is neither boolean nor 0/1.
    pub fn flag(&self, field: &'static str) -> Result<bool, RowError> {
        match self.value(field) {
            LegacyValue::Null | LegacyValue::Int(0) => Ok(false),
            LegacyValue::Bool(v) => Ok(*v),
            LegacyValue::Int(1) => Ok(true),
            other => Err(Self::mismatch(field, "boolean", other)),
        }
    }

    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not a timestamp.
    pub fn timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Timestamp(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(field, "timestamp", other)),
        }
    }

    /// # Errors
    /// Returns `RowError::InvalidValue` if the column is not a date.
    pub fn date(&self, field: &'static str) -> Result<Option<NaiveDate>, RowError> {
        match self.value(field) {
            LegacyValue::Null => Ok(None),
            LegacyValue::Date(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(field, "date", other)),
        }
    }
}
