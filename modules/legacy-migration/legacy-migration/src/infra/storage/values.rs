//! Conversions between SDK values and `SeaORM` values and errors.

use etl_db::scoped::{ScopeError, TenantScope};
use legacy_migration_sdk::{StorageError, TargetValue, TenantId};
use sea_orm::sea_query::Value;
use sea_orm::{DbErr, QueryResult, SqlErr, TryGetable};

#[must_use]
pub fn db_err(table: &str, err: &DbErr) -> StorageError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        return StorageError::Constraint {
            table: table.to_owned(),
            message,
        };
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StorageError::Unavailable(err.to_string()),
        _ => StorageError::Query {
            table: table.to_owned(),
            message: err.to_string(),
        },
    }
}

#[must_use]
pub fn scope_err(table: &str, err: &ScopeError) -> StorageError {
    match err {
        ScopeError::Db(e) => db_err(table, e),
        other => StorageError::Query {
            table: table.to_owned(),
            message: other.to_string(),
        },
    }
}

pub fn scope_for(tenant: TenantId) -> Result<TenantScope, StorageError> {
    TenantScope::new(tenant.as_uuid()).map_err(|e| scope_err("tenants", &e))
}

#[must_use]
pub fn to_value(value: &TargetValue) -> Value {
    match value {
        TargetValue::Id(v) => v.map(|id| id.as_uuid()).into(),
        TargetValue::Int(v) => (*v).into(),
        TargetValue::Float(v) => (*v).into(),
        TargetValue::Bool(v) => (*v).into(),
        TargetValue::Text(v) => v.clone().into(),
        TargetValue::Timestamp(v) => (*v).into(),
        TargetValue::Date(v) => (*v).into(),
    }
}

/// Read `column` of a raw result row.
pub fn get<T: TryGetable>(
    row: &QueryResult,
    table: &str,
    column: &str,
) -> Result<T, StorageError> {
    row.try_get::<T>("", column)
        .map_err(|e| StorageError::Decode {
            table: table.to_owned(),
            column: column.to_owned(),
            message: e.to_string(),
        })
}
