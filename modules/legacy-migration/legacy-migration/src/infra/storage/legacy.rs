//! `SeaORM` adapter reading the legacy single-tenant schema.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use legacy_migration_sdk::{
    ColumnKind, LegacyColumn, LegacyId, LegacyRow, LegacyTable, LegacyValue, StorageError, Tenant,
};
use sea_orm::sea_query::{Alias, Expr, Order, Query, SelectStatement, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, QueryResult};
use tracing::{debug, instrument};

use super::values::{db_err, get};
use crate::domain::ports::LegacySource;

const ID: &str = "id";

/// Reads whole legacy tables in ascending id order.
///
/// The schema of a tenant's tables is chosen by the connection's search
/// path, so one source instance serves exactly one legacy schema.
#[derive(Clone)]
pub struct SeaOrmLegacySource {
    conn: DatabaseConnection,
}

impl SeaOrmLegacySource {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// Postgres stores ids as `integer` and money as `numeric`; both are widened
/// so every backend decodes to the same Rust types.
fn projected(column: &LegacyColumn, backend: DbBackend) -> SimpleExpr {
    let expr = Expr::col(Alias::new(column.name));
    if backend != DbBackend::Postgres {
        return expr.into();
    }
    let cast = match column.kind {
        ColumnKind::Int => "bigint",
        ColumnKind::Float => "double precision",
        ColumnKind::Text => "text",
        ColumnKind::Timestamp => "timestamptz",
        ColumnKind::Date => "date",
        ColumnKind::Bool => return expr.into(),
    };
    expr.cast_as(Alias::new(cast))
}

/// The primary key is always read under the alias `id`.
fn select(table: &LegacyTable, tenant: Option<&Tenant>, backend: DbBackend) -> SelectStatement {
    let key = LegacyColumn::int(table.id_column);
    let mut stmt = Query::select();
    stmt.expr_as(projected(&key, backend), Alias::new(ID));
    for column in table.columns {
        stmt.expr_as(projected(column, backend), Alias::new(column.name));
    }
    stmt.from(Alias::new(table.name))
        .order_by(Alias::new(table.id_column), Order::Asc);
    if let (Some(col), Some(tenant)) = (table.tenant_column, tenant) {
        stmt.and_where(Expr::col(Alias::new(col)).eq(tenant.old_id.get()));
    }
    stmt
}

fn decode(row: &QueryResult, table: &str, column: &LegacyColumn) -> Result<LegacyValue, StorageError> {
    let name = column.name;
    Ok(match column.kind {
        ColumnKind::Int => get::<Option<i64>>(row, table, name)?.into(),
        ColumnKind::Float => get::<Option<f64>>(row, table, name)?.into(),
        ColumnKind::Bool => get::<Option<bool>>(row, table, name)?.into(),
        ColumnKind::Text => get::<Option<String>>(row, table, name)?.into(),
        ColumnKind::Timestamp => get::<Option<DateTime<Utc>>>(row, table, name)?.into(),
        ColumnKind::Date => get::<Option<NaiveDate>>(row, table, name)?.into(),
    })
}

#[async_trait]
impl LegacySource for SeaOrmLegacySource {
    #[instrument(skip(self, table, tenant), fields(table = table.name))]
    async fn fetch_all(
        &self,
        table: &LegacyTable,
        tenant: Option<&Tenant>,
    ) -> Result<Vec<LegacyRow>, StorageError> {
        let backend = self.conn.get_database_backend();
        let stmt = backend.build(&select(table, tenant, backend));
        let results = self
            .conn
            .query_all(stmt)
            .await
            .map_err(|e| db_err(table.name, &e))?;

        let mut rows = Vec::with_capacity(results.len());
        for result in &results {
            let raw = get::<i64>(result, table.name, ID)?;
            let id = LegacyId::from_column(raw).map_err(|e| StorageError::Decode {
                table: table.name.to_owned(),
                column: table.id_column.to_owned(),
                message: e.to_string(),
            })?;
            let Some(id) = id else {
                debug!("skipping placeholder row with id 0");
                continue;
            };
            let mut row = LegacyRow::new(id);
            for column in table.columns {
                row.insert(column.name, decode(result, table.name, column)?);
            }
            rows.push(row);
        }
        debug!(rows = rows.len(), "legacy table read");
        Ok(rows)
    }
}
