#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

//! Shared fixtures: in-memory SQLite databases for both sides of a run.

use etl_db::DbConnConfig;
use legacy_migration::domain::rules::rule_for;
use legacy_migration::{
    EntityKind, LegacyTable, Migrator, SeaOrmDestinationStore, SeaOrmLegacySource,
};
use legacy_migration_sdk::ColumnKind;
use sea_orm::sea_query::{Alias, Query, SimpleExpr, SqliteQueryBuilder, Value};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub async fn sqlite() -> DatabaseConnection {
    etl_db::connect(&DbConnConfig::from_dsn("sqlite::memory:"))
        .await
        .unwrap()
}

/// A destination database with the full schema applied.
pub async fn destination() -> SeaOrmDestinationStore {
    let conn = sqlite().await;
    Migrator::up(&conn, None).await.unwrap();
    SeaOrmDestinationStore::new(conn)
}

fn sqlite_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Int => "INTEGER",
        ColumnKind::Float => "REAL",
        ColumnKind::Bool => "BOOLEAN",
        ColumnKind::Text => "TEXT",
        ColumnKind::Timestamp => "DATETIME",
        ColumnKind::Date => "DATE",
    }
}

/// Create `table` the way the legacy schema declares it.
pub async fn create_legacy_table(conn: &DatabaseConnection, table: &LegacyTable) {
    let mut columns = vec![format!("{} INTEGER PRIMARY KEY", table.id_column)];
    columns.extend(
        table
            .columns
            .iter()
            .filter(|c| c.name != table.id_column)
            .map(|c| format!("{} {}", c.name, sqlite_type(c.kind))),
    );
    if let Some(tenant_column) = table.tenant_column {
        columns.push(format!("{tenant_column} INTEGER"));
    }
    let ddl = format!("CREATE TABLE {} ({})", table.name, columns.join(", "));
    conn.execute_unprepared(&ddl).await.unwrap();
}

/// A legacy database holding the tables of `kinds`.
pub async fn legacy(kinds: &[EntityKind]) -> (DatabaseConnection, SeaOrmLegacySource) {
    let conn = sqlite().await;
    for kind in kinds {
        create_legacy_table(&conn, &rule_for(*kind).legacy_table()).await;
    }
    (conn.clone(), SeaOrmLegacySource::new(conn))
}

/// Insert one legacy row; unnamed columns stay null.
pub async fn insert(conn: &DatabaseConnection, table: &str, id: i64, values: &[(&str, Value)]) {
    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(table))
        .columns(std::iter::once("id").chain(values.iter().map(|(c, _)| *c)).map(Alias::new));
    stmt.values_panic(
        std::iter::once(SimpleExpr::from(id))
            .chain(values.iter().map(|(_, v)| SimpleExpr::from(v.clone()))),
    );
    conn.execute_unprepared(&stmt.to_string(SqliteQueryBuilder))
        .await
        .unwrap();
}

pub async fn count(conn: &DatabaseConnection, table: &str) -> i64 {
    let row = conn
        .query_one(sea_orm::Statement::from_string(
            conn.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

/// An integer column of the destination row migrated from `old_id`.
pub async fn int_column(conn: &DatabaseConnection, table: &str, column: &str, old_id: i64) -> Option<i64> {
    let row = conn
        .query_one(sea_orm::Statement::from_string(
            conn.get_database_backend(),
            format!("SELECT {column} AS v FROM {table} WHERE old_id = {old_id}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<Option<i64>>("", "v").unwrap()
}
