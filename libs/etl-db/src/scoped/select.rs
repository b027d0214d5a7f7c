use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement, Value};
use sea_orm::{ConnectionTrait, DbBackend, QueryResult, Statement};
use std::marker::PhantomData;

use super::{Scoped, ScopeError, TENANT_COL, TenantScope, Unscoped};

/// A `SELECT` over a tenant-owned table that cannot run until scoped.
///
/// # Type Parameters
/// - `S`: The typestate (`Unscoped` or `Scoped`)
#[must_use]
#[derive(Clone, Debug)]
pub struct ScopedSelect<S> {
    table: String,
    stmt: SelectStatement,
    _state: PhantomData<S>,
}

/// Start a select against `table`.
pub fn select_from(table: &str) -> ScopedSelect<Unscoped> {
    let mut stmt = Query::select();
    stmt.from(Alias::new(table));
    ScopedSelect {
        table: table.to_owned(),
        stmt,
        _state: PhantomData,
    }
}

impl<S> ScopedSelect<S> {
    /// Add a projected column.
    pub fn column(mut self, col: &str) -> Self {
        self.stmt.column(Alias::new(col));
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl ScopedSelect<Unscoped> {
    /// Restrict the select to one tenant, transitioning to the `Scoped` state.
    pub fn scope_with(mut self, scope: &TenantScope) -> ScopedSelect<Scoped> {
        self.stmt
            .and_where(Expr::col(Alias::new(TENANT_COL)).eq(scope.tenant_id()));
        ScopedSelect {
            table: self.table,
            stmt: self.stmt,
            _state: PhantomData,
        }
    }
}

impl ScopedSelect<Scoped> {
    /// Narrow the scoped select with an equality predicate.
    /// The tenant predicate stays in place.
    pub fn and_eq(mut self, col: &str, value: impl Into<Value>) -> Self {
        self.stmt
            .and_where(Expr::col(Alias::new(col)).eq(value.into()));
        self
    }

    /// Render for `backend` without executing.
    #[must_use]
    pub fn build(&self, backend: DbBackend) -> Statement {
        backend.build(&self.stmt)
    }

    /// Execute and return the first matching row.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn one<C>(mut self, conn: &C) -> Result<Option<QueryResult>, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        self.stmt.limit(1);
        let stmt = conn.get_database_backend().build(&self.stmt);
        Ok(conn.query_one(stmt).await?)
    }

    /// Execute and return every matching row.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn all<C>(self, conn: &C) -> Result<Vec<QueryResult>, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let stmt = conn.get_database_backend().build(&self.stmt);
        Ok(conn.query_all(stmt).await?)
    }
}
