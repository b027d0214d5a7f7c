use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Alias, Expr, Query, SimpleExpr, Value};
use std::marker::PhantomData;

use super::{Scoped, ScopeError, TENANT_COL, TenantScope, Unscoped};

/// An `INSERT` whose tenant column is stamped by the scope, never by the caller.
#[must_use]
#[derive(Clone, Debug)]
pub struct ScopedInsert<S> {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    touches_tenant: bool,
    _state: PhantomData<S>,
}

/// Start an insert into `table`.
pub fn insert_into(table: &str) -> ScopedInsert<Unscoped> {
    ScopedInsert {
        table: table.to_owned(),
        columns: Vec::new(),
        values: Vec::new(),
        touches_tenant: false,
        _state: PhantomData,
    }
}

impl<S> ScopedInsert<S> {
    pub fn value(mut self, col: &str, value: impl Into<Value>) -> Self {
        if col == TENANT_COL {
            self.touches_tenant = true;
            return self;
        }
        self.columns.push(col.to_owned());
        self.values.push(value.into());
        self
    }
}

impl ScopedInsert<Unscoped> {
    /// Stamp the tenant column, transitioning to the `Scoped` state.
    pub fn scope_with(mut self, scope: &TenantScope) -> ScopedInsert<Scoped> {
        self.columns.push(TENANT_COL.to_owned());
        self.values.push(scope.tenant_id().into());
        ScopedInsert {
            table: self.table,
            columns: self.columns,
            values: self.values,
            touches_tenant: self.touches_tenant,
            _state: PhantomData,
        }
    }
}

impl ScopedInsert<Scoped> {
    /// # Errors
    /// Returns `ScopeError::Denied` if a caller tried to set the tenant column,
    /// `ScopeError::Db` if the insert fails.
    pub async fn exec<C>(self, conn: &C) -> Result<(), ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        if self.touches_tenant {
            return Err(ScopeError::Denied("tenant column is set by the scope"));
        }
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(&self.table))
            .columns(self.columns.iter().map(Alias::new));
        stmt.values(self.values.into_iter().map(SimpleExpr::from))?;
        conn.execute(conn.get_database_backend().build(&stmt))
            .await?;
        Ok(())
    }
}

/// An `UPDATE` restricted to rows of one tenant.
#[must_use]
#[derive(Clone, Debug)]
pub struct ScopedUpdate<S> {
    table: String,
    assignments: Vec<(String, Value)>,
    filters: Vec<(String, Value)>,
    touches_tenant: bool,
    _state: PhantomData<S>,
}

/// Start an update of `table`.
pub fn update_table(table: &str) -> ScopedUpdate<Unscoped> {
    ScopedUpdate {
        table: table.to_owned(),
        assignments: Vec::new(),
        filters: Vec::new(),
        touches_tenant: false,
        _state: PhantomData,
    }
}

impl<S> ScopedUpdate<S> {
    pub fn value(mut self, col: &str, value: impl Into<Value>) -> Self {
        if col == TENANT_COL {
            self.touches_tenant = true;
            return self;
        }
        self.assignments.push((col.to_owned(), value.into()));
        self
    }
}

impl ScopedUpdate<Unscoped> {
    /// Restrict the update to one tenant, transitioning to the `Scoped` state.
    pub fn scope_with(mut self, scope: &TenantScope) -> ScopedUpdate<Scoped> {
        self.filters
            .push((TENANT_COL.to_owned(), scope.tenant_id().into()));
        ScopedUpdate {
            table: self.table,
            assignments: self.assignments,
            filters: self.filters,
            touches_tenant: self.touches_tenant,
            _state: PhantomData,
        }
    }
}

impl ScopedUpdate<Scoped> {
    pub fn and_eq(mut self, col: &str, value: impl Into<Value>) -> Self {
        self.filters.push((col.to_owned(), value.into()));
        self
    }

    /// Execute and return the number of rows changed.
    ///
    /// # Errors
    /// Returns `ScopeError::Denied` if the tenant column would be reassigned,
    /// `ScopeError::Invalid` for an update without assignments,
    /// `ScopeError::Db` if the update fails.
    pub async fn exec<C>(self, conn: &C) -> Result<u64, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        if self.touches_tenant {
            return Err(ScopeError::Denied("rows cannot move between tenants"));
        }
        if self.assignments.is_empty() {
            return Err(ScopeError::Invalid("update has no assignments"));
        }
        let mut stmt = Query::update();
        stmt.table(Alias::new(&self.table));
        for (col, value) in self.assignments {
            stmt.value(Alias::new(col), value);
        }
        for (col, value) in self.filters {
            stmt.and_where(Expr::col(Alias::new(col)).eq(value));
        }
        let res = conn
            .execute(conn.get_database_backend().build(&stmt))
            .await?;
        Ok(res.rows_affected())
    }
}
