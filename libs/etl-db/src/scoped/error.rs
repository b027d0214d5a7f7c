/// Errors that can occur while building or executing a scoped statement.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    /// Database error occurred during execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// Statement could not be assembled.
    #[error("invalid statement: {0}")]
    Build(#[from] sea_orm::sea_query::error::Error),

    /// Invalid scope or statement shape.
    #[error("invalid scope: {0}")]
    Invalid(&'static str),

    /// Statement would escape its tenant.
    #[error("access denied: {0}")]
    Denied(&'static str),
}
