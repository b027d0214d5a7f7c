//! `SeaORM` entities for tables with a fixed shape.

pub mod tenant;

pub use tenant::Entity as TenantEntity;
