//! `SeaORM` storage for both sides of the migration.

pub mod entity;
pub mod legacy;
pub mod migrations;
pub mod store;

mod values;
