//! Database migrations for the Estates API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_users;
mod m2024_01_01_000002_create_properties;
mod m2024_01_01_000003_create_property_views;
mod m2024_01_01_000004_create_enquiries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_users::Migration),
            Box::new(m2024_01_01_000002_create_properties::Migration),
            Box::new(m2024_01_01_000003_create_property_views::Migration),
            Box::new(m2024_01_01_000004_create_enquiries::Migration),
        ]
    }
}
