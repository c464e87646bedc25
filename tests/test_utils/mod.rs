//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations applied, plus fixtures for users and listings.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use estates::config::AppConfig;
use estates::listing::{RandomRefCodes, SeededRefCodes};
use estates::models::{property, user};
use estates::repositories::{NewUser, PropertyDraft, PropertyRepository, UserRepository};
use estates::server::{AppState, create_app};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Bearer token accepted by [`test_app`].
pub const OPERATOR_TOKEN: &str = "test-operator-token";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool holds a single connection so every query sees the same
/// in-memory database. Foreign keys stay enforced.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Creates a user with a derived email and a fixed password.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let request = NewUser::new(
        username,
        "Test",
        "User",
        format!("{username}@example.com"),
        "correct horse battery staple",
    );
    Ok(UserRepository::new(db).create_user(request).await?)
}

/// Property repository with a deterministic ref code source.
pub fn seeded_repository(db: &DatabaseConnection, seed: u64) -> PropertyRepository<'_> {
    PropertyRepository::new(db, Arc::new(SeededRefCodes::new(seed)))
}

/// Creates a listing owned by `owner`.
pub async fn create_test_property(
    db: &DatabaseConnection,
    owner: &user::Model,
    title: &str,
    published: bool,
) -> Result<property::Model> {
    let draft = PropertyDraft {
        published_status: published,
        ..PropertyDraft::titled(title)
    };
    Ok(PropertyRepository::new(db, Arc::new(RandomRefCodes))
        .create(owner.id, draft)
        .await?)
}

/// Router over a fresh database, with operator auth enabled and seeded ref codes.
pub async fn test_app() -> Result<(axum::Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let config = AppConfig {
        profile: "test".to_string(),
        operator_tokens: vec![OPERATOR_TOKEN.to_string()],
        ..Default::default()
    };

    let state = AppState::new(db.clone(), Arc::new(config))
        .with_ref_codes(Arc::new(SeededRefCodes::new(42)));

    Ok((create_app(state), db))
}
