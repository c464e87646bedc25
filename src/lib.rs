//! # Estates API Library
//!
//! Core of the real-estate listing service: property listings with slugs,
//! reference codes and tax-inclusive prices, view tracking, user accounts
//! and enquiries, plus the HTTP surface that exposes them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod password;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod validation;
pub use migration;
