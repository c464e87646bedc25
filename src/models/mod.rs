//! # Data Models
//!
//! This module contains all the data models used throughout the Estates API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod enquiry;
pub mod property;
pub mod property_view;
pub mod user;

pub use enquiry::Entity as Enquiry;
pub use property::Entity as Property;
pub use property_view::Entity as PropertyView;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "estates".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
