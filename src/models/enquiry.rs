//! Enquiry entity model
//!
//! Inbound contact requests from prospective buyers and tenants.

use sea_orm::ActiveModelBehavior;
use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    /// Reference the enquirer quotes, typically a listing ref code
    pub number: Option<String>,

    pub phone_number: String,

    pub email: Option<String>,

    pub subject: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Read-only admin listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct EnquiryListing {
    pub name: String,
    pub number: Option<String>,
    pub phone_number: String,
    pub message: String,
}

impl From<Model> for EnquiryListing {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            number: model.number,
            phone_number: model.phone_number,
            message: model.message,
        }
    }
}
