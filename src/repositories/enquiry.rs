//! Enquiry repository
//!
//! Stores inbound enquiries and serves the read-only admin listing.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::enquiry::{self, Entity as Enquiry, EnquiryListing};
use crate::validation::{is_valid_email, normalize_email};

/// Request data for submitting an enquiry
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewEnquiry {
    #[schema(example = "Ivan Petrov")]
    pub name: String,
    /// Reference the enquirer is asking about, e.g. a listing ref code
    #[schema(example = "AB12CD34EF")]
    pub number: Option<String>,
    #[schema(example = "+7 495 000-00-00")]
    pub phone_number: String,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Repository for Enquiry database operations
pub struct EnquiryRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EnquiryRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: NewEnquiry) -> Result<enquiry::Model, RepositoryError> {
        let name = required("name", &request.name, 100)?;
        let phone_number = required("phone_number", &request.phone_number, 30)?;
        let message = request.message.trim();
        if message.is_empty() {
            return Err(RepositoryError::validation_error(
                "message",
                "A message is required",
            ));
        }

        let subject = request.subject.trim();
        if subject.chars().count() > 100 {
            return Err(RepositoryError::validation_error(
                "subject",
                "Must be at most 100 characters",
            ));
        }

        let number = request
            .number
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if number.as_ref().is_some_and(|value| value.chars().count() > 100) {
            return Err(RepositoryError::validation_error(
                "number",
                "Must be at most 100 characters",
            ));
        }

        let email = match request.email.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let email = normalize_email(raw);
                if !is_valid_email(&email) {
                    return Err(RepositoryError::validation_error(
                        "email",
                        "You must provide a valid email address",
                    ));
                }
                Some(email)
            }
            _ => None,
        };

        let now = Utc::now();
        let created = enquiry::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            number: Set(number),
            phone_number: Set(phone_number),
            email: Set(email),
            subject: Set(subject.to_string()),
            message: Set(message.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        tracing::info!(enquiry_id = %created.id, "Received enquiry");
        Ok(created)
    }

    /// Admin listing projection, newest first
    pub async fn list_admin(&self) -> Result<Vec<EnquiryListing>, RepositoryError> {
        Enquiry::find()
            .select_only()
            .columns([
                enquiry::Column::Name,
                enquiry::Column::Number,
                enquiry::Column::PhoneNumber,
                enquiry::Column::Message,
            ])
            .order_by_desc(enquiry::Column::CreatedAt)
            .into_model::<EnquiryListing>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, RepositoryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RepositoryError::validation_error(
            field,
            format!("{field} is required"),
        ));
    }
    if value.chars().count() > max {
        return Err(RepositoryError::validation_error(
            field,
            format!("Must be at most {max} characters"),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_bounds() {
        assert_eq!(required("name", "  Ivan ", 100).unwrap(), "Ivan");
        assert!(matches!(
            required("name", "   ", 100),
            Err(RepositoryError::Validation { field: "name", .. })
        ));
        assert!(matches!(
            required("phone_number", &"9".repeat(31), 30),
            Err(RepositoryError::Validation { field: "phone_number", .. })
        ));
    }
}
