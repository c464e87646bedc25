//! # User Repository
//!
//! Account creation for agents, sellers and buyers. Every check runs before
//! the insert, so a rejected request never leaves a partial row behind.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::property;
use crate::models::user::{self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel};
use crate::password;
use crate::validation::{is_valid_email, normalize_email};

/// Optional flag overrides applied on top of the account defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtraFields {
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Request data for creating a user.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewUser {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Smith")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Plain password; stored only as an argon2 hash. Omit for an account
    /// that cannot log in with a password.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: Some(password.into()),
            extra: ExtraFields::default(),
        }
    }

    pub fn with_extra(mut self, extra: ExtraFields) -> Self {
        self.extra = extra;
        self
    }
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validate and create a regular account.
    ///
    /// `is_staff` and `is_superuser` default to false and `is_active` to true
    /// unless `extra` overrides them.
    pub async fn create_user(&self, request: NewUser) -> Result<UserModel, RepositoryError> {
        let checked = validate_new_user(&request)?;
        let password_hash = match request.password.as_deref() {
            Some(plain) if !plain.is_empty() => password::hash_password(plain)?,
            _ => password::unusable_password(),
        };

        let txn = self.db.begin().await.map_err(RepositoryError::database_error)?;

        ensure_unique(&txn, user::Column::Username, &checked.username, "username").await?;
        ensure_unique(&txn, user::Column::Email, &checked.email, "email").await?;

        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(checked.username),
            first_name: Set(checked.first_name),
            last_name: Set(checked.last_name),
            email: Set(checked.email),
            password: Set(password_hash),
            is_staff: Set(request.extra.is_staff.unwrap_or(false)),
            is_superuser: Set(request.extra.is_superuser.unwrap_or(false)),
            is_active: Set(request.extra.is_active.unwrap_or(true)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = user
            .insert(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        txn.commit().await.map_err(RepositoryError::database_error)?;

        tracing::info!(user_id = %created.id, username = %created.username, "Created user");
        Ok(created)
    }

    /// Create an administrator account: staff and superuser flags are forced
    /// on and a password is mandatory.
    pub async fn create_superuser(&self, mut request: NewUser) -> Result<UserModel, RepositoryError> {
        if request.extra.is_staff == Some(false) {
            return Err(RepositoryError::validation_error(
                "is_staff",
                "Superusers must have is_staff=true",
            ));
        }
        if request.extra.is_superuser == Some(false) {
            return Err(RepositoryError::validation_error(
                "is_superuser",
                "Superusers must have is_superuser=true",
            ));
        }
        if request.password.as_deref().is_none_or(str::is_empty) {
            return Err(RepositoryError::validation_error(
                "password",
                "Superusers must have a password",
            ));
        }

        request.extra.is_staff = Some(true);
        request.extra.is_superuser = Some(true);
        self.create_user(request).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Look up a user by email; the address is normalized first.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Returns the active user matching `email` and `password`, if any.
    pub async fn authenticate(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        if user.is_active && password::verify_password(plain_password, &user.password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Delete a user. Refused while the user still owns listings.
    pub async fn delete(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await.map_err(RepositoryError::database_error)?;

        User::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("User not found".to_string()))?;

        let owned = property::Entity::find()
            .filter(property::Column::UserId.eq(user_id))
            .count(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        if owned > 0 {
            return Err(RepositoryError::InUse(format!(
                "User still owns {owned} properties"
            )));
        }

        User::delete_by_id(user_id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        txn.commit().await.map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Get user count
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        User::find()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

struct CheckedUser {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
}

fn validate_new_user(request: &NewUser) -> Result<CheckedUser, RepositoryError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(RepositoryError::validation_error(
            "username",
            "Users must submit a username",
        ));
    }

    let first_name = request.first_name.trim();
    if first_name.is_empty() {
        return Err(RepositoryError::validation_error(
            "first_name",
            "Users must submit a first name",
        ));
    }

    let last_name = request.last_name.trim();
    if last_name.is_empty() {
        return Err(RepositoryError::validation_error(
            "last_name",
            "Users must submit a last name",
        ));
    }

    if request.email.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "email",
            "An email address is required",
        ));
    }

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(RepositoryError::validation_error(
            "email",
            "You must provide a valid email address",
        ));
    }

    for (field, value, max) in [
        ("username", username, 255),
        ("first_name", first_name, 50),
        ("last_name", last_name, 50),
    ] {
        if value.chars().count() > max {
            return Err(RepositoryError::validation_error(
                field,
                format!("Must be at most {max} characters"),
            ));
        }
    }

    Ok(CheckedUser {
        username: username.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email,
    })
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    column: user::Column,
    value: &str,
    field: &'static str,
) -> Result<(), RepositoryError> {
    let taken = User::find()
        .filter(column.eq(value))
        .count(conn)
        .await
        .map_err(RepositoryError::database_error)?
        > 0;

    if taken {
        Err(RepositoryError::Uniqueness { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_names() {
        let missing_username = NewUser::new("", "A", "B", "a@example.com", "pw");
        assert!(matches!(
            validate_new_user(&missing_username),
            Err(RepositoryError::Validation { field: "username", .. })
        ));

        let blank_first = NewUser::new("alice", "   ", "B", "a@example.com", "pw");
        assert!(matches!(
            validate_new_user(&blank_first),
            Err(RepositoryError::Validation { field: "first_name", .. })
        ));

        let missing_last = NewUser::new("alice", "A", "", "a@example.com", "pw");
        assert!(matches!(
            validate_new_user(&missing_last),
            Err(RepositoryError::Validation { field: "last_name", .. })
        ));
    }

    #[test]
    fn test_validate_email_required_and_well_formed() {
        let missing = NewUser::new("alice", "A", "B", "", "pw");
        assert!(matches!(
            validate_new_user(&missing),
            Err(RepositoryError::Validation { field: "email", .. })
        ));

        let malformed = NewUser::new("alice", "A", "B", "not-an-email", "pw");
        assert!(matches!(
            validate_new_user(&malformed),
            Err(RepositoryError::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn test_validate_normalizes_email_and_trims_names() {
        let request = NewUser::new(" alice ", " A ", "B", "ALICE@Example.com", "pw");
        let checked = validate_new_user(&request).unwrap();
        assert_eq!(checked.username, "alice");
        assert_eq!(checked.first_name, "A");
        assert_eq!(checked.email, "alice@example.com");
    }

    #[test]
    fn test_new_user_deserializes_flattened_extra_fields() {
        let request: NewUser = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Jones",
            "email": "bob@example.com",
            "password": "pw",
            "is_staff": true
        }))
        .unwrap();

        assert_eq!(request.extra.is_staff, Some(true));
        assert_eq!(request.extra.is_superuser, None);
    }
}
