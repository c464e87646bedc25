//! # Property Repository
//!
//! Listing persistence. Every save title-cases the title, keeps the slug
//! unique and makes sure the record carries a valid, unique ref code. A save
//! runs inside one transaction: either the listing and its identifiers are
//! written together or nothing is.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::listing::{RefCodeGenerator, is_valid_ref_code, slug_candidate, slugify, title_case};
use crate::models::property::{self, AdvertType, DEFAULT_TAX, Entity as Property, PropertyType};
use crate::models::{property_view, user};
use crate::validation::{fits_decimal, is_country_code};

/// Ref code draws per save when no explicit bound is configured
pub const DEFAULT_REF_CODE_ATTEMPTS: u32 = 5;

/// Slug suffixes tried before a save gives up
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Which listings a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyScope {
    #[default]
    All,
    /// Only listings with `published_status = true`
    Published,
}

/// Input for a new listing. Omitted fields take the column defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PropertyDraft {
    #[schema(example = "cozy flat near the park")]
    pub title: String,
    pub description: String,
    #[schema(example = "RU")]
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub street_address: String,
    pub property_number: i32,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    #[schema(value_type = String, example = "0.13")]
    pub tax: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub plot_area: Decimal,
    pub total_floors: i32,
    pub bedrooms: i32,
    #[schema(value_type = String, example = "1.00")]
    pub bathrooms: Decimal,
    pub advert_type: AdvertType,
    pub property_type: PropertyType,
    pub cover_photo: Option<String>,
    pub photo1: Option<String>,
    pub photo2: Option<String>,
    pub photo3: Option<String>,
    pub photo4: Option<String>,
    pub published_status: bool,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            country: "RU".to_string(),
            city: "Moscow".to_string(),
            postal_code: "140000".to_string(),
            street_address: "Tverskaya".to_string(),
            property_number: 11,
            price: Decimal::ZERO,
            tax: DEFAULT_TAX,
            plot_area: Decimal::ZERO,
            total_floors: 0,
            bedrooms: 1,
            bathrooms: Decimal::ONE,
            advert_type: AdvertType::default(),
            property_type: PropertyType::default(),
            cover_photo: None,
            photo1: None,
            photo2: None,
            photo3: None,
            photo4: None,
            published_status: false,
        }
    }
}

impl PropertyDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn into_model(self, user_id: Uuid) -> property::Model {
        let now = Utc::now();
        property::Model {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            slug: String::new(),
            ref_code: String::new(),
            description: self.description,
            country: self.country,
            city: self.city,
            postal_code: self.postal_code,
            street_address: self.street_address,
            property_number: self.property_number,
            price: self.price,
            tax: self.tax,
            plot_area: self.plot_area,
            total_floors: self.total_floors,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            advert_type: self.advert_type,
            property_type: self.property_type,
            cover_photo: self.cover_photo,
            photo1: self.photo1,
            photo2: self.photo2,
            photo3: self.photo3,
            photo4: self.photo4,
            published_status: self.published_status,
            views: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

/// Partial update of a listing; an absent field is left as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PropertyChanges {
    /// Reassign the listing to another user
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub property_number: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub tax: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub plot_area: Option<Decimal>,
    pub total_floors: Option<i32>,
    pub bedrooms: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub bathrooms: Option<Decimal>,
    pub advert_type: Option<AdvertType>,
    pub property_type: Option<PropertyType>,
    /// `null` clears the image reference
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub cover_photo: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub photo1: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub photo2: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub photo3: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub photo4: Option<Option<String>>,
    pub published_status: Option<bool>,
}

/// A present field, `null` included, becomes `Some`; an absent one stays
/// `None` through `#[serde(default)]`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PropertyChanges {
    fn apply_to(self, model: &mut property::Model) {
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    model.$field = value;
                })*
            };
        }
        apply!(
            user_id,
            title,
            description,
            country,
            city,
            postal_code,
            street_address,
            property_number,
            price,
            tax,
            plot_area,
            total_floors,
            bedrooms,
            bathrooms,
            advert_type,
            property_type,
            published_status,
            cover_photo,
            photo1,
            photo2,
            photo3,
            photo4,
        );
    }
}

/// Repository for Property database operations
pub struct PropertyRepository<'a> {
    db: &'a DatabaseConnection,
    ref_codes: Arc<dyn RefCodeGenerator>,
    ref_code_max_attempts: u32,
}

impl<'a> PropertyRepository<'a> {
    pub fn new(db: &'a DatabaseConnection, ref_codes: Arc<dyn RefCodeGenerator>) -> Self {
        Self {
            db,
            ref_codes,
            ref_code_max_attempts: DEFAULT_REF_CODE_ATTEMPTS,
        }
    }

    /// Bound the number of ref codes drawn per save (at least one).
    pub fn with_ref_code_attempts(mut self, attempts: u32) -> Self {
        self.ref_code_max_attempts = attempts.max(1);
        self
    }

    /// Listings in `scope`, newest first.
    pub async fn list(&self, scope: PropertyScope) -> Result<Vec<property::Model>, RepositoryError> {
        let mut query = Property::find();
        if scope == PropertyScope::Published {
            query = query.filter(property::Column::PublishedStatus.eq(true));
        }

        query
            .order_by_desc(property::Column::CreatedAt)
            .order_by_asc(property::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_published(&self) -> Result<Vec<property::Model>, RepositoryError> {
        self.list(PropertyScope::Published).await
    }

    pub async fn list_all(&self) -> Result<Vec<property::Model>, RepositoryError> {
        self.list(PropertyScope::All).await
    }

    /// Get property by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<property::Model>, RepositoryError> {
        Property::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<property::Model>, RepositoryError> {
        Property::find()
            .filter(property::Column::Slug.eq(slug))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create a listing owned by `user_id`.
    pub async fn create(
        &self,
        user_id: Uuid,
        draft: PropertyDraft,
    ) -> Result<property::Model, RepositoryError> {
        self.save(draft.into_model(user_id)).await
    }

    /// Apply `changes` to an existing listing and save it.
    pub async fn update(
        &self,
        id: Uuid,
        changes: PropertyChanges,
    ) -> Result<property::Model, RepositoryError> {
        let mut model = self
            .get(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Property not found".to_string()))?;
        changes.apply_to(&mut model);
        self.save(model).await
    }

    /// Validate and persist `model`, inserting it when its id is new.
    ///
    /// The slug is derived from the title on insert and whenever the
    /// title-cased title changes. An existing valid ref code is kept; a
    /// missing or malformed one is replaced with a fresh unique code.
    pub async fn save(&self, mut model: property::Model) -> Result<property::Model, RepositoryError> {
        normalize_and_validate(&mut model)?;

        let txn = self.db.begin().await.map_err(RepositoryError::database_error)?;

        let owner_exists = user::Entity::find_by_id(model.user_id)
            .count(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            > 0;
        if !owner_exists {
            return Err(RepositoryError::validation_error(
                "user_id",
                "Owner does not exist",
            ));
        }

        let existing = Property::find_by_id(model.id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        let title_changed = existing
            .as_ref()
            .is_none_or(|current| current.title != model.title);
        if title_changed || model.slug.is_empty() {
            model.slug = unique_slug(&txn, &model.title, model.id).await?;
        }

        if !is_valid_ref_code(&model.ref_code) || ref_code_taken(&txn, &model.ref_code, model.id).await? {
            model.ref_code = self.unique_ref_code(&txn, model.id).await?;
        }

        model.updated_at = Utc::now().into();

        let saved = match existing {
            None => {
                let active = model.into_active_model().reset_all();
                active
                    .insert(&txn)
                    .await
                    .map_err(RepositoryError::database_error)?
            }
            Some(_) => {
                let mut active = model.into_active_model().reset_all();
                // Views are only moved by the view recorder.
                active.views = NotSet;
                active.created_at = NotSet;
                active
                    .update(&txn)
                    .await
                    .map_err(RepositoryError::database_error)?
            }
        };

        txn.commit().await.map_err(RepositoryError::database_error)?;

        tracing::info!(
            property_id = %saved.id,
            slug = %saved.slug,
            ref_code = %saved.ref_code,
            "Saved property"
        );
        Ok(saved)
    }

    /// Delete a listing together with its recorded views.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await.map_err(RepositoryError::database_error)?;

        let exists = Property::find_by_id(id)
            .count(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            > 0;
        if !exists {
            return Err(RepositoryError::NotFound("Property not found".to_string()));
        }

        property_view::Entity::delete_many()
            .filter(property_view::Column::PropertyId.eq(id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        Property::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit().await.map_err(RepositoryError::database_error)?;

        tracing::info!(property_id = %id, "Deleted property");
        Ok(())
    }

    async fn unique_ref_code<C: ConnectionTrait>(
        &self,
        conn: &C,
        property_id: Uuid,
    ) -> Result<String, RepositoryError> {
        for attempt in 1..=self.ref_code_max_attempts {
            let code = self.ref_codes.next_code();
            if !is_valid_ref_code(&code) {
                tracing::warn!(attempt, "Ref code generator produced a malformed code");
                continue;
            }
            if !ref_code_taken(conn, &code, property_id).await? {
                return Ok(code);
            }
            tracing::debug!(attempt, code = %code, "Ref code collision, drawing again");
        }

        tracing::warn!(
            attempts = self.ref_code_max_attempts,
            "Exhausted ref code attempts"
        );
        Err(RepositoryError::Uniqueness { field: "ref_code" })
    }
}

async fn ref_code_taken<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    property_id: Uuid,
) -> Result<bool, RepositoryError> {
    let count = Property::find()
        .filter(property::Column::RefCode.eq(code))
        .filter(property::Column::Id.ne(property_id))
        .count(conn)
        .await
        .map_err(RepositoryError::database_error)?;
    Ok(count > 0)
}

async fn unique_slug<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    property_id: Uuid,
) -> Result<String, RepositoryError> {
    let base = slugify(title);

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = slug_candidate(&base, attempt);
        let taken = Property::find()
            .filter(property::Column::Slug.eq(candidate.as_str()))
            .filter(property::Column::Id.ne(property_id))
            .count(conn)
            .await
            .map_err(RepositoryError::database_error)?
            > 0;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(RepositoryError::Uniqueness { field: "slug" })
}

fn normalize_and_validate(model: &mut property::Model) -> Result<(), RepositoryError> {
    let title = title_case(model.title.trim());
    if title.is_empty() {
        return Err(RepositoryError::validation_error(
            "title",
            "Property title is required",
        ));
    }
    model.title = title;

    let country = model.country.trim().to_ascii_uppercase();
    if !is_country_code(&country) {
        return Err(RepositoryError::validation_error(
            "country",
            "Country must be a two-letter ISO 3166 code",
        ));
    }
    model.country = country;

    for (field, value, max) in [
        ("title", model.title.as_str(), 250),
        ("city", model.city.as_str(), 180),
        ("postal_code", model.postal_code.as_str(), 100),
        ("street_address", model.street_address.as_str(), 180),
    ] {
        if value.chars().count() > max {
            return Err(RepositoryError::validation_error(
                field,
                format!("Must be at most {max} characters"),
            ));
        }
    }

    if model.property_number < 1 {
        return Err(RepositoryError::validation_error(
            "property_number",
            "Must be at least 1",
        ));
    }
    if model.bedrooms < 0 {
        return Err(RepositoryError::validation_error(
            "bedrooms",
            "Must not be negative",
        ));
    }
    if model.total_floors < 0 {
        return Err(RepositoryError::validation_error(
            "total_floors",
            "Must not be negative",
        ));
    }

    for (field, value, max_digits, places) in [
        ("price", model.price, 8, 2),
        ("tax", model.tax, 6, 2),
        ("plot_area", model.plot_area, 8, 2),
        ("bathrooms", model.bathrooms, 4, 2),
    ] {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RepositoryError::validation_error(
                field,
                "Must not be negative",
            ));
        }
        if !fits_decimal(value, max_digits, places) {
            return Err(RepositoryError::validation_error(
                field,
                format!(
                    "Must have at most {max_digits} digits with {places} decimal places"
                ),
            ));
        }
    }

    Ok(())
}
