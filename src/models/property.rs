//! Property entity model
//!
//! Listing records with pricing, location, media references and a view
//! counter. Slug and ref code are assigned by
//! [`crate::repositories::PropertyRepository`] when the record is saved.

use rust_decimal::Decimal;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default property tax rate (13%)
pub const DEFAULT_TAX: Decimal = Decimal::from_parts(13, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Agent, seller or buyer that owns the listing
    pub user_id: Uuid,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    /// Ten upper-case alphanumeric characters
    #[sea_orm(unique)]
    pub ref_code: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,

    pub city: String,

    pub postal_code: String,

    pub street_address: String,

    pub property_number: i32,

    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub price: Decimal,

    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub tax: Decimal,

    /// Plot area in square metres
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub plot_area: Decimal,

    pub total_floors: i32,

    pub bedrooms: i32,

    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub bathrooms: Decimal,

    pub advert_type: AdvertType,

    pub property_type: PropertyType,

    pub cover_photo: Option<String>,

    pub photo1: Option<String>,

    pub photo2: Option<String>,

    pub photo3: Option<String>,

    pub photo4: Option<String>,

    pub published_status: bool,

    pub views: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AdvertType {
    #[sea_orm(string_value = "For Sale")]
    #[serde(rename = "For Sale")]
    #[default]
    ForSale,

    #[sea_orm(string_value = "For Rent")]
    #[serde(rename = "For Rent")]
    ForRent,

    #[sea_orm(string_value = "Auction")]
    #[serde(rename = "Auction")]
    Auction,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PropertyType {
    #[sea_orm(string_value = "House")]
    #[serde(rename = "House")]
    House,

    #[sea_orm(string_value = "Apartment")]
    #[serde(rename = "Apartment")]
    Apartment,

    #[sea_orm(string_value = "Office")]
    #[serde(rename = "Office")]
    Office,

    #[sea_orm(string_value = "Warehouse")]
    #[serde(rename = "Warehouse")]
    Warehouse,

    #[sea_orm(string_value = "Commercial")]
    #[serde(rename = "Commercial")]
    Commercial,

    #[sea_orm(string_value = "Other")]
    #[serde(rename = "Other")]
    #[default]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "NoAction"
    )]
    User,

    #[sea_orm(has_many = "super::property_view::Entity")]
    PropertyView,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::property_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyView.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Tax-inclusive price: `round(price + round(price * tax, 2), 2)`.
///
/// Rounding is half-to-even at two decimal places.
pub fn final_price(price: Decimal, tax: Decimal) -> Decimal {
    let tax_amount = (price * tax).round_dp(2);
    (price + tax_amount).round_dp(2)
}

impl Model {
    /// Tax-inclusive price of this listing; does not touch the store.
    pub fn final_price(&self) -> Decimal {
        final_price(self.price, self.tax)
    }

    /// Image references that are set, cover photo first.
    pub fn photos(&self) -> Vec<&str> {
        [
            &self.cover_photo,
            &self.photo1,
            &self.photo2,
            &self.photo3,
            &self.photo4,
        ]
        .into_iter()
        .filter_map(|photo| photo.as_deref())
        .collect()
    }
}

/// Public representation of a listing for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub ref_code: String,
    pub description: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub street_address: String,
    pub property_number: i32,
    pub price: Decimal,
    pub tax: Decimal,
    /// Price including tax
    pub final_price: Decimal,
    pub plot_area: Decimal,
    pub total_floors: i32,
    pub bedrooms: i32,
    pub bathrooms: Decimal,
    pub advert_type: AdvertType,
    pub property_type: PropertyType,
    pub cover_photo: Option<String>,
    pub photo1: Option<String>,
    pub photo2: Option<String>,
    pub photo3: Option<String>,
    pub photo4: Option<String>,
    pub published_status: bool,
    pub views: i32,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub created_at: DateTimeWithTimeZone,
    #[schema(value_type = String, example = "2025-01-01T12:05:00Z")]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for PropertyResponse {
    fn from(model: Model) -> Self {
        Self {
            final_price: model.final_price(),
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            slug: model.slug,
            ref_code: model.ref_code,
            description: model.description,
            country: model.country,
            city: model.city,
            postal_code: model.postal_code,
            street_address: model.street_address,
            property_number: model.property_number,
            price: model.price,
            tax: model.tax,
            plot_area: model.plot_area,
            total_floors: model.total_floors,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            advert_type: model.advert_type,
            property_type: model.property_type,
            cover_photo: model.cover_photo,
            photo1: model.photo1,
            photo2: model.photo2,
            photo3: model.photo3,
            photo4: model.photo4,
            published_status: model.published_status,
            views: model.views,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_final_price_adds_rounded_tax() {
        assert_eq!(final_price(dec("100.00"), dec("0.13")), dec("113.00"));
        assert_eq!(final_price(dec("0.00"), dec("0.13")), dec("0.00"));
        assert_eq!(final_price(dec("250000.00"), dec("0.00")), dec("250000.00"));
    }

    #[test]
    fn test_final_price_rounds_tax_half_to_even() {
        // 0.50 * 0.13 = 0.065 -> 0.06
        assert_eq!(final_price(dec("0.50"), dec("0.13")), dec("0.56"));
        // 1.50 * 0.13 = 0.195 -> 0.20
        assert_eq!(final_price(dec("1.50"), dec("0.13")), dec("1.70"));
        // 12.35 * 0.13 = 1.6055 -> 1.61
        assert_eq!(final_price(dec("12.35"), dec("0.13")), dec("13.96"));
    }

    #[test]
    fn test_final_price_matches_formula_for_sample_prices() {
        for raw in ["0.01", "9.99", "1234.56", "99999.99", "999999.99"] {
            let price = dec(raw);
            let expected = (price + (price * DEFAULT_TAX).round_dp(2)).round_dp(2);
            assert_eq!(final_price(price, DEFAULT_TAX), expected);
            assert!(final_price(price, DEFAULT_TAX).scale() <= 2);
        }
    }

    #[test]
    fn test_default_tax_is_thirteen_percent() {
        assert_eq!(DEFAULT_TAX, dec("0.13"));
    }

    #[test]
    fn test_default_enum_values() {
        assert_eq!(AdvertType::default(), AdvertType::ForSale);
        assert_eq!(PropertyType::default(), PropertyType::Other);
        assert_eq!(
            serde_json::to_string(&AdvertType::ForRent).unwrap(),
            "\"For Rent\""
        );
    }
}
