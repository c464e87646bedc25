//! Property view repository
//!
//! Records visitor views of a listing and keeps the listing's `views`
//! counter in step with the recorded rows.

use std::net::IpAddr;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select, Set, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ViewCountPolicy;
use crate::error::RepositoryError;
use crate::models::property::{self, Entity as Property};
use crate::models::property_view::{self, Entity as PropertyView};

/// Result of recording a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ViewOutcome {
    /// Whether this call added a view
    pub counted: bool,
    /// The listing's view counter after the call
    pub views: i32,
    /// The inserted row, when one was written
    #[serde(skip)]
    pub view: Option<property_view::Model>,
}

/// Selects the listing with `FOR UPDATE`. SQLite has no row locks and
/// serializes writers itself, so the clause is omitted there.
fn locked_listing(property_id: Uuid) -> Select<Property> {
    Property::find_by_id(property_id).lock_exclusive()
}

/// Repository for PropertyView database operations
pub struct PropertyViewRepository<'a> {
    db: &'a DatabaseConnection,
    policy: ViewCountPolicy,
}

impl<'a> PropertyViewRepository<'a> {
    pub fn new(db: &'a DatabaseConnection, policy: ViewCountPolicy) -> Self {
        Self { db, policy }
    }

    /// Record a view of `property_id` from `visitor_ip`.
    ///
    /// Under [`ViewCountPolicy::Unique`] a repeat visit from the same IP
    /// writes nothing. Otherwise a view row is inserted and the listing's
    /// counter incremented in the same transaction.
    ///
    /// The listing row stays locked until commit, so concurrent first visits
    /// from one IP are serialized and only one of them is counted.
    pub async fn record_view(
        &self,
        property_id: Uuid,
        visitor_ip: &str,
    ) -> Result<ViewOutcome, RepositoryError> {
        let ip = normalize_ip(visitor_ip)?;

        let txn = self.db.begin().await.map_err(RepositoryError::database_error)?;

        let listing = locked_listing(property_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Property not found".to_string()))?;

        if self.policy == ViewCountPolicy::Unique {
            let seen = PropertyView::find()
                .filter(property_view::Column::PropertyId.eq(property_id))
                .filter(property_view::Column::Ip.eq(ip.as_str()))
                .count(&txn)
                .await
                .map_err(RepositoryError::database_error)?
                > 0;

            if seen {
                tracing::debug!(property_id = %property_id, ip = %ip, "Repeat view ignored");
                return Ok(ViewOutcome {
                    counted: false,
                    views: listing.views,
                    view: None,
                });
            }
        }

        let now = Utc::now();
        let view = property_view::ActiveModel {
            id: Set(Uuid::new_v4()),
            ip: Set(ip),
            property_id: Set(property_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        Property::update_many()
            .col_expr(
                property::Column::Views,
                Expr::col(property::Column::Views).add(1),
            )
            .filter(property::Column::Id.eq(property_id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        let views = Property::find_by_id(property_id)
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .map_or(listing.views + 1, |updated| updated.views);

        txn.commit().await.map_err(RepositoryError::database_error)?;

        Ok(ViewOutcome {
            counted: true,
            views,
            view: Some(view),
        })
    }

    /// Number of view rows recorded for a listing
    pub async fn count_for(&self, property_id: Uuid) -> Result<u64, RepositoryError> {
        PropertyView::find()
            .filter(property_view::Column::PropertyId.eq(property_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

/// Canonical text form of a visitor IP; rejects anything that is not an
/// IPv4 or IPv6 address.
fn normalize_ip(raw: &str) -> Result<String, RepositoryError> {
    raw.trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_canonical().to_string())
        .map_err(|_| RepositoryError::validation_error("ip", "Invalid visitor IP address"))
}
