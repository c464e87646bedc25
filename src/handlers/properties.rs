//! # Property API Handlers
//!
//! Public listing reads plus the operator endpoints that create, update and
//! delete listings.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::{ApiError, RepositoryError};
use crate::handlers::types::{ClientIp, ListResponse};
use crate::models::property::PropertyResponse;
use crate::repositories::{
    PropertyChanges, PropertyDraft, PropertyRepository, PropertyScope, PropertyViewRepository,
};
use crate::server::AppState;

/// Request payload for creating a listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePropertyRequest {
    /// Owner of the listing (agent, seller or buyer)
    pub user_id: Uuid,
    #[serde(flatten)]
    pub draft: PropertyDraft,
}

fn property_repository(state: &AppState) -> PropertyRepository<'_> {
    PropertyRepository::new(&state.db, state.ref_codes.clone())
        .with_ref_code_attempts(state.config.ref_code_max_attempts)
}

async fn list(state: &AppState, scope: PropertyScope) -> Result<Json<ListResponse<PropertyResponse>>, ApiError> {
    let properties = property_repository(state).list(scope).await?;
    Ok(Json(ListResponse::new(
        properties.into_iter().map(PropertyResponse::from).collect(),
    )))
}

/// List published listings
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    responses(
        (status = 200, description = "Published listings, newest first", body = ListResponse<PropertyResponse>),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn list_published(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<PropertyResponse>>, ApiError> {
    list(&state, PropertyScope::Published).await
}

/// List every listing, published or not
#[utoipa::path(
    get,
    path = "/api/v1/admin/properties",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All listings, newest first", body = ListResponse<PropertyResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn list_all(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ListResponse<PropertyResponse>>, ApiError> {
    list(&state, PropertyScope::All).await
}

/// Fetch a published listing by slug and record a view for the caller
#[utoipa::path(
    get,
    path = "/api/v1/properties/{slug}",
    params(
        ("slug" = String, Path, description = "Listing slug")
    ),
    responses(
        (status = 200, description = "Listing with tax-inclusive price", body = PropertyResponse),
        (status = 404, description = "Listing not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Path(slug): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let property = property_repository(&state)
        .get_by_slug(&slug)
        .await?
        .filter(|property| property.published_status)
        .ok_or_else(|| RepositoryError::NotFound("Property not found".to_string()))?;

    let mut response = PropertyResponse::from(property);

    if let Some(ip) = client_ip {
        let views = PropertyViewRepository::new(&state.db, state.config.view_count_policy);
        match views.record_view(response.id, &ip).await {
            Ok(outcome) => response.views = outcome.views,
            Err(RepositoryError::Validation { message, .. }) => {
                tracing::warn!(ip = %ip, reason = %message, "View not recorded");
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        tracing::debug!(slug = %slug, "No client address; view not recorded");
    }

    Ok(Json(response))
}

/// Create a listing
#[utoipa::path(
    post,
    path = "/api/v1/admin/properties",
    security(("bearer_auth" = [])),
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Listing created", body = PropertyResponse, headers(
            ("Location", description = "URL of the created listing")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Slug or ref code could not be made unique", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    payload: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, [(&'static str, String); 1], Json<PropertyResponse>), ApiError> {
    let Json(request) = payload?;

    let property = property_repository(&state)
        .create(request.user_id, request.draft)
        .await?;

    let location = format!("/api/v1/properties/{}", property.slug);
    Ok((
        StatusCode::CREATED,
        [("Location", location)],
        Json(PropertyResponse::from(property)),
    ))
}

/// Update a listing
#[utoipa::path(
    patch,
    path = "/api/v1/admin/properties/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Listing UUID")
    ),
    request_body = PropertyChanges,
    responses(
        (status = 200, description = "Listing updated", body = PropertyResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Listing not found", body = ApiError),
        (status = 409, description = "Slug could not be made unique", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn update_property(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(id): Path<Uuid>,
    payload: Result<Json<PropertyChanges>, JsonRejection>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let Json(changes) = payload?;
    let property = property_repository(&state).update(id, changes).await?;
    Ok(Json(PropertyResponse::from(property)))
}

/// Delete a listing and its recorded views
#[utoipa::path(
    delete,
    path = "/api/v1/admin/properties/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Listing UUID")
    ),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Listing not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    property_repository(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
