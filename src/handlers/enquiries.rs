//! # Enquiry API Handlers
//!
//! Public enquiry submission and the read-only operator listing.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::ApiError;
use crate::handlers::types::ListResponse;
use crate::models::enquiry::EnquiryListing;
use crate::repositories::{EnquiryRepository, NewEnquiry};
use crate::server::AppState;

/// Acknowledgement returned for a submitted enquiry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnquiryReceived {
    pub id: Uuid,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub received_at: DateTimeWithTimeZone,
}

/// Submit an enquiry
#[utoipa::path(
    post,
    path = "/api/v1/enquiries",
    request_body = NewEnquiry,
    responses(
        (status = 201, description = "Enquiry stored", body = EnquiryReceived),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "enquiries"
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    payload: Result<Json<NewEnquiry>, JsonRejection>,
) -> Result<(StatusCode, Json<EnquiryReceived>), ApiError> {
    let Json(request) = payload?;
    let enquiry = EnquiryRepository::new(&state.db).create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(EnquiryReceived {
            id: enquiry.id,
            received_at: enquiry.created_at,
        }),
    ))
}

/// Admin listing of enquiries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/enquiries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enquiries", body = ListResponse<EnquiryListing>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "enquiries"
)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ListResponse<EnquiryListing>>, ApiError> {
    let enquiries = EnquiryRepository::new(&state.db).list_admin().await?;
    Ok(Json(ListResponse::new(enquiries)))
}
