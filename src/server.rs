//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Estates API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers::{self, enquiries, properties, users};
use crate::listing::{RandomRefCodes, RefCodeGenerator};
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    /// Source of listing reference codes
    pub ref_codes: Arc<dyn RefCodeGenerator>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            config,
            ref_codes: Arc::new(RandomRefCodes),
        }
    }

    /// Replace the ref code source, e.g. with a seeded generator in tests.
    pub fn with_ref_codes(mut self, ref_codes: Arc<dyn RefCodeGenerator>) -> Self {
        self.ref_codes = ref_codes;
        self
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/properties", get(properties::list_published))
        .route("/api/v1/properties/{slug}", get(properties::get_property))
        .route("/api/v1/enquiries", post(enquiries::create_enquiry));

    let operator = Router::new()
        .route(
            "/api/v1/admin/properties",
            get(properties::list_all).post(properties::create_property),
        )
        .route(
            "/api/v1/admin/properties/{id}",
            patch(properties::update_property).delete(properties::delete_property),
        )
        .route("/api/v1/admin/users", post(users::create_user))
        .route("/api/v1/admin/enquiries", get(enquiries::list_enquiries))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    public
        .merge(operator)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let profile = config.profile.clone();
    let state = AppState::new(db, Arc::new(config));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::properties::list_published,
        crate::handlers::properties::list_all,
        crate::handlers::properties::get_property,
        crate::handlers::properties::create_property,
        crate::handlers::properties::update_property,
        crate::handlers::properties::delete_property,
        crate::handlers::users::create_user,
        crate::handlers::enquiries::create_enquiry,
        crate::handlers::enquiries::list_enquiries,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::error::ApiError,
            crate::models::property::PropertyResponse,
            crate::models::property::AdvertType,
            crate::models::property::PropertyType,
            crate::handlers::properties::CreatePropertyRequest,
            crate::repositories::PropertyDraft,
            crate::repositories::PropertyChanges,
            crate::models::user::UserResponse,
            crate::repositories::NewUser,
            crate::repositories::ExtraFields,
            crate::repositories::NewEnquiry,
            crate::models::enquiry::EnquiryListing,
            crate::handlers::enquiries::EnquiryReceived,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "properties", description = "Property listings"),
        (name = "users", description = "User accounts"),
        (name = "enquiries", description = "Inbound enquiries"),
    ),
    info(
        title = "Estates API",
        description = "Real-estate listings, user accounts and enquiries",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
