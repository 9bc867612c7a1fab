pub mod db;
pub mod entities;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
// Conditionally import SwaggerUi only when needed (not test)
#[cfg(not(test))]
use utoipa_swagger_ui::SwaggerUi;
// Conditionally import CORS only when needed (not test)
#[cfg(not(test))]
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use routes::scholarship::{
    create_scholarship, create_scholarships_bulk, delete_scholarship, list_scholarships,
    read_scholarship, update_scholarship,
};

/// Shared handler state: the pooled database connection.
///
/// The connection sits behind an `Arc` because axum requires `Clone` state
/// and `DatabaseConnection` does not implement it under every feature set.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up")
    )
)]
async fn read_root() -> Json<Value> {
    Json(json!({ "message": "It Works!" }))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scholarship Tracker API",
        version = "0.1.0",
    ),
    paths(
        read_root,
        routes::scholarship::create_scholarship,
        routes::scholarship::create_scholarships_bulk,
        routes::scholarship::list_scholarships,
        routes::scholarship::read_scholarship,
        routes::scholarship::update_scholarship,
        routes::scholarship::delete_scholarship,
    ),
    components(schemas(
        routes::scholarship::ScholarshipCreate,
        routes::scholarship::ScholarshipUpdate,
        routes::scholarship::ScholarshipRead,
        routes::scholarship::ListQuery,
        routes::scholarship::BulkCreateResponse,
        routes::scholarship::BulkSummary,
        routes::scholarship::SkippedScholarship,
    ))
)]
struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(db: DatabaseConnection) -> Router {
    let state = AppState { db: Arc::new(db) };

    // Build our API documentation (needed regardless for ApiDoc::openapi())
    let api_doc = ApiDoc::openapi();

    // --- Define API routes separately ---
    let api_routes = Router::new()
        .route("/", get(read_root))
        .route(
            "/scholarships/",
            post(create_scholarship).get(list_scholarships),
        )
        .route("/scholarships/bulk", post(create_scholarships_bulk))
        .route(
            "/scholarships/{id}",
            get(read_scholarship)
                .put(update_scholarship)
                .delete(delete_scholarship),
        )
        .with_state(state);

    // --- Conditionally add Swagger UI only when NOT running tests ---
    #[cfg(not(test))]
    let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc);
    #[cfg(test)]
    let docs_router = {
        let _ = api_doc;
        Router::new()
    };

    // --- Build the final application router ---
    #[allow(unused_mut)]
    let mut app = Router::new().merge(api_routes).merge(docs_router);

    // --- Apply CORS to the whole app (all origins, there is no auth) ---
    #[cfg(not(test))]
    {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
}
