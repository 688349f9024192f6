pub mod auth;
mod error;
mod products;
mod validation;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::AppState;

/// Maximum multipart body size (product image uploads)
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    // Product routes: browsing is public, mutations check the bearer token
    // and admin role in the handlers
    let product_routes = Router::new()
        .route("/", get(products::list_products))
        .route("/", post(products::create_product))
        .route("/:id", get(products::get_product))
        .route("/:id", put(products::update_product))
        .route("/:id", delete(products::delete_product))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/products", product_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
