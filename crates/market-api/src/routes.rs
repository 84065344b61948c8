//! # Routes
//!
//! Axum router configuration for the marketplace.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /                       - Paginated active-product listing
/// - POST /                       - Create a product (authenticated, multipart)
/// - GET  /products/mine          - Products owned by the requester
/// - GET  /products/{slug}        - Public product detail
/// - GET  /products/{id}/edit     - Edit form state (owner only)
/// - POST /products/{id}/edit     - Submit product update (owner only)
/// - POST /checkout               - Create a payment session
/// - GET  /checkout/success       - Confirm payment, grant library access
/// - GET  /checkout/cancel        - Cancel landing page
/// - GET  /library/{username}     - The requester's purchased-product library
/// - GET  /health                 - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::home).post(handlers::create_product))
        .route("/health", get(handlers::health))
        .route("/products/mine", get(handlers::my_products))
        .route("/products/{slug}", get(handlers::product_detail))
        .route(
            "/products/{id}/edit",
            get(handlers::edit_form).post(handlers::update_product),
        )
        .route("/checkout", post(handlers::create_checkout))
        .route("/checkout/success", get(handlers::checkout_success))
        .route("/checkout/cancel", get(handlers::checkout_cancel))
        .route("/library/{username}", get(handlers::library_view))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
