//! # market-api
//!
//! HTTP API layer for the vendio marketplace.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Listing, authoring, detail, checkout, and library endpoints
//! - Bearer-token auth extractors
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Paginated active-product listing |
//! | POST | `/` | Create a product (multipart) |
//! | GET | `/products/mine` | Products owned by the requester |
//! | GET | `/products/{slug}` | Public product detail |
//! | GET/POST | `/products/{id}/edit` | Edit an owned product |
//! | POST | `/checkout` | Create a checkout session |
//! | GET | `/checkout/success` | Confirm payment, grant library access |
//! | GET | `/library/{username}` | Purchased-product library |
//! | GET | `/health` | Health check |

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
