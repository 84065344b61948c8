//! # Request Handlers
//!
//! Axum request handlers for the marketplace: listing, authoring,
//! product detail, checkout initiation, and the per-user library.

use crate::auth::{OptionalAuth, RequireAuth};
use crate::state::AppState;
use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use market_core::{
    page_of_active, CheckoutOrder, MarketError, MarketResult, PendingOrder, Product, ProductDraft,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path as FsPath;
use tracing::{error, info, instrument};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Slug of the product being purchased
    pub slug: String,
}

/// Create checkout response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    /// Provider session id
    pub id: String,
    /// Hosted checkout URL (redirect the buyer here)
    pub checkout_url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn market_error_to_response(err: MarketError) -> ApiError {
    let code = err.status_code();
    let response = match &err {
        // Ownership misses must read exactly like absence.
        MarketError::Forbidden => ErrorResponse::new("not found", code),
        // Provider detail is logged server-side only.
        MarketError::Provider { .. } | MarketError::Network(_) => {
            error!("payment provider failure: {}", err);
            ErrorResponse::new("payment provider unavailable", code)
        }
        MarketError::Validation { field, message } => {
            ErrorResponse::new(message.clone(), code).with_field(field.clone())
        }
        other => ErrorResponse::new(other.to_string(), code),
    };
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Multipart form handling
// =============================================================================

/// Read the submitted product form. File fields (thumbnail, content_file)
/// are written to the upload directory and replaced by their stored
/// filenames before validation.
async fn draft_from_multipart(
    mut multipart: Multipart,
    upload_dir: &FsPath,
) -> MarketResult<ProductDraft> {
    let mut draft = ProductDraft::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MarketError::InvalidRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = field_text(field).await?,
            "description" => draft.description = field_text(field).await?,
            "slug" => draft.slug = field_text(field).await?,
            "content_url" => {
                let value = field_text(field).await?;
                if !value.trim().is_empty() {
                    draft.content_url = Some(value.trim().to_string());
                }
            }
            "price" => {
                let value = field_text(field).await?;
                draft.price = value
                    .trim()
                    .parse()
                    .map_err(|_| MarketError::validation("price", "must be a number"))?;
            }
            "active" => {
                let value = field_text(field).await?;
                draft.active = matches!(value.trim(), "on" | "true" | "1");
            }
            "thumbnail" => draft.thumbnail = store_upload(field, upload_dir).await?,
            "content_file" => draft.content_file = store_upload(field, upload_dir).await?,
            _ => {}
        }
    }

    Ok(draft)
}

async fn field_text(field: Field<'_>) -> MarketResult<String> {
    field
        .text()
        .await
        .map_err(|e| MarketError::InvalidRequest(e.to_string()))
}

/// Strip any path components from a client-supplied filename.
/// Browsers send bare names, but nothing stops a crafted request from
/// sending `../x` or `a/b`; only the final component is kept.
fn upload_basename(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Persist an uploaded file under a uuid-prefixed name; empty file
/// fields (no filename or no bytes) resolve to None.
async fn store_upload(field: Field<'_>, upload_dir: &FsPath) -> MarketResult<Option<String>> {
    let original = match field.file_name().and_then(upload_basename) {
        Some(name) => name,
        None => return Ok(None),
    };

    let bytes = field
        .bytes()
        .await
        .map_err(|e| MarketError::InvalidRequest(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let stored = format!("{}-{}", Uuid::new_v4(), original);
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| MarketError::Internal(format!("upload dir: {}", e)))?;
    tokio::fs::write(upload_dir.join(&stored), &bytes)
        .await
        .map_err(|e| MarketError::Internal(format!("upload write: {}", e)))?;

    Ok(Some(stored))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "vendio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Paginated active-product listing.
///
/// `?page=` values that fail to parse default to page 1; out-of-range
/// pages clamp. `products` is null when no active products exist at all.
#[instrument(skip(state, params))]
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let page = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let products = page_of_active(state.catalog.as_ref(), page).await;

    Json(serde_json::json!({ "products": products }))
}

/// Create a product owned by the authenticated requester
#[instrument(skip(state, user, multipart), fields(owner = %user.0.username))]
pub async fn create_product(
    State(state): State<AppState>,
    user: RequireAuth,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let draft = draft_from_multipart(multipart, &state.config.upload_dir)
        .await
        .map_err(market_error_to_response)?;

    let product = draft
        .build(&user.0.username)
        .map_err(market_error_to_response)?;

    let product = state
        .catalog
        .insert(product)
        .await
        .map_err(market_error_to_response)?;

    info!("Created product: slug={}, owner={}", product.slug, product.owner);

    Ok(Redirect::to("/"))
}

/// Products owned by the authenticated requester
pub async fn my_products(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let products = state.catalog.list_by_owner(&user.username).await;
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Current form state for editing an owned product.
/// A product owned by someone else reads as not found.
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .catalog
        .get_by_id(id)
        .await
        .map_err(market_error_to_response)?;

    if product.owner != user.username {
        return Err(market_error_to_response(MarketError::Forbidden));
    }

    Ok(Json(product))
}

/// Submit an update for an owned product
#[instrument(skip(state, user, multipart), fields(owner = %user.0.username, id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    user: RequireAuth,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let draft = draft_from_multipart(multipart, &state.config.upload_dir)
        .await
        .map_err(market_error_to_response)?;

    let product = state
        .catalog
        .update(&user.0.username, id, draft)
        .await
        .map_err(market_error_to_response)?;

    info!("Updated product: slug={}", product.slug);

    Ok(Redirect::to("/products/mine"))
}

/// Public product detail page data. Carries the Stripe publishable key
/// for client-side checkout initiation, and an `editable` flag when the
/// viewer happens to be the owner.
pub async fn product_detail(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .get_by_slug(&slug)
        .await
        .map_err(market_error_to_response)?;

    let editable = viewer.is_some_and(|user| user.username == product.owner);

    Ok(Json(serde_json::json!({
        "product": product,
        "editable": editable,
        "stripe_public_key": state.publishable_key
    })))
}

/// Create a payment session for a specific product and persist the
/// pending order keyed by session id.
#[instrument(skip(state, user, request), fields(buyer = %user.0.username, slug = %request.slug))]
pub async fn create_checkout(
    State(state): State<AppState>,
    user: RequireAuth,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let product = state
        .catalog
        .get_by_slug(&request.slug)
        .await
        .map_err(market_error_to_response)?;

    if !product.active {
        return Err(market_error_to_response(MarketError::InvalidRequest(
            format!("Product is not available: {}", request.slug),
        )));
    }

    let buyer = &user.0.username;
    let order = CheckoutOrder::for_product(&product, buyer);

    info!(
        "Creating checkout: product={}, total={}",
        product.slug,
        order.total().display()
    );

    let session = state
        .gateway
        .create_checkout(
            &order,
            &state.urls.success_url_with_session(),
            &state.urls.cancel_url(),
        )
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            market_error_to_response(e)
        })?;

    state
        .orders
        .insert(PendingOrder::new(&session, &product, buyer))
        .await
        .map_err(market_error_to_response)?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CreateCheckoutResponse {
        id: session.session_id,
        checkout_url: session.checkout_url,
    }))
}

/// Checkout success landing. Completes the pending order for the
/// returned session id and grants the product into the buyer's library
/// (idempotent).
#[instrument(skip(state, params))]
pub async fn checkout_success(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let session_id = params.get("session_id").ok_or_else(|| {
        market_error_to_response(MarketError::InvalidRequest(
            "missing session_id".to_string(),
        ))
    })?;

    let order = state
        .orders
        .complete(session_id)
        .await
        .map_err(market_error_to_response)?;

    state
        .library
        .grant(&order.buyer, order.product_id)
        .await
        .map_err(market_error_to_response)?;

    info!(
        "Completed order: session={}, buyer={}, product={}",
        order.session_id, order.buyer, order.product_id
    );

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 20vh;">
    <h1>Payment successful</h1>
    <p>Session: <code>{}</code></p>
    <p>Your purchase has been added to your library.</p>
</body>
</html>
"#,
        order.session_id
    )))
}

/// Checkout cancel landing
pub async fn checkout_cancel() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Cancelled</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 20vh;">
    <h1>Payment cancelled</h1>
    <p>No charges were made.</p>
</body>
</html>
"#,
    )
}

/// The requester's purchased-product library. A user may only view
/// their own; anyone else's reads as not found.
pub async fn library_view(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if user.username != username {
        return Err(market_error_to_response(MarketError::Forbidden));
    }

    let library = state
        .library
        .library_for(&username)
        .await
        .ok_or_else(|| market_error_to_response(MarketError::not_found("library")))?;

    // Resolve stored ids to product views; ids whose product has gone
    // missing are skipped rather than failing the page.
    let mut products = Vec::with_capacity(library.products.len());
    for id in &library.products {
        if let Ok(product) = state.catalog.get_by_id(*id).await {
            products.push(product);
        }
    }

    Ok(Json(serde_json::json!({
        "username": library.username,
        "products": products
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let err = ErrorResponse::new("Test error", 400).with_field("slug");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.field.as_deref(), Some("slug"));
    }

    #[test]
    fn test_forbidden_renders_as_not_found() {
        let (status, Json(body)) = market_error_to_response(MarketError::Forbidden);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "not found");
    }

    #[test]
    fn test_provider_detail_is_not_exposed() {
        let (status, Json(body)) = market_error_to_response(MarketError::Provider {
            provider: "stripe".into(),
            message: "secret internal detail".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.error.contains("secret"));
    }

    #[test]
    fn test_upload_basename_strips_path_components() {
        assert_eq!(upload_basename("pack.zip").as_deref(), Some("pack.zip"));
        assert_eq!(
            upload_basename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            upload_basename("a\\b\\c.png").as_deref(),
            Some("c.png")
        );
        assert_eq!(upload_basename(""), None);
        assert_eq!(upload_basename("dir/"), None);
        assert_eq!(upload_basename(".."), None);
    }

    #[test]
    fn test_validation_carries_field() {
        let (status, Json(body)) =
            market_error_to_response(MarketError::validation("price", "must be a number"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.field.as_deref(), Some("price"));
    }
}
