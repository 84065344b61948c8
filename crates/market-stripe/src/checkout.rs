//! # Stripe Checkout Sessions
//!
//! Payment gateway implementation over Stripe's Checkout Sessions API.
//! Line items are derived from the product being purchased; one-time
//! payments only (digital goods, no subscriptions).

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use market_core::{
    CheckoutOrder, CheckoutSession, MarketError, MarketResult, PaymentGateway, CURRENCY,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Stripe Checkout Sessions gateway
///
/// Uses Stripe's hosted checkout page; the buyer is redirected to the
/// session URL and back to the success/cancel URLs afterwards.
pub struct StripeCheckout {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckout {
    /// Create a new Stripe gateway. The HTTP client carries a bounded
    /// timeout so a hung provider call fails as a network error.
    pub fn new(config: StripeConfig) -> MarketResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MarketError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> MarketResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Build line items for the Stripe API from the order
    fn build_line_items(order: &CheckoutOrder) -> Vec<StripeLineItem> {
        order
            .line_items
            .iter()
            .map(|item| StripeLineItem {
                price_data: StripePriceData {
                    currency: CURRENCY.to_string(),
                    unit_amount: item.unit_price.amount,
                    product_data: StripeProductData {
                        name: item.name.clone(),
                        description: item.description.clone(),
                        images: item.image_url.clone().map(|url| vec![url]),
                    },
                },
                quantity: item.quantity as i64,
            })
            .collect()
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckout {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> MarketResult<CheckoutSession> {
        if order.is_empty() {
            return Err(MarketError::InvalidRequest(
                "Order has no items".to_string(),
            ));
        }

        let line_items = Self::build_line_items(order);

        debug!("Creating Stripe checkout session: {} items", line_items.len());

        // Build form data for the Stripe API
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                item.price_data.currency.clone(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.price_data.unit_amount.to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.price_data.product_data.name.clone(),
            ));
            if let Some(ref desc) = item.price_data.product_data.description {
                form_params.push((
                    format!("line_items[{}][price_data][product_data][description]", i),
                    desc.clone(),
                ));
            }
            if let Some(ref images) = item.price_data.product_data.images {
                for (j, img) in images.iter().enumerate() {
                    form_params.push((
                        format!("line_items[{}][price_data][product_data][images][{}]", i, j),
                        img.clone(),
                    ));
                }
            }
            form_params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        // Metadata keys the confirmation step reconciles against
        form_params.push(("metadata[order_id]".to_string(), order.id.clone()));
        form_params.push(("metadata[buyer]".to_string(), order.buyer.clone()));
        if let Some(item) = order.line_items.first() {
            form_params.push((
                "metadata[product_id]".to_string(),
                item.product_id.to_string(),
            ));
        }

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &order.idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(MarketError::Provider {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(MarketError::Provider {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                MarketError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session_response.id, session_response.url
        );

        let expires_at = session_response
            .expires_at
            .map(|ts| DateTime::from_timestamp(ts, 0).unwrap_or(Utc::now() + Duration::hours(24)));

        Ok(CheckoutSession {
            session_id: session_response.id,
            checkout_url: session_response.url,
            expires_at,
            created_at: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct StripeLineItem {
    price_data: StripePriceData,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct StripePriceData {
    currency: String,
    unit_amount: i64,
    product_data: StripeProductData,
}

#[derive(Debug, Serialize)]
struct StripeProductData {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
