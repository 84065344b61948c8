//! # Payment Gateway Trait
//!
//! Seam between the marketplace and the payment provider. The server
//! wires in the Stripe implementation; tests substitute a stub.

use crate::error::MarketResult;
use crate::order::{CheckoutOrder, CheckoutSession};
use async_trait::async_trait;
use std::sync::Arc;

/// A payment provider able to host a checkout for an order.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for `order`.
    ///
    /// Provider failures surface as typed errors (`Provider`, `Network`),
    /// never as a raw transport panic or a silent success.
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> MarketResult<CheckoutSession>;

    /// Provider name, for logging
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// URLs the provider redirects the buyer back to
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the application (e.g., "https://vendio.example")
    pub base_url: String,
    pub success_path: String,
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            success_path: "/checkout/success".to_string(),
            cancel_path: "/checkout/cancel".to_string(),
        }
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }

    /// Success URL carrying the provider's session-id placeholder, so the
    /// confirmation step can reconcile the pending order.
    pub fn success_url_with_session(&self) -> String {
        format!(
            "{}{}?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url, self.success_path
        )
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
