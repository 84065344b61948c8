//! # Orders and Checkout Sessions
//!
//! The order handed to the payment gateway, the ephemeral session it
//! returns, and the locally persisted pending-order record that keys
//! payment reconciliation by session id.

use crate::error::{MarketError, MarketResult};
use crate::product::{Price, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// A line item in a checkout order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: Uuid,

    /// Product name (denormalized for the provider's checkout page)
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price in cents
    pub unit_price: Price,

    pub quantity: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// Create a line item from a product
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            description: if product.description.is_empty() {
                None
            } else {
                Some(product.description.clone())
            },
            unit_price: product.price,
            quantity,
            image_url: product.thumbnail.clone(),
        }
    }

    /// Total price for this line item
    pub fn total(&self) -> Price {
        Price::from_cents(self.unit_price.amount * self.quantity as i64)
    }
}

/// An order to be checked out, derived from the actual product being
/// purchased rather than any fixed line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    /// Unique order ID (generated)
    pub id: String,

    pub line_items: Vec<LineItem>,

    /// Username of the purchasing user
    pub buyer: String,

    /// Idempotency key (prevents duplicate charges)
    pub idempotency_key: String,

    pub created_at: DateTime<Utc>,
}

impl CheckoutOrder {
    /// Build a single-product order for `buyer`
    pub fn for_product(product: &Product, buyer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            line_items: vec![LineItem::from_product(product, 1)],
            buyer: buyer.into(),
            idempotency_key: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Order total in cents
    pub fn total(&self) -> Price {
        Price::from_cents(self.line_items.iter().map(|i| i.total().amount).sum())
    }
}

/// An ephemeral checkout session created by the payment provider.
/// Never persisted locally; the [`PendingOrder`] is the local record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's opaque session id
    pub session_id: String,

    /// URL to redirect the buyer to for payment
    pub checkout_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Status of a locally tracked order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Session created, awaiting payment
    Pending,
    /// Payment confirmed, product granted
    Completed,
    /// Session expired without payment
    Expired,
}

/// Locally persisted record of an initiated checkout, keyed by the
/// provider session id so a confirmation step can reconcile payment
/// back to product and buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrder {
    pub session_id: String,
    pub product_id: Uuid,
    pub buyer: String,
    pub amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    pub fn new(session: &CheckoutSession, product: &Product, buyer: impl Into<String>) -> Self {
        Self {
            session_id: session.session_id.clone(),
            product_id: product.id,
            buyer: buyer.into(),
            amount: product.price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Storage seam for pending orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: PendingOrder) -> MarketResult<()>;

    async fn get(&self, session_id: &str) -> Option<PendingOrder>;

    /// Mark the order for `session_id` completed and return it.
    /// Completing an already-completed order is idempotent.
    async fn complete(&self, session_id: &str) -> MarketResult<PendingOrder>;
}

/// In-memory order store
#[derive(Debug, Default)]
pub struct MemoryOrders {
    orders: RwLock<HashMap<String, PendingOrder>>,
}

impl MemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn insert(&self, order: PendingOrder) -> MarketResult<()> {
        self.orders
            .write()
            .map_err(|_| MarketError::Internal("order lock poisoned".into()))?
            .insert(order.session_id.clone(), order);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Option<PendingOrder> {
        self.orders
            .read()
            .ok()
            .and_then(|orders| orders.get(session_id).cloned())
    }

    async fn complete(&self, session_id: &str) -> MarketResult<PendingOrder> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| MarketError::Internal("order lock poisoned".into()))?;

        let order = orders
            .get_mut(session_id)
            .ok_or_else(|| MarketError::not_found("checkout session"))?;

        order.status = OrderStatus::Completed;
        Ok(order.clone())
    }
}
