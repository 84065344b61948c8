//! # market-core
//!
//! Core types and traits for the vendio marketplace backend.
//!
//! This crate provides:
//! - `Product`, `ProductDraft`, and `Price` for the product catalog
//! - `CatalogStore`, `LibraryStore`, and `OrderStore` storage seams with
//!   in-memory implementations
//! - `CheckoutOrder`, `CheckoutSession`, and `PendingOrder` for the
//!   checkout flow
//! - `PaymentGateway` trait for payment provider implementations
//! - `MarketError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use market_core::{CatalogStore, CheckoutOrder, MemoryCatalog, ProductDraft};
//!
//! let catalog = MemoryCatalog::new();
//!
//! // Create a product for its owner
//! let product = draft.build("ada")?;
//! let product = catalog.insert(product).await?;
//!
//! // Check out that specific product
//! let order = CheckoutOrder::for_product(&product, "grace");
//! let session = gateway.create_checkout(&order, &success_url, &cancel_url).await?;
//!
//! // Redirect the buyer to session.checkout_url
//! ```

pub mod catalog;
pub mod error;
pub mod library;
pub mod order;
pub mod page;
pub mod product;
pub mod strategy;

// Re-exports for convenience
pub use catalog::{page_of_active, CatalogStore, MemoryCatalog};
pub use error::{MarketError, MarketResult};
pub use library::{LibraryStore, MemoryLibrary, UserLibrary};
pub use order::{
    CheckoutOrder, CheckoutSession, LineItem, MemoryOrders, OrderStatus, OrderStore, PendingOrder,
};
pub use page::{paginate, Page, PAGE_SIZE};
pub use product::{ContentSource, Price, Product, ProductDraft, CURRENCY};
pub use strategy::{BoxedPaymentGateway, CheckoutUrls, PaymentGateway};
