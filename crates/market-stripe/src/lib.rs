//! # market-stripe
//!
//! Stripe payment gateway for the vendio marketplace.
//!
//! Implements [`market_core::PaymentGateway`] over Stripe's Checkout
//! Sessions API: the buyer is redirected to Stripe's hosted page and
//! back to the marketplace afterwards.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market_stripe::StripeCheckout;
//! use market_core::{CheckoutOrder, PaymentGateway};
//!
//! // Fails fast if STRIPE_SECRET_KEY / STRIPE_PUBLISHABLE_KEY are unset
//! let gateway = StripeCheckout::from_env()?;
//!
//! let order = CheckoutOrder::for_product(&product, "grace");
//! let session = gateway.create_checkout(
//!     &order,
//!     "https://vendio.example/checkout/success?session_id={CHECKOUT_SESSION_ID}",
//!     "https://vendio.example/checkout/cancel",
//! ).await?;
//!
//! // Redirect the buyer to session.checkout_url
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::StripeCheckout;
pub use config::StripeConfig;
