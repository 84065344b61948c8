//! # Application State
//!
//! Shared state for the axum application: stores, payment gateway,
//! auth tokens, and configuration. Seed data (users and products) is
//! loaded from `config/market.toml` at boot.

use crate::auth::TokenRegistry;
use market_core::{
    CatalogStore, CheckoutUrls, LibraryStore, MemoryCatalog, MemoryLibrary, MemoryOrders,
    OrderStore, PaymentGateway, ProductDraft,
};
use market_stripe::StripeCheckout;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL for checkout redirects
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory uploaded product files are written to
    pub upload_dir: PathBuf,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog store
    pub catalog: Arc<dyn CatalogStore>,
    /// Per-user purchased-product libraries
    pub library: Arc<dyn LibraryStore>,
    /// Pending orders keyed by provider session id
    pub orders: Arc<dyn OrderStore>,
    /// Payment gateway
    pub gateway: Arc<dyn PaymentGateway>,
    /// Success/cancel redirect URLs
    pub urls: CheckoutUrls,
    /// Bearer token -> username registry
    pub tokens: TokenRegistry,
    /// Stripe publishable key, exposed on the detail page
    pub publishable_key: String,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the production AppState. Fails fast on missing or
    /// malformed Stripe configuration.
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let urls = CheckoutUrls::new(&config.base_url);

        let stripe_config = market_stripe::StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let publishable_key = stripe_config.publishable_key.clone();
        let gateway = StripeCheckout::new(stripe_config)?;

        let catalog = Arc::new(MemoryCatalog::new());
        let library = Arc::new(MemoryLibrary::new());
        let orders = Arc::new(MemoryOrders::new());

        let seed = load_seed();
        let tokens = TokenRegistry::new(
            seed.users
                .iter()
                .map(|u| (u.token.clone(), u.username.clone())),
        );
        for entry in seed.products {
            let product = entry
                .draft
                .build(&entry.owner)
                .map_err(|e| anyhow::anyhow!("Invalid seed product: {}", e))?;
            catalog
                .insert(product)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed product: {}", e))?;
        }

        Ok(Self {
            catalog,
            library,
            orders,
            gateway: Arc::new(gateway),
            urls,
            tokens,
            publishable_key,
            config,
        })
    }
}

/// One user in the seed file
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub token: String,
}

/// One product in the seed file
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub owner: String,
    #[serde(flatten)]
    pub draft: ProductDraft,
}

/// Seed data loaded from `config/market.toml`
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Load seed data from the config file, if present
fn load_seed() -> SeedFile {
    let config_paths = [
        "config/market.toml",
        "../config/market.toml",
        "../../config/market.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            match toml::from_str::<SeedFile>(&content) {
                Ok(seed) => {
                    tracing::info!(
                        "Loaded {} users, {} products from {}",
                        seed.users.len(),
                        seed.products.len(),
                        path
                    );
                    return seed;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path, e);
                }
            }
        }
    }

    tracing::warn!("No seed file found, starting empty");
    SeedFile::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_file_parsing() {
        let seed: SeedFile = toml::from_str(
            r#"
            [[users]]
            username = "ada"
            token = "tok_ada_1"

            [[products]]
            owner = "ada"
            name = "Beat Pack"
            description = "40 loops"
            slug = "beat-pack"
            content_url = "https://cdn.example.com/pack.zip"
            price = 19.99
            active = true
            "#,
        )
        .unwrap();

        assert_eq!(seed.users.len(), 1);
        assert_eq!(seed.products.len(), 1);
        assert_eq!(seed.products[0].owner, "ada");
        assert_eq!(seed.products[0].draft.slug, "beat-pack");

        let product = seed.products[0].draft.clone().build("ada").unwrap();
        assert_eq!(product.price.amount, 1999);
    }

    #[test]
    fn test_app_config_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            upload_dir: PathBuf::from("uploads"),
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
