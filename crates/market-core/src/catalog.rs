//! # Product Catalog Store
//!
//! Storage seam for the product catalog plus the in-memory implementation
//! used by the server and the tests. Slug uniqueness is enforced with an
//! explicit keyed check inside the store's write lock; a duplicate slug is
//! a validation failure, never a silent return of the existing row.

use crate::error::{MarketError, MarketResult};
use crate::page::{paginate, Page};
use crate::product::{Product, ProductDraft};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

/// Storage seam for products.
///
/// The backing store is an external collaborator; implementations must
/// enforce slug uniqueness and apply the ownership filter on `update`
/// before the target row is resolved.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new product. Fails with a validation error if the slug
    /// is already taken.
    async fn insert(&self, product: Product) -> MarketResult<Product>;

    /// Update a product owned by `owner`. A row owned by someone else is
    /// reported as not found, never revealing its existence.
    async fn update(&self, owner: &str, id: Uuid, draft: ProductDraft) -> MarketResult<Product>;

    async fn get_by_slug(&self, slug: &str) -> MarketResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> MarketResult<Product>;

    /// All active products, in insertion order.
    async fn list_active(&self) -> Vec<Product>;

    async fn list_by_owner(&self, owner: &str) -> Vec<Product>;
}

/// Fetch one listing page of active products.
///
/// `None` means there are no active products at all (distinct
/// "no products" state); out-of-range pages clamp inside [`paginate`].
pub async fn page_of_active(store: &dyn CatalogStore, page: u32) -> Option<Page<Product>> {
    let active = store.list_active().await;
    paginate(&active, page)
}

/// In-memory catalog store. Insertion order is preserved so listings
/// match the order products were created in.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products
    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert(&self, product: Product) -> MarketResult<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|_| MarketError::Internal("catalog lock poisoned".into()))?;

        // Check-then-insert under one write guard: the transactional
        // analogue of a unique index on slug.
        if products.iter().any(|p| p.slug == product.slug) {
            return Err(MarketError::validation(
                "slug",
                format!("slug '{}' is already taken", product.slug),
            ));
        }

        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, owner: &str, id: Uuid, draft: ProductDraft) -> MarketResult<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|_| MarketError::Internal("catalog lock poisoned".into()))?;

        // Ownership filter is part of target resolution.
        let index = products
            .iter()
            .position(|p| p.id == id && p.owner == owner)
            .ok_or_else(|| MarketError::not_found("product"))?;

        let new_slug = draft.slug.trim();
        if products
            .iter()
            .any(|p| p.slug == new_slug && p.id != id)
        {
            return Err(MarketError::validation(
                "slug",
                format!("slug '{}' is already taken", new_slug),
            ));
        }

        let mut updated = products[index].clone();
        draft.apply_to(&mut updated)?;
        products[index] = updated.clone();
        Ok(updated)
    }

    async fn get_by_slug(&self, slug: &str) -> MarketResult<Product> {
        self.products
            .read()
            .map_err(|_| MarketError::Internal("catalog lock poisoned".into()))?
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| MarketError::not_found("product"))
    }

    async fn get_by_id(&self, id: Uuid) -> MarketResult<Product> {
        self.products
            .read()
            .map_err(|_| MarketError::Internal("catalog lock poisoned".into()))?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| MarketError::not_found("product"))
    }

    async fn list_active(&self) -> Vec<Product> {
        self.products
            .read()
            .map(|products| products.iter().filter(|p| p.active).cloned().collect())
            .unwrap_or_default()
    }

    async fn list_by_owner(&self, owner: &str) -> Vec<Product> {
        self.products
            .read()
            .map(|products| {
                products
                    .iter()
                    .filter(|p| p.owner == owner)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(slug: &str, active: bool) -> ProductDraft {
        ProductDraft {
            name: format!("Product {}", slug),
            description: "test product".into(),
            slug: slug.into(),
            thumbnail: None,
            content_url: Some("https://cdn.example.com/file.zip".into()),
            content_file: None,
            price: 10.0,
            active,
        }
    }

    async fn seeded(count: usize, owner: &str) -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        for i in 0..count {
            let product = draft(&format!("item-{}", i), true).build(owner).unwrap();
            catalog.insert(product).await.unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert(draft("same-slug", true).build("ada").unwrap())
            .await
            .unwrap();

        let err = catalog
            .insert(draft("same-slug", true).build("grace").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::Validation { field, .. } if field == "slug"));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_products_hidden_from_listing() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert(draft("visible", true).build("ada").unwrap())
            .await
            .unwrap();
        catalog
            .insert(draft("hidden", false).build("ada").unwrap())
            .await
            .unwrap();

        let active = catalog.list_active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].slug, "visible");
    }

    #[tokio::test]
    async fn test_page_of_active_sizes() {
        let catalog = seeded(20, "ada").await;

        let first = page_of_active(&catalog, 1).await.unwrap();
        let third = page_of_active(&catalog, 3).await.unwrap();

        assert_eq!(first.len(), 9);
        assert_eq!(third.len(), 2);
        assert_eq!(first.total_pages, 3);
    }

    #[tokio::test]
    async fn test_no_active_products_is_distinct_state() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert(draft("hidden", false).build("ada").unwrap())
            .await
            .unwrap();

        assert!(page_of_active(&catalog, 1).await.is_none());
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let catalog = MemoryCatalog::new();
        let product = catalog
            .insert(draft("my-pack", true).build("ada").unwrap())
            .await
            .unwrap();

        let mut changes = draft("my-pack", true);
        changes.price = 12.5;
        let updated = catalog.update("ada", product.id, changes).await.unwrap();

        assert_eq!(updated.price.amount, 1250);
    }

    #[tokio::test]
    async fn test_cross_user_update_is_not_found_and_leaves_row_unchanged() {
        let catalog = MemoryCatalog::new();
        let product = catalog
            .insert(draft("adas-product", true).build("ada").unwrap())
            .await
            .unwrap();

        let mut changes = draft("adas-product", true);
        changes.price = 0.01;
        let err = catalog
            .update("grace", product.id, changes)
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::NotFound { .. }));
        let stored = catalog.get_by_id(product.id).await.unwrap();
        assert_eq!(stored.price.amount, 1000);
    }

    #[tokio::test]
    async fn test_update_may_keep_own_slug_but_not_take_anothers() {
        let catalog = MemoryCatalog::new();
        let a = catalog
            .insert(draft("slug-a", true).build("ada").unwrap())
            .await
            .unwrap();
        catalog
            .insert(draft("slug-b", true).build("ada").unwrap())
            .await
            .unwrap();

        // Keeping its own slug is fine.
        assert!(catalog.update("ada", a.id, draft("slug-a", true)).await.is_ok());

        // Stealing another product's slug is not.
        let err = catalog
            .update("ada", a.id, draft("slug-b", true))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation { field, .. } if field == "slug"));
    }

    #[tokio::test]
    async fn test_get_by_slug_round_trip() {
        let catalog = MemoryCatalog::new();
        let created = catalog
            .insert(draft("round-trip", true).build("ada").unwrap())
            .await
            .unwrap();

        let fetched = catalog.get_by_slug("round-trip").await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.price, created.price);
        assert_eq!(fetched.content, created.content);

        assert!(matches!(
            catalog.get_by_slug("nonexistent").await,
            Err(MarketError::NotFound { .. })
        ));
    }
}
