//! # Product Types
//!
//! Product catalog types for vendio. Prices are USD only; amounts are
//! carried in minor units (cents) to match the payment provider's wire
//! format.

use crate::error::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only supported currency (ISO 4217 code, lowercase for the provider API)
pub const CURRENCY: &str = "usd";

/// Slugs that collide with fixed routes and would make the product
/// unreachable on the public detail endpoint.
const RESERVED_SLUGS: &[&str] = &["mine"];

/// Price in minor currency units (cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in cents
    pub amount: i64,
}

impl Price {
    /// Create a price from a decimal dollar amount
    pub fn from_major(amount: f64) -> Self {
        Self {
            amount: (amount * 100.0).round() as i64,
        }
    }

    /// Create a price from cents
    pub fn from_cents(amount: i64) -> Self {
        Self { amount }
    }

    /// Get the decimal dollar amount
    pub fn as_major(&self) -> f64 {
        self.amount as f64 / 100.0
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        format!("${:.2}", self.as_major())
    }
}

/// Where the digital content of a product lives.
/// Exactly one source per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// External URL the buyer is given access to
    Url(String),
    /// Reference to an uploaded file (relative to the upload directory)
    File(String),
}

/// A digital product listed for sale, owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Surrogate id
    pub id: Uuid,

    /// Globally unique, URL-safe identifier
    pub slug: String,

    /// Username of the owning user (identity is externally owned)
    pub owner: String,

    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Optional thumbnail image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Price in cents
    pub price: Price,

    /// Digital content source
    pub content: ContentSource,

    /// Whether this product appears in public listings
    pub active: bool,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Submitted product fields, prior to validation.
///
/// Built from the multipart form by the API layer; file fields arrive
/// already resolved to stored filenames.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub content_file: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub active: bool,
}

impl ProductDraft {
    /// Validate fields common to create and update:
    /// non-empty name and slug, non-negative price.
    fn validate_fields(&self) -> MarketResult<()> {
        if self.name.trim().is_empty() {
            return Err(MarketError::validation("name", "must not be empty"));
        }
        if self.slug.trim().is_empty() {
            return Err(MarketError::validation("slug", "must not be empty"));
        }
        if RESERVED_SLUGS.contains(&self.slug.trim()) {
            return Err(MarketError::validation(
                "slug",
                format!("'{}' is reserved", self.slug.trim()),
            ));
        }
        if !self.price.is_finite() {
            return Err(MarketError::validation("price", "must be a finite number"));
        }
        if self.price < 0.0 {
            return Err(MarketError::validation("price", "must not be negative"));
        }
        Ok(())
    }

    /// Resolve the content source. On create exactly one of
    /// content_url/content_file is required; on update both may be absent
    /// (the existing source is kept).
    fn content_source(&self) -> MarketResult<Option<ContentSource>> {
        match (&self.content_url, &self.content_file) {
            (Some(_), Some(_)) => Err(MarketError::validation(
                "content",
                "provide either a content URL or a content file, not both",
            )),
            (Some(url), None) => Ok(Some(ContentSource::Url(url.clone()))),
            (None, Some(file)) => Ok(Some(ContentSource::File(file.clone()))),
            (None, None) => Ok(None),
        }
    }

    /// Validate and build a new product for `owner`.
    pub fn build(self, owner: impl Into<String>) -> MarketResult<Product> {
        self.validate_fields()?;
        let content = self.content_source()?.ok_or_else(|| {
            MarketError::validation(
                "content",
                "provide a content URL or a content file",
            )
        })?;

        Ok(Product {
            id: Uuid::new_v4(),
            slug: self.slug.trim().to_string(),
            owner: owner.into(),
            name: self.name.trim().to_string(),
            description: self.description,
            thumbnail: self.thumbnail,
            price: Price::from_major(self.price),
            content,
            active: self.active,
            created_at: Utc::now(),
        })
    }

    /// Validate and apply this draft onto an existing product.
    /// Absent file-backed fields keep the stored values.
    pub fn apply_to(self, product: &mut Product) -> MarketResult<()> {
        self.validate_fields()?;
        if let Some(content) = self.content_source()? {
            product.content = content;
        }
        if let Some(thumbnail) = self.thumbnail {
            product.thumbnail = Some(thumbnail);
        }
        product.slug = self.slug.trim().to_string();
        product.name = self.name.trim().to_string();
        product.description = self.description;
        product.price = Price::from_major(self.price);
        product.active = self.active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Beat Pack Vol. 1".into(),
            description: "40 royalty-free loops".into(),
            slug: "beat-pack-vol-1".into(),
            thumbnail: None,
            content_url: Some("https://cdn.example.com/beats.zip".into()),
            content_file: None,
            price: 19.99,
            active: true,
        }
    }

    #[test]
    fn test_price_conversion() {
        assert_eq!(Price::from_major(19.99).amount, 1999);
        assert_eq!(Price::from_major(0.0).amount, 0);
        assert_eq!(Price::from_cents(1099).as_major(), 10.99);
        assert_eq!(Price::from_major(29.99).display(), "$29.99");
    }

    #[test]
    fn test_build_valid_draft() {
        let product = draft().build("ada").unwrap();
        assert_eq!(product.owner, "ada");
        assert_eq!(product.slug, "beat-pack-vol-1");
        assert_eq!(product.price.amount, 1999);
        assert!(matches!(product.content, ContentSource::Url(_)));
        assert!(product.active);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut d = draft();
        d.name = "  ".into();
        assert!(matches!(
            d.build("ada"),
            Err(MarketError::Validation { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let mut d = draft();
        d.slug = "".into();
        assert!(matches!(
            d.build("ada"),
            Err(MarketError::Validation { field, .. }) if field == "slug"
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut d = draft();
        d.price = -1.0;
        assert!(matches!(
            d.build("ada"),
            Err(MarketError::Validation { field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut d = draft();
            d.price = bad;
            assert!(matches!(
                d.build("ada"),
                Err(MarketError::Validation { field, .. }) if field == "price"
            ));
        }
    }

    #[test]
    fn test_reserved_slug_rejected() {
        let mut d = draft();
        d.slug = "mine".into();
        assert!(matches!(
            d.build("ada"),
            Err(MarketError::Validation { field, .. }) if field == "slug"
        ));
    }

    #[test]
    fn test_exactly_one_content_source() {
        let mut both = draft();
        both.content_file = Some("beats.zip".into());
        assert!(both.build("ada").is_err());

        let mut neither = draft();
        neither.content_url = None;
        assert!(neither.build("ada").is_err());

        let mut file_only = draft();
        file_only.content_url = None;
        file_only.content_file = Some("beats.zip".into());
        let product = file_only.build("ada").unwrap();
        assert_eq!(product.content, ContentSource::File("beats.zip".into()));
    }

    #[test]
    fn test_apply_keeps_content_when_absent() {
        let mut product = draft().build("ada").unwrap();
        let original_content = product.content.clone();

        let mut update = draft();
        update.content_url = None;
        update.price = 24.99;
        update.apply_to(&mut product).unwrap();

        assert_eq!(product.content, original_content);
        assert_eq!(product.price.amount, 2499);
    }
}
