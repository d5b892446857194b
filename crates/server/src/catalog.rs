//! Product catalog seam.
//!
//! The catalog is an external, read-only collaborator. Carts never cache
//! prices; the services resolve every line against the catalog at pricing
//! time, so a price change between add-to-cart and checkout is reflected.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use velvet_core::{Money, ProductId};

/// Catalog lookup failures.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// A catalog product as the core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub sizes: Vec<String>,
}

impl Product {
    /// Whether the product is offered in the given size.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Read-only product lookups.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch a product; `None` for an unknown id.
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
}

/// Catalog served from an in-memory snapshot, loadable from a JSON file.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: HashMap<ProductId, Product>,
}

impl MemoryCatalog {
    /// Build a catalog from a product list.
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect(),
        }
    }

    /// Load a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the file cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Unavailable(format!("read {}: {e}", path.display())))?;
        let products: Vec<Product> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Unavailable(format!("parse {}: {e}", path.display())))?;
        Ok(Self::from_products(products))
    }

    /// Number of products in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_json() {
        let raw = r#"[
            {"id": "p1", "name": "Linen Shirt", "price": "100", "image": null, "sizes": ["S", "M", "L"]}
        ]"#;
        let products: Vec<Product> = serde_json::from_str(raw).expect("parse");
        let catalog = MemoryCatalog::from_products(products);
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn unknown_product_is_none() {
        let catalog = MemoryCatalog::default();
        let got = catalog.product(&ProductId::new("ghost")).await.expect("lookup");
        assert!(got.is_none());
    }
}
