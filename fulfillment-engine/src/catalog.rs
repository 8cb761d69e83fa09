//! Product catalog collaborator with in-memory caching
//!
//! The engine consumes the catalog read-only: "does product X exist, is it
//! returnable, what is its price". Catalog management (CRUD, persistence)
//! lives outside the core; callers load the cache on startup via
//! [`Catalog::warmup`] and keep it current with [`Catalog::upsert`].

use parking_lot::RwLock;
use shared::models::Product;
use std::collections::HashMap;

/// In-memory product catalog
#[derive(Default)]
pub struct Catalog {
    /// Products cache: product id -> Product
    products: RwLock<HashMap<u64, Product>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let products_count = self.products.read().len();
        f.debug_struct("Catalog")
            .field("products_count", &products_count)
            .finish()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache contents with a full product load
    pub fn warmup(&self, products: Vec<Product>) {
        let mut cache = self.products.write();
        cache.clear();
        for product in products {
            cache.insert(product.id, product);
        }
        tracing::info!(products = cache.len(), "Catalog warmed up");
    }

    /// Insert or replace a single product
    pub fn upsert(&self, product: Product) {
        self.products.write().insert(product.id, product);
    }

    pub fn get(&self, product_id: u64) -> Option<Product> {
        self.products.read().get(&product_id).cloned()
    }

    pub fn contains(&self, product_id: u64) -> bool {
        self.products.read().contains_key(&product_id)
    }

    /// List price, if the product exists
    pub fn price(&self, product_id: u64) -> Option<f64> {
        self.products.read().get(&product_id).map(|p| p.price)
    }

    /// Whether the product's containers must come back
    ///
    /// Unknown products count as non-returnable: delivery must not fail on
    /// a product that was removed from the catalog after the order was
    /// taken.
    pub fn is_returnable(&self, product_id: u64) -> bool {
        self.products
            .read()
            .get(&product_id)
            .map(|p| p.is_returnable)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bidon() -> Product {
        Product {
            id: 1,
            name: "Bidón 20L".to_string(),
            code: "B20".to_string(),
            price: 1500.0,
            is_returnable: true,
        }
    }

    #[test]
    fn test_warmup_and_lookup() {
        let catalog = Catalog::new();
        catalog.warmup(vec![bidon()]);

        assert!(catalog.contains(1));
        assert!(!catalog.contains(99));
        assert_eq!(catalog.price(1), Some(1500.0));
        assert!(catalog.is_returnable(1));
        assert!(!catalog.is_returnable(99));
    }

    #[test]
    fn test_upsert_replaces() {
        let catalog = Catalog::new();
        catalog.upsert(bidon());

        let mut cheaper = bidon();
        cheaper.price = 1200.0;
        catalog.upsert(cheaper);

        assert_eq!(catalog.price(1), Some(1200.0));
        assert_eq!(catalog.get(1).map(|p| p.name), Some("Bidón 20L".to_string()));
    }
}
