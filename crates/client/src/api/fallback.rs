//! Built-in catalog served when the backend is unreachable, so browsing
//! keeps working offline. The fixture ships inside the binary.

use std::sync::LazyLock;

use serde::Deserialize;

use kisan_setu_core::{Category, Product};

use super::types::ProductQuery;

/// Source of catalog data when the network one is unavailable.
pub trait FallbackCatalog: Send + Sync {
    /// Products matching `query`, from local data.
    fn products(&self, query: &ProductQuery) -> Vec<Product>;

    /// All known categories, from local data.
    fn categories(&self) -> Vec<Category>;
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<Product>,
    categories: Vec<Category>,
}

static FIXTURE: LazyLock<CatalogFixture> = LazyLock::new(|| {
    serde_json::from_str(include_str!("offline_catalog.json")).unwrap_or_else(|e| {
        tracing::error!(error = %e, "embedded catalog unparseable");
        CatalogFixture {
            products: Vec::new(),
            categories: Vec::new(),
        }
    })
});

/// The embedded offline catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineCatalog;

impl FallbackCatalog for OfflineCatalog {
    fn products(&self, query: &ProductQuery) -> Vec<Product> {
        FIXTURE
            .products
            .iter()
            .filter(|p| {
                query
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
            })
            .filter(|p| {
                query.search.as_deref().is_none_or(|s| {
                    p.name.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .cloned()
            .collect()
    }

    fn categories(&self) -> Vec<Category> {
        FIXTURE.categories.clone()
    }
}
