//! KisanSetu client diagnostic binary.
//!
//! Exercises the state layer end to end against a running backend (or its
//! absence): opens the persistent store, restores any saved session and
//! location, runs the location acquisition chain, and lists the catalog.
//! Everything is reported through tracing.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kisan_setu_client::api::{HeadlessNavigator, OfflineCatalog, ProductQuery};
use kisan_setu_client::error::Result;
use kisan_setu_client::location::{NoGeolocation, standard_chain};
use kisan_setu_client::store::FileStore;
use kisan_setu_client::{ApiClient, CartManager, ClientConfig, LocationManager, SessionManager};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kisan_setu_client=info,kisan_setu=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(api = %config.api_url, store = %config.store_path.display(), "starting");

    let store = Arc::new(FileStore::open(&config.store_path));

    let sessions = SessionManager::new(store.clone());
    match sessions.get() {
        Some(session) => {
            tracing::info!(username = %session.username, "restored session");
        }
        None => tracing::info!("no saved session, browsing anonymously"),
    }

    let api = ApiClient::new(
        &config,
        sessions,
        Arc::new(OfflineCatalog),
        Arc::new(HeadlessNavigator::default()),
    );

    // Headless hosts have no device GPS; the chain falls through to the IP
    // lookup and then the hard-coded default.
    let locations = LocationManager::new(
        store.clone(),
        standard_chain(Arc::new(NoGeolocation), api.http(), &config),
    );
    let location = locations.acquire().await;
    tracing::info!(
        city = %location.city,
        state = %location.state,
        geocoded = location.is_geocoded(),
        "location resolved"
    );

    let products = api.products(&ProductQuery::default()).await;
    tracing::info!(count = products.len(), "products listed");
    for product in &products {
        tracing::debug!(
            name = %product.name,
            category = %product.category,
            price = ?product.unit_price(),
            "product"
        );
    }

    let categories = api.categories().await;
    tracing::info!(count = categories.len(), "categories listed");

    let cart = CartManager::new(store);
    tracing::info!(items = cart.cart().len(), total = %cart.total(), "cart restored");

    Ok(())
}
