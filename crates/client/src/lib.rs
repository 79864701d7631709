//! KisanSetu client library.
//!
//! The state layer behind the marketplace page views: a local persistent
//! key-value store modeled after browser local storage, the three managers
//! that own slices of it (cart, location, session), and the authenticated
//! HTTP client for the marketplace backend.
//!
//! Pages hold no state of their own - they construct the managers over a
//! shared store, read current state on mount, and every mutation persists
//! before the call returns.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod location;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use cart::CartManager;
pub use config::ClientConfig;
pub use error::ClientError;
pub use location::LocationManager;
pub use session::SessionManager;
