//! KisanSetu Core - Shared types library.
//!
//! This crate provides common types used across all KisanSetu components:
//! - `client` - State layer and API client backing the marketplace pages
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, products, cart entries, locations, and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
