//! Core types for KisanSetu.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod location;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartEntry;
pub use id::*;
pub use location::LocationRecord;
pub use product::{Category, Product};
pub use session::SessionRecord;
pub use user::{UserType, UserTypeError};
