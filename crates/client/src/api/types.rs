//! Wire types for the marketplace backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kisan_setu_core::{CartEntry, Category, LocationRecord, Product, SessionRecord, UserId, UserType};

/// Login response: just the credential. Identity comes from the profile
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// A user as returned by the profile and user-listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Backend acknowledgement of a registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterReceipt {
    #[serde(default)]
    pub message: String,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub success: bool,
}

/// What a registration attempt produced.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// The backend accepted the registration; the user logs in next.
    Registered(RegisterReceipt),
    /// The backend was unreachable; a local mock session was created and
    /// persisted so the app remains usable offline.
    Offline(SessionRecord),
}

/// Product listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Restrict to one category slug.
    pub category: Option<String>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

impl ProductQuery {
    /// Whether this query asks for the whole catalog.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.search.is_none()
    }
}

/// Product listing response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Category listing response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Order creation request: the cart as it stands at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub items: Vec<CartEntry>,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<LocationRecord>,
}
