//! Marketplace product and category types.
//!
//! Products come from the backend (or the offline catalog) as loosely typed
//! JSON. Only the fields the state layer actually needs are modeled; every
//! other attribute (seller, image, sustainability score, ...) is carried
//! through unchanged in [`Product::attributes`] so it survives a trip through
//! the cart and local storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::id::ProductId;

/// A marketplace product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Listing ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price as the backend sent it. Kept as raw JSON because listings
    /// in the wild carry both numbers and strings here; use
    /// [`Product::unit_price`] for arithmetic.
    #[serde(default)]
    pub price: Value,
    /// Category slug (e.g. "grains", "vegetables").
    #[serde(default)]
    pub category: String,
    /// Everything else on the listing, preserved verbatim.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl Product {
    /// Parse the unit price into a [`Decimal`].
    ///
    /// Accepts a JSON number or a numeric string. Returns `None` for
    /// anything else; callers decide how to degrade (the cart treats it
    /// as zero).
    #[must_use]
    pub fn unit_price(&self) -> Option<Decimal> {
        match &self.price {
            Value::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
            Value::String(s) => s.parse::<Decimal>().ok(),
            _ => None,
        }
    }
}

/// A marketplace category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category slug, used for filtering product queries.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emoji icon shown in the category picker.
    #[serde(default)]
    pub icon: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_from(value: Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unit_price_from_number() {
        let p = product_from(json!({"id": 1, "name": "Organic Wheat", "price": 25}));
        assert_eq!(p.unit_price(), Some(Decimal::from(25)));
    }

    #[test]
    fn test_unit_price_from_float() {
        let p = product_from(json!({"id": 1, "name": "Milk", "price": 45.5}));
        assert_eq!(p.unit_price(), Some("45.5".parse().unwrap()));
    }

    #[test]
    fn test_unit_price_from_string() {
        let p = product_from(json!({"id": 1, "name": "Rice", "price": "80"}));
        assert_eq!(p.unit_price(), Some(Decimal::from(80)));
    }

    #[test]
    fn test_unit_price_malformed_is_none() {
        let p = product_from(json!({"id": 1, "name": "Bad", "price": "free"}));
        assert_eq!(p.unit_price(), None);

        let p = product_from(json!({"id": 2, "name": "Worse", "price": {"amount": 5}}));
        assert_eq!(p.unit_price(), None);
    }

    #[test]
    fn test_extra_attributes_survive_roundtrip() {
        let raw = json!({
            "id": 6,
            "name": "Fresh Tomatoes",
            "price": 30,
            "category": "vegetables",
            "seller": "Shyam Kumar",
            "organic": false,
            "distance_km": 8
        });
        let p = product_from(raw.clone());
        assert_eq!(p.attributes.get("seller"), Some(&json!("Shyam Kumar")));

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back, raw);
    }
}
