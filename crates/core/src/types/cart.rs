//! Cart entry type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::product::Product;

const fn default_quantity() -> u32 {
    1
}

/// One line in the cart: a product plus how many of it.
///
/// The product fields are flattened so a persisted entry looks exactly like
/// the listing it was created from, with a `quantity` added. Entries read
/// back from storage without a quantity count as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product as it was when added, all attributes intact.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product. Never persisted as 0; the cart deletes the
    /// entry instead.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartEntry {
    /// Create an entry for a freshly added product.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Price contribution of this line: unit price times quantity.
    ///
    /// A malformed price contributes zero rather than failing the total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price().unwrap_or_default() * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let entry: CartEntry =
            serde_json::from_value(json!({"id": 1, "name": "Wheat", "price": 25})).unwrap();
        assert_eq!(entry.quantity, 1);
    }

    #[test]
    fn test_line_total() {
        let entry: CartEntry = serde_json::from_value(
            json!({"id": 1, "name": "Wheat", "price": 25, "quantity": 2}),
        )
        .unwrap();
        assert_eq!(entry.line_total(), Decimal::from(50));
    }

    #[test]
    fn test_line_total_malformed_price_is_zero() {
        let entry: CartEntry = serde_json::from_value(
            json!({"id": 1, "name": "Wheat", "price": "call us", "quantity": 3}),
        )
        .unwrap();
        assert_eq!(entry.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_flattened_shape() {
        let entry: CartEntry = serde_json::from_value(
            json!({"id": 1, "name": "Wheat", "price": 25, "seller": "Ram Singh"}),
        )
        .unwrap();
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back.get("seller"), Some(&json!("Ram Singh")));
        assert_eq!(back.get("quantity"), Some(&json!(1)));
    }
}
