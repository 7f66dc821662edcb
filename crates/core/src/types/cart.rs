//! Cart item types and the remote hashmap record format.
//!
//! Each distinct product in a user's cart is one entry in the remote
//! `cart_data` hashmap, keyed by product name. The entry value is a
//! JSON-encoded [`CartRecord`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat per-item promotional discount applied at cart view time.
pub const DEFAULT_ITEM_DISCOUNT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Wire format of one remote cart entry: `{price, quantity, image}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Unit price.
    pub price: Decimal,
    /// Always a positive integer in the store.
    pub quantity: u32,
    /// Product image URL.
    pub image: String,
}

/// A line in the local cart view.
///
/// `name` is the unique key; it maps one-to-one onto a remote hashmap entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    /// Per-item discount subtracted from the unit price at checkout.
    pub discount: Decimal,
}

impl CartItem {
    /// Project a remote hashmap entry into a cart line.
    #[must_use]
    pub fn from_record(name: impl Into<String>, record: CartRecord) -> Self {
        Self {
            name: name.into(),
            price: record.price,
            quantity: record.quantity,
            image: record.image,
            discount: DEFAULT_ITEM_DISCOUNT,
        }
    }

    /// The remote record for this line, written back on every quantity change.
    #[must_use]
    pub fn record(&self) -> CartRecord {
        CartRecord {
            price: self.price,
            quantity: self.quantity,
            image: self.image.clone(),
        }
    }

    /// Effective unit price after discount.
    #[must_use]
    pub fn discounted_price(&self) -> Decimal {
        self.price - self.discount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> CartRecord {
        CartRecord {
            price: Decimal::new(2500, 2),
            quantity: 2,
            image: "/images/i1.jpg".to_string(),
        }
    }

    #[test]
    fn test_from_record_applies_default_discount() {
        let item = CartItem::from_record("Lavender Bliss", record());
        assert_eq!(item.name, "Lavender Bliss");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.discount, Decimal::new(5, 0));
    }

    #[test]
    fn test_record_round_trip() {
        let item = CartItem::from_record("Vanilla Harmony", record());
        assert_eq!(item.record(), record());
    }

    #[test]
    fn test_discounted_price() {
        let item = CartItem::from_record("Rose Elegance", record());
        assert_eq!(item.discounted_price(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("price").is_some());
        assert!(json.get("quantity").is_some());
        assert!(json.get("image").is_some());
    }
}
