//! Order payload submitted once at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::DeliveryAddress;
use super::cart::CartItem;

/// One line of an order: a snapshot of a cart item at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub discount: Decimal,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            discount: item.discount,
        }
    }
}

/// An order as submitted to the order-persistence backend.
///
/// Created at checkout, submitted exactly once, never mutated afterward:
/// either it is accepted (and the cart cleared) or the failure is surfaced
/// without retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_reference: String,
}

impl PendingOrder {
    /// Snapshot the cart into an order payload.
    #[must_use]
    pub fn from_cart(
        items: &[CartItem],
        delivery_address: Option<DeliveryAddress>,
        payment_reference: impl Into<String>,
    ) -> Self {
        Self {
            items: items.iter().map(OrderLine::from).collect(),
            total_amount: order_total(items),
            delivery_address,
            payment_reference: payment_reference.into(),
        }
    }
}

/// Order total: sum of `(price - discount) * quantity` over the cart.
#[must_use]
pub fn order_total(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.discounted_price() * Decimal::from(item.quantity))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(name: &str, price: i64, discount: i64, quantity: u32) -> CartItem {
        CartItem {
            name: name.to_string(),
            price: Decimal::new(price, 0),
            quantity,
            image: format!("/images/{name}.jpg"),
            discount: Decimal::new(discount, 0),
        }
    }

    #[test]
    fn test_order_total() {
        // (100-5)*2 + (50-0)*1 = 240
        let items = vec![item("a", 100, 5, 2), item("b", 50, 0, 1)];
        assert_eq!(order_total(&items), Decimal::new(240, 0));
    }

    #[test]
    fn test_order_total_empty_cart() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_from_cart_snapshots_lines() {
        let items = vec![item("a", 100, 5, 2), item("b", 50, 0, 1)];
        let order = PendingOrder::from_cart(&items, None, "pay_123");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, Decimal::new(240, 0));
        assert_eq!(order.payment_reference, "pay_123");
    }
}
