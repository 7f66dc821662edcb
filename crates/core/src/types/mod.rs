//! Core types for Candleworks.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod quantity;
pub mod status;

pub use address::DeliveryAddress;
pub use cart::{CartItem, CartRecord};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{OrderLine, PendingOrder, order_total};
pub use price::{CurrencyCode, Price};
pub use quantity::QuantityInput;
pub use status::{LogoutReason, PaymentOutcome, SessionState};
