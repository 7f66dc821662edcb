//! Checkout: totals, payment delegation, and one-shot order submission.
//!
//! Two modes:
//! - a hosted payment gateway ([`PaymentGateway`]) that yields a payment
//!   reference synchronously, after which the order is submitted once;
//! - a QR/UPI flow ([`CheckoutFlow::begin_qr_checkout`]) that arms the
//!   backend and polls for confirmation at a fixed cadence.

pub mod poll;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use candleworks_core::{DeliveryAddress, PendingOrder, order_total};

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::config::UpiPayee;
use poll::{PaymentPoll, PollSettings};

/// Payment gateway failure, surfaced before any order is submitted.
#[derive(Debug, Error)]
#[error("payment gateway error: {0}")]
pub struct PaymentError(pub String);

/// The hosted-checkout collaborator: collects payment for an amount and
/// returns the gateway's payment reference.
pub trait PaymentGateway {
    /// Run the payment flow for `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the payment is not completed; checkout
    /// aborts with no side effects.
    fn collect_payment(
        &self,
        amount: Decimal,
    ) -> impl Future<Output = Result<String, PaymentError>> + Send;
}

/// Errors surfaced by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Proceeding with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Gateway failure before order submission. No side effects.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Payment went through but the order-persistence call failed. Terminal:
    /// no automatic retry and no compensating refund; the payment reference
    /// is carried for manual reconciliation.
    #[error("payment succeeded but order was not recorded (payment reference {reference}): {source}")]
    OrderNotRecorded {
        reference: String,
        source: ApiError,
    },

    /// Backend call failed before any payment was taken.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// An in-progress QR checkout: the URI to render plus the running poll.
pub struct QrCheckout {
    /// Client-generated reference the backend matches the payment on.
    pub reference: String,
    /// Amount due.
    pub amount: Decimal,
    /// UPI intent URI to encode as a QR code.
    pub upi_uri: String,
    /// The confirmation poll; await [`PaymentPoll::outcome`] or cancel it.
    pub poll: PaymentPoll,
}

/// Drives checkout against the cart and order backends.
#[derive(Clone)]
pub struct CheckoutFlow {
    api: ApiClient,
    cart: CartStore,
}

impl CheckoutFlow {
    /// Create a checkout flow over the shared client and cart.
    #[must_use]
    pub const fn new(api: ApiClient, cart: CartStore) -> Self {
        Self { api, cart }
    }

    /// Checkout through a hosted payment gateway.
    ///
    /// Computes the total, delegates to the gateway for a payment reference,
    /// then submits exactly one order. Only a successful submission clears
    /// the cart.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] before any payment is taken
    /// - [`CheckoutError::Payment`] if the gateway fails (no side effects)
    /// - [`CheckoutError::OrderNotRecorded`] if payment succeeded but the
    ///   order-persistence call did not return success
    pub async fn checkout_with_gateway<G: PaymentGateway>(
        &self,
        gateway: &G,
        delivery_address: Option<DeliveryAddress>,
    ) -> Result<PendingOrder, CheckoutError> {
        // Make sure the last quantity edit has been written through before
        // snapshotting.
        self.cart.flush_writes().await;

        let items = self.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = order_total(&items);

        let reference = gateway.collect_payment(total).await?;

        let order = PendingOrder::from_cart(&items, delivery_address, reference);
        match self.api.save_order(&order).await {
            Ok(()) => {
                self.cart.clear().await;
                Ok(order)
            }
            Err(source) => Err(CheckoutError::OrderNotRecorded {
                reference: order.payment_reference.clone(),
                source,
            }),
        }
    }

    /// Begin a QR/UPI checkout with the default poll cadence (5 s interval,
    /// 5 minute ceiling).
    ///
    /// # Errors
    ///
    /// See [`Self::begin_qr_checkout_with`].
    pub async fn begin_qr_checkout(&self, payee: &UpiPayee) -> Result<QrCheckout, CheckoutError> {
        self.begin_qr_checkout_with(payee, PollSettings::default())
            .await
    }

    /// Begin a QR/UPI checkout: arm the backend with the amount and a fresh
    /// reference, build the UPI intent URI, and start the confirmation poll.
    ///
    /// On confirmation the poll clears the cart; on reaching the ceiling it
    /// reports a timeout. Either way polling stops immediately.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if there is nothing to pay for
    /// - [`CheckoutError::Api`] if arming the backend fails (no payment has
    ///   been requested yet, so this aborts cleanly)
    pub async fn begin_qr_checkout_with(
        &self,
        payee: &UpiPayee,
        settings: PollSettings,
    ) -> Result<QrCheckout, CheckoutError> {
        self.cart.flush_writes().await;

        let items = self.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let amount = order_total(&items);
        let reference = Uuid::new_v4().to_string();

        self.api.arm_payment_confirmation(&reference, amount).await?;

        let upi_uri = upi_intent_uri(payee, amount);
        let poll = PaymentPoll::spawn(
            self.api.clone(),
            self.cart.clone(),
            reference.clone(),
            settings,
        );

        Ok(QrCheckout {
            reference,
            amount,
            upi_uri,
            poll,
        })
    }
}

/// Build the UPI intent URI a payer's app reads from the QR code.
#[must_use]
pub fn upi_intent_uri(payee: &UpiPayee, amount: Decimal) -> String {
    let mut uri = String::from("upi://pay");
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("pa", &payee.vpa)
        .append_pair("pn", &payee.name)
        .append_pair("am", &format!("{amount:.2}"))
        .append_pair("cu", "INR")
        .finish();
    uri.push('?');
    uri.push_str(&query);
    uri
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upi_intent_uri_encodes_payee_and_amount() {
        let payee = UpiPayee {
            vpa: "store@upi".to_string(),
            name: "Candleworks".to_string(),
        };
        let uri = upi_intent_uri(&payee, Decimal::new(240, 0));
        assert!(uri.starts_with("upi://pay?"));
        assert!(uri.contains("pa=store%40upi"));
        assert!(uri.contains("pn=Candleworks"));
        assert!(uri.contains("am=240.00"));
        assert!(uri.contains("cu=INR"));
    }
}
