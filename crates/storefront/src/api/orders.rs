//! Order persistence and payment-confirmation endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use candleworks_core::PendingOrder;

use super::{ApiClient, ApiError, expect_success, parse_json};

/// Payment state reported by `GET /paymentConfirmation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Payment not yet observed by the backend.
    Pending,
    /// Payment received; the order can be placed.
    Success,
}

#[derive(Debug, Serialize)]
struct ArmPaymentRequest<'a> {
    reference: &'a str,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct PaymentConfirmationResponse {
    status: String,
}

impl ApiClient {
    /// Persist a placed order (`POST /save-order/`).
    ///
    /// Submitted exactly once per checkout; callers never retry.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn save_order(&self, order: &PendingOrder) -> Result<(), ApiError> {
        let response = self.post_json("save-order/", order).await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Tell the backend to expect a payment (`POST /paymentConfirmation/`).
    ///
    /// `reference` is the client-generated key the poll is matched on.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn arm_payment_confirmation(
        &self,
        reference: &str,
        amount: Decimal,
    ) -> Result<(), ApiError> {
        let response = self
            .post_json(
                "paymentConfirmation/",
                &ArmPaymentRequest { reference, amount },
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Poll the payment confirmation state (`GET /paymentConfirmation`).
    ///
    /// Anything other than `"success"` counts as pending.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a
    /// malformed body.
    pub async fn poll_payment_confirmation(
        &self,
        reference: &str,
    ) -> Result<PaymentStatus, ApiError> {
        let response = self
            .get(&format!("paymentConfirmation?reference={reference}"))
            .await?;
        let body: PaymentConfirmationResponse = parse_json(response).await?;
        if body.status.eq_ignore_ascii_case("success") {
            Ok(PaymentStatus::Success)
        } else {
            Ok(PaymentStatus::Pending)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_status_parsing() {
        let body: PaymentConfirmationResponse =
            serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(body.status, "pending");
    }

    #[test]
    fn test_arm_payload_shape() {
        let payload = serde_json::to_value(ArmPaymentRequest {
            reference: "ref-1",
            amount: Decimal::new(240, 0),
        })
        .unwrap();
        assert_eq!(payload["reference"], "ref-1");
        assert!(payload.get("amount").is_some());
    }
}
