//! Remote cart hashmap endpoints.
//!
//! The cart lives in a Redis-like per-user hashmap: one entry per product
//! name in the `cart_data` namespace, each value a JSON-encoded
//! [`CartRecord`]. This module speaks the raw wire shape; projection into
//! [`candleworks_core::CartItem`] happens in the cart store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use candleworks_core::CartRecord;

use super::{ApiClient, ApiError, expect_success, parse_json};

/// Hashmap namespace holding the cart.
pub const CART_NAMESPACE: &str = "cart_data";

/// Upsert/delete payload for `POST /cart/update/` and `POST /cart/delete/`.
#[derive(Debug, Serialize)]
struct CartMutation<'a> {
    hashmap: &'a str,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

/// Response envelope of `GET /cart/query/`.
#[derive(Debug, Deserialize)]
struct CartQueryResponse {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

impl ApiClient {
    /// Fetch every entry of the `cart_data` hashmap.
    ///
    /// Values are returned as raw JSON strings, keyed by product name,
    /// in deterministic (name) order.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a
    /// malformed envelope.
    pub async fn query_cart(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let response = self
            .get(&format!("cart/query/?hashmap={CART_NAMESPACE}"))
            .await?;
        let envelope: CartQueryResponse = parse_json(response).await?;
        Ok(envelope.data)
    }

    /// Upsert one cart entry (`POST /cart/update/`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or if the
    /// record fails to serialize.
    pub async fn upsert_cart_entry(&self, key: &str, record: &CartRecord) -> Result<(), ApiError> {
        let value = serde_json::to_string(record).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self
            .post_json(
                "cart/update/",
                &CartMutation {
                    hashmap: CART_NAMESPACE,
                    key,
                    value: Some(value),
                },
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Delete one cart entry (`POST /cart/delete/`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn delete_cart_entry(&self, key: &str) -> Result<(), ApiError> {
        let response = self
            .post_json(
                "cart/delete/",
                &CartMutation {
                    hashmap: CART_NAMESPACE,
                    key,
                    value: None,
                },
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_omits_value_on_delete() {
        let payload = serde_json::to_value(CartMutation {
            hashmap: CART_NAMESPACE,
            key: "Lavender Bliss",
            value: None,
        })
        .unwrap();
        assert_eq!(payload["hashmap"], "cart_data");
        assert_eq!(payload["key"], "Lavender Bliss");
        assert!(payload.get("value").is_none());
    }

    #[test]
    fn test_query_envelope_defaults_to_empty() {
        let envelope: CartQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
    }
}
