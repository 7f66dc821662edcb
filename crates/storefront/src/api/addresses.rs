//! Saved-address endpoints.

use candleworks_core::{AddressId, DeliveryAddress};

use super::{ApiClient, ApiError, expect_success, parse_json};

impl ApiClient {
    /// Fetch the user's saved addresses (`GET /fetchaddress/`).
    ///
    /// The first entry, when present, is the delivery address used by the
    /// cart view.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a
    /// malformed body.
    pub async fn fetch_addresses(&self) -> Result<Vec<DeliveryAddress>, ApiError> {
        let response = self.get("fetchaddress/").await?;
        parse_json(response).await
    }

    /// Add a new address (`POST /user-addresses/`), returning the saved copy
    /// with its backend-assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn add_address(&self, address: &DeliveryAddress) -> Result<DeliveryAddress, ApiError> {
        let response = self.post_json("user-addresses/", address).await?;
        parse_json(response).await
    }

    /// Update an existing address (`PUT /user-addresses/`), returning the
    /// saved copy.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn update_address(
        &self,
        address: &DeliveryAddress,
    ) -> Result<DeliveryAddress, ApiError> {
        let response = self.put_json("user-addresses/", address).await?;
        parse_json(response).await
    }

    /// Delete an address (`DELETE /user-addresses/?address_id=...`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let response = self
            .delete(&format!("user-addresses/?address_id={id}"))
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}
