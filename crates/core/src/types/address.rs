//! Delivery address owned by the user profile.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A saved delivery address.
///
/// Fetched once per cart view; the first saved address is used as the
/// delivery address for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// Backend-assigned ID. `None` for an address not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub mobile_number: String,
}

impl DeliveryAddress {
    /// One-line summary for logs and the shell.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {} {} ({})",
            self.full_name, self.city, self.state, self.postal_code, self.mobile_number
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{
            "full_name": "Jnana Das",
            "address_line1": "12 MG Road",
            "city": "Bangalore",
            "state": "Karnataka",
            "postal_code": "560034",
            "country": "India",
            "mobile_number": "+916370610827"
        }"#;
        let address: DeliveryAddress = serde_json::from_str(json).unwrap();
        assert!(address.id.is_none());
        assert!(address.address_line2.is_none());
        assert_eq!(address.city, "Bangalore");
    }

    #[test]
    fn test_summary() {
        let address = DeliveryAddress {
            id: Some(AddressId::new(1)),
            full_name: "Jnana Das".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Bangalore".to_string(),
            state: "Karnataka".to_string(),
            postal_code: "560034".to_string(),
            country: "India".to_string(),
            mobile_number: "+916370610827".to_string(),
        };
        assert!(address.summary().contains("Bangalore"));
    }
}
