//! Unified error type for storefront consumers.
//!
//! Module-level errors (`ApiError`, `ConfigError`, `CheckoutError`) stay
//! close to the code that produces them; this enum exists so an application
//! root (the CLI, an embedding UI) can hold one error type.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error for the storefront engine.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration failed to load.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorefrontError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }
}
