//! The application root object.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::CheckoutFlow;
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::session::SessionManager;

/// The storefront engine root: owns the API client, session manager, cart
/// store and checkout flow, and hands out references to consumers.
///
/// This struct is cheaply cloneable via `Arc`. It replaces ambient global
/// state: the application root constructs one and passes it (or its parts)
/// down explicitly.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionManager,
    cart: CartStore,
    checkout: CheckoutFlow,
}

impl Storefront {
    /// Build the engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let api = ApiClient::new(config.api_base_url.clone())?;
        let session = SessionManager::new(
            api.clone(),
            config.idle_timeout,
            config.session_timeout,
        );
        let cart = CartStore::new(api.clone());
        let checkout = CheckoutFlow::new(api.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cart,
                checkout,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the checkout flow.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutFlow {
        &self.inner.checkout
    }
}
