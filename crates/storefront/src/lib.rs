//! Candleworks storefront client engine.
//!
//! Everything that runs on the client side of the candle store, minus
//! rendering: the backend (auth service, catalog, Redis-backed cart hashmap,
//! order persistence, payment confirmation) is consumed as opaque REST
//! endpoints.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - typed REST client (reqwest, cookie jar + bearer
//!   token), with a moka cache in front of catalog reads
//! - [`session::SessionManager`] - auth probe, idle and hard logout timers,
//!   explicit logout; publishes state over a `watch` channel
//! - [`cart::CartStore`] - optimistic local cart state synchronized with the
//!   remote `cart_data` hashmap through a per-key write queue
//! - [`checkout::CheckoutFlow`] - order totals, payment delegation, one-shot
//!   order submission, and the QR payment-confirmation poll
//! - [`Storefront`] - the application root object owning all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use candleworks_storefront::{Storefront, StorefrontConfig};
//!
//! let config = StorefrontConfig::from_env()?;
//! let store = Storefront::new(config)?;
//!
//! // Gate protected views on the probe result.
//! let state = store.session().start().await;
//!
//! store.session().login("jnana", "hunter2!").await?;
//! store.cart().load().await;
//! store.cart().commit_quantity("Lavender Bliss", "3");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
mod state;

pub use config::{StorefrontConfig, UpiPayee};
pub use error::StorefrontError;
pub use state::Storefront;
