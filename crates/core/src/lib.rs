//! Candleworks Core - Shared types library.
//!
//! This crate provides common types used across all Candleworks components:
//! - `storefront` - Headless storefront client engine
//! - `cli` - Interactive storefront shell
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no timers. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, cart and
//!   order records, and session/payment status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
