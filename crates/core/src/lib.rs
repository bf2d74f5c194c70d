//! Ecwid Shop Core - Shared types library.
//!
//! This crate provides common types used across all Ecwid Shop components:
//! - `storefront` - Catalog client, cart manager and local storage
//! - `cli` - Command-line views over the catalog and the cart
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
