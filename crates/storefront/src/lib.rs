//! Ecwid Shop Storefront library.
//!
//! Everything a storefront front end needs below the view layer:
//!
//! - [`catalog`] - Ecwid REST client for products and categories
//! - [`cart`] - Persisted shopping cart with derived totals
//! - [`storage`] - Key-value persistence slots (file-backed or in-memory)
//! - [`locale`] - Persisted interface language preference
//! - [`state`] - Composition root wiring the above together
//!
//! Views (the CLI, or any other front end) construct an [`state::AppState`]
//! once and call into it; there is no process-wide singleton.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod locale;
pub mod state;
pub mod storage;
