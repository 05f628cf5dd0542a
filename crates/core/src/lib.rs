//! VocalShop Core - Shared types library.
//!
//! This crate provides common types used across all VocalShop components:
//! - `widget` - The assistant HTTP service (catalog, matcher, cart)
//! - `cli` - Command-line tools for running the pipeline offline
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Catalog, cart, and parsed-query types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
