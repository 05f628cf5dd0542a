//! Core types for VocalShop.
//!
//! This module provides the domain types shared between the widget service
//! and the CLI.

pub mod cart;
pub mod catalog;
pub mod query;

pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, CatalogError, Product, Variant};
pub use query::{Intent, ParsedQuery};
