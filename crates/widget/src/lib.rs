//! VocalShop widget library.
//!
//! This crate provides the widget service as a library, allowing the NLU
//! and matching layers to be reused (notably by the CLI) and the full
//! router to be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod middleware;
pub mod nlu;
pub mod routes;
pub mod speech;
pub mod state;
