//! CLI command implementations.

pub mod catalog;
pub mod query;

use std::path::Path;

use vocalshop_core::Catalog;

/// Load a catalog from a file, or the embedded demo catalog when no file
/// is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(Catalog::from_json(&raw)?)
        }
        None => Ok(vocalshop_widget::catalog::embedded_demo()?),
    }
}
