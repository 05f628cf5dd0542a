//! Catalog feed tools.

use std::path::Path;

use vocalshop_core::Catalog;

/// Validate a catalog file and print a short summary.
pub fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json(&raw)?;

    let variant_count: usize = catalog
        .products()
        .iter()
        .map(|product| product.variants.len())
        .sum();
    let available = catalog
        .products()
        .iter()
        .flat_map(|product| &product.variants)
        .filter(|variant| variant.available)
        .count();

    println!(
        "{} : valide ({} produits, {} variantes dont {} disponibles)",
        path.display(),
        catalog.len(),
        variant_count,
        available
    );
    Ok(())
}
