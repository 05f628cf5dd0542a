//! Catalog types and validation.
//!
//! A catalog is an ordered list of [`Product`]s, each carrying at least one
//! purchasable [`Variant`]. Catalogs are loaded once from an embedded source
//! or an external URL and never mutated afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A purchasable size/option of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    /// Display title, typically a size label ("S", "M", "42"...).
    pub title: String,
    /// Price in the currency's standard unit (e.g., euros, not cents).
    pub price: Decimal,
    /// ISO 4217 currency code ("EUR").
    pub currency: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// A catalog product with its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Free-text haystack used for matching: title, description and tags.
    #[must_use]
    pub fn haystack(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.tags.iter().map(String::len).sum::<usize>(),
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }

    /// First variant flagged as available, if any.
    #[must_use]
    pub fn first_available_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.available)
    }
}

/// Catalog validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("product {index}: empty {field}")]
    EmptyField { index: usize, field: &'static str },
    #[error("product {product}: no variants")]
    NoVariants { product: String },
    #[error("product {product}, variant {variant}: empty {field}")]
    EmptyVariantField {
        product: String,
        variant: String,
        field: &'static str,
    },
    #[error("product {product}, variant {variant}: negative price")]
    NegativePrice { product: String, variant: String },
    #[error("product {product}, variant {variant}: currency must be a 3-letter code (got {currency:?})")]
    BadCurrency {
        product: String,
        variant: String,
        currency: String,
    },
}

/// Wire format: either a bare array or `{ "products": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Array(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

/// A validated, ordered product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from already-deserialized products, validating each.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] encountered, in catalog order.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        for (index, product) in products.iter().enumerate() {
            validate_product(index, product)?;
        }
        Ok(Self { products })
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// Accepts either a bare JSON array of products or a wrapped
    /// `{ "products": [...] }` object.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] on malformed JSON, or the first
    /// validation error otherwise.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let products = match document {
            CatalogDocument::Array(products) | CatalogDocument::Wrapped { products } => products,
        };
        Self::new(products)
    }

    /// Products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a variant by id, together with its owning product.
    #[must_use]
    pub fn find_variant(&self, variant_id: &str) -> Option<(&Product, &Variant)> {
        self.products.iter().find_map(|product| {
            product
                .variants
                .iter()
                .find(|variant| variant.id == variant_id)
                .map(|variant| (product, variant))
        })
    }
}

fn validate_product(index: usize, product: &Product) -> Result<(), CatalogError> {
    if product.id.trim().is_empty() {
        return Err(CatalogError::EmptyField { index, field: "id" });
    }
    if product.title.trim().is_empty() {
        return Err(CatalogError::EmptyField {
            index,
            field: "title",
        });
    }
    if product.variants.is_empty() {
        return Err(CatalogError::NoVariants {
            product: product.id.clone(),
        });
    }
    for variant in &product.variants {
        validate_variant(&product.id, variant)?;
    }
    Ok(())
}

fn validate_variant(product_id: &str, variant: &Variant) -> Result<(), CatalogError> {
    if variant.id.trim().is_empty() {
        return Err(CatalogError::EmptyVariantField {
            product: product_id.to_string(),
            variant: variant.title.clone(),
            field: "id",
        });
    }
    if variant.title.trim().is_empty() {
        return Err(CatalogError::EmptyVariantField {
            product: product_id.to_string(),
            variant: variant.id.clone(),
            field: "title",
        });
    }
    if variant.price.is_sign_negative() {
        return Err(CatalogError::NegativePrice {
            product: product_id.to_string(),
            variant: variant.id.clone(),
        });
    }
    if variant.currency.len() != 3 || !variant.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CatalogError::BadCurrency {
            product: product_id.to_string(),
            variant: variant.id.clone(),
            currency: variant.currency.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_json() -> &'static str {
        r#"[
            {
                "id": "chemise-lin-bleue",
                "title": "Chemise en lin bleu marine",
                "description": "Coupe droite, lin lavé.",
                "tags": ["chemise", "bleu", "lin"],
                "variants": [
                    { "id": "chemise-lin-bleue-m", "title": "M", "price": 49.9, "currency": "EUR" }
                ]
            }
        ]"#
    }

    #[test]
    fn test_parse_bare_array() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.len(), 1);
        let product = &catalog.products()[0];
        assert_eq!(product.id, "chemise-lin-bleue");
        // available defaults to true when absent
        assert!(product.variants[0].available);
        assert_eq!(product.variants[0].price, dec!(49.9));
    }

    #[test]
    fn test_parse_wrapped_object() {
        let wrapped = format!(r#"{{ "products": {} }}"#, sample_json());
        let catalog = Catalog::from_json(&wrapped).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_empty_id() {
        let json = r#"[{ "id": " ", "title": "X", "variants": [
            { "id": "v", "title": "M", "price": 1, "currency": "EUR" }
        ]}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::EmptyField { field: "id", .. })
        ));
    }

    #[test]
    fn test_rejects_missing_variants() {
        let json = r#"[{ "id": "p", "title": "X", "variants": [] }]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NoVariants { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_price() {
        let json = r#"[{ "id": "p", "title": "X", "variants": [
            { "id": "v", "title": "M", "price": -1, "currency": "EUR" }
        ]}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NegativePrice { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_currency() {
        let json = r#"[{ "id": "p", "title": "X", "variants": [
            { "id": "v", "title": "M", "price": 1, "currency": "EURO" }
        ]}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::BadCurrency { .. })
        ));
    }

    #[test]
    fn test_find_variant() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        let (product, variant) = catalog.find_variant("chemise-lin-bleue-m").unwrap();
        assert_eq!(product.id, "chemise-lin-bleue");
        assert_eq!(variant.title, "M");
        assert!(catalog.find_variant("unknown").is_none());
    }

    #[test]
    fn test_haystack_joins_title_description_tags() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        let haystack = catalog.products()[0].haystack();
        assert!(haystack.contains("Chemise en lin"));
        assert!(haystack.contains("Coupe droite"));
        assert!(haystack.contains("bleu"));
    }
}
