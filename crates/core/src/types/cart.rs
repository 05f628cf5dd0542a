//! Cart types.
//!
//! The cart is an ordered list of lines, unique by variant id. Display
//! fields (title, price, image) are denormalized from the catalog at add
//! time and never re-validated afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Product, Variant};

/// One cart line: a variant with a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: String,
    pub title: String,
    pub variant_title: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Build a line from catalog data, denormalizing the display fields.
    ///
    /// Quantity is clamped to at least 1.
    #[must_use]
    pub fn from_catalog(product: &Product, variant: &Variant, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            title: product.title.clone(),
            variant_title: variant.title.clone(),
            price: variant.price,
            currency: variant.currency.clone(),
            image: product.image.clone(),
            quantity: quantity.max(1),
        }
    }

    /// Line total (price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An ordered list of cart lines, unique by variant id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals. Currencies are not mixed in practice; the demo
    /// catalog is single-currency and the amount is summed as-is.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Currency code of the first line, if any.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.lines.first().map(|line| line.currency.as_str())
    }

    /// Add a line, merging with an existing line for the same variant by
    /// incrementing its quantity.
    pub fn add_or_merge(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.variant_id == line.variant_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    /// Set a line's quantity. A quantity of 0 removes the line.
    ///
    /// Returns `false` if no line matches the variant id.
    pub fn set_quantity(&mut self, variant_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(variant_id);
        }
        match self
            .lines
            .iter_mut()
            .find(|line| line.variant_id == variant_id)
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a variant. Returns `false` if absent.
    pub fn remove(&mut self, variant_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.variant_id != variant_id);
        self.lines.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(variant_id: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: "p1".to_string(),
            variant_id: variant_id.to_string(),
            title: "Chemise en lin bleu marine".to_string(),
            variant_title: "M".to_string(),
            price: dec!(49.9),
            currency: "EUR".to_string(),
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = Cart::new();
        cart.add_or_merge(line("v1", 2));
        cart.add_or_merge(line("v1", 3));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_add_keeps_distinct_variants_ordered() {
        let mut cart = Cart::new();
        cart.add_or_merge(line("v1", 1));
        cart.add_or_merge(line("v2", 1));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].variant_id, "v1");
        assert_eq!(cart.lines()[1].variant_id, "v2");
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_or_merge(line("v1", 2));
        assert!(cart.set_quantity("v1", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_variant() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity("missing", 3));
    }

    #[test]
    fn test_subtotal_and_count() {
        let mut cart = Cart::new();
        cart.add_or_merge(line("v1", 2));
        let mut other = line("v2", 1);
        other.price = dec!(10);
        cart.add_or_merge(other);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), dec!(109.8));
        assert_eq!(cart.currency(), Some("EUR"));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_or_merge(line("v1", 1));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_from_catalog_clamps_quantity() {
        let product = Product {
            id: "p".to_string(),
            title: "T".to_string(),
            description: String::new(),
            image: None,
            tags: Vec::new(),
            variants: vec![Variant {
                id: "v".to_string(),
                title: "M".to_string(),
                price: dec!(1),
                currency: "EUR".to_string(),
                available: true,
            }],
        };
        let built = CartLine::from_catalog(&product, &product.variants[0], 0);
        assert_eq!(built.quantity, 1);
    }
}
