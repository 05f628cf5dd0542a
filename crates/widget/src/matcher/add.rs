//! Add-to-cart target selection.
//!
//! Given a parsed add-to-cart query, narrow the catalog down to candidate
//! products, score them, and pick the variant to add. When the best score
//! stays below the confidence threshold the assistant refuses to guess and
//! asks the user to clarify instead of adding a wrong item.

use vocalshop_core::{Catalog, ParsedQuery, Product, Variant};

use super::{MatchPolicy, color_matches, type_matches};
use crate::nlu::normalize;

/// Outcome of the add-to-cart selection.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// A product/variant was selected with enough confidence.
    Selected(AddSelection),
    /// Confidence too low (or nothing to add): ask the user to clarify.
    NeedsClarification { message: String },
}

/// The product/variant chosen for the cart.
#[derive(Debug, Clone)]
pub struct AddSelection {
    pub product: Product,
    pub variant: Variant,
    pub quantity: u32,
    /// Set when the chosen variant's size differs from the requested one,
    /// so the confirmation message can report the substitution.
    pub substituted_size: Option<String>,
    pub score: i32,
}

/// Pick the product and variant to add for an add-to-cart query.
#[must_use]
pub fn choose_add_target(
    catalog: &Catalog,
    query: &ParsedQuery,
    policy: &MatchPolicy,
) -> AddOutcome {
    if catalog.is_empty() {
        return AddOutcome::NeedsClarification {
            message: "Je n'ai pas trouve de produit a ajouter.".to_string(),
        };
    }

    let candidates = narrow_candidates(catalog.products(), query);

    // Stable max: catalog order breaks ties.
    let mut best: Option<(&Product, i32)> = None;
    for product in candidates {
        let score = score_candidate(product, query);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((product, score));
        }
    }

    let Some((product, score)) = best else {
        return AddOutcome::NeedsClarification {
            message: "Je n'ai pas trouve de produit a ajouter.".to_string(),
        };
    };

    if score < policy.add_score_threshold {
        return AddOutcome::NeedsClarification {
            message: "Je ne suis pas sur du produit a ajouter. Precise le type, la couleur \
                      ou la taille (par exemple : \"mets au panier la chemise bleue en M\")."
                .to_string(),
        };
    }

    let variant = select_variant(product, query.size.as_deref());
    let substituted_size = query.size.as_deref().and_then(|requested| {
        if variant_title_matches(variant, requested) {
            None
        } else {
            Some(variant.title.clone())
        }
    });

    AddOutcome::Selected(AddSelection {
        product: product.clone(),
        variant: variant.clone(),
        quantity: query.quantity_or_default(),
        substituted_size,
        score,
    })
}

/// Narrow by type then color. Each filter is only applied when it leaves at
/// least one candidate; otherwise the unfiltered set is kept.
fn narrow_candidates<'a>(products: &'a [Product], query: &ParsedQuery) -> Vec<&'a Product> {
    let mut candidates: Vec<&Product> = products.iter().collect();

    if let Some(product_type) = &query.product_type {
        let filtered: Vec<&Product> = candidates
            .iter()
            .copied()
            .filter(|p| type_matches(&normalize(&p.haystack()), product_type))
            .collect();
        if !filtered.is_empty() {
            candidates = filtered;
        }
    }
    if let Some(color) = &query.color {
        let filtered: Vec<&Product> = candidates
            .iter()
            .copied()
            .filter(|p| color_matches(&normalize(&p.haystack()), color))
            .collect();
        if !filtered.is_empty() {
            candidates = filtered;
        }
    }
    candidates
}

/// Additive confidence score for one candidate.
fn score_candidate(product: &Product, query: &ParsedQuery) -> i32 {
    let haystack = normalize(&product.haystack());
    let mut score = 0;

    if let Some(product_type) = &query.product_type {
        if type_matches(&haystack, product_type) {
            score += 3;
        } else {
            score -= 3;
        }
    }
    if let Some(color) = &query.color {
        if color_matches(&haystack, color) {
            score += 3;
        } else {
            score -= 4;
        }
    }
    if let Some(size) = &query.size {
        let matching: Vec<&Variant> = product
            .variants
            .iter()
            .filter(|v| variant_title_matches(v, size))
            .collect();
        if matching.iter().any(|v| v.available) {
            score += 3;
        } else if !matching.is_empty() {
            score += 1;
        }
    }
    score
}

/// Case- and diacritic-insensitive size match on a variant title, also
/// accepting the "taille X" labelling and plain substring containment.
fn variant_title_matches(variant: &Variant, size: &str) -> bool {
    let title = normalize(&variant.title);
    let wanted = normalize(size);
    title == wanted || title == format!("taille {wanted}") || title.contains(&wanted)
}

/// Variant choice within the selected product: exact size match if
/// available, then substring match if available, then the first available
/// variant, then the first variant regardless of availability.
fn select_variant<'a>(product: &'a Product, size: Option<&str>) -> &'a Variant {
    if let Some(size) = size {
        let wanted = normalize(size);
        let exact = product.variants.iter().find(|v| {
            let title = normalize(&v.title);
            v.available && (title == wanted || title == format!("taille {wanted}"))
        });
        if let Some(variant) = exact {
            return variant;
        }
        let loose = product
            .variants
            .iter()
            .find(|v| v.available && normalize(&v.title).contains(&wanted));
        if let Some(variant) = loose {
            return variant;
        }
    }
    product
        .first_available_variant()
        .or_else(|| product.variants.first())
        .unwrap_or_else(|| unreachable!("catalog validation guarantees at least one variant"))
}
