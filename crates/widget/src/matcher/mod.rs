//! Catalog matching: relaxation search and add-to-cart selection.
//!
//! The search path filters the whole catalog through a sequence of
//! progressively relaxed passes and stops at the first pass that yields at
//! least one result. Precision is deliberately traded for recall: showing
//! something beats an empty panel in a demo setting, and there is no
//! statistical relevance model.

mod add;

pub use add::{AddOutcome, AddSelection, choose_add_target};

use serde::Serialize;
use vocalshop_core::{Catalog, ParsedQuery, Product};

use crate::nlu::{color_surfaces, normalize, type_surfaces};

/// Tunable matching thresholds.
///
/// These started life as magic constants; they are policy, not law, and can
/// be overridden from the environment.
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Minimum add-to-cart score before the assistant refuses to guess.
    pub add_score_threshold: i32,
    /// Half-width of the price window for "autour de N".
    pub price_around_margin: u32,
    /// Price slack when hunting for suggestions.
    pub suggestion_price_margin: u32,
    /// Maximum number of suggestions.
    pub max_suggestions: usize,
    /// Suggestions are only computed when fewer results than this.
    pub suggestion_trigger: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            add_score_threshold: 3,
            price_around_margin: 10,
            suggestion_price_margin: 20,
            max_suggestions: 6,
            suggestion_trigger: 3,
        }
    }
}

/// One filtering attempt in the relaxation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationPass {
    /// Text, type, color and price all enforced.
    Strict,
    /// Price constraint dropped.
    NoPrice,
    /// Price and color dropped.
    NoColor,
    /// Price, color and type dropped (text only).
    NoType,
    /// Everything dropped; last resort.
    Everything,
}

impl RelaxationPass {
    const ALL: [Self; 5] = [
        Self::Strict,
        Self::NoPrice,
        Self::NoColor,
        Self::NoType,
        Self::Everything,
    ];

    /// 1-based pass number as reported in the trace.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Strict => 1,
            Self::NoPrice => 2,
            Self::NoColor => 3,
            Self::NoType => 4,
            Self::Everything => 5,
        }
    }

    /// French description of what the pass still filters on.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strict => "filtre strict",
            Self::NoPrice => "sans contrainte de prix",
            Self::NoColor => "sans prix ni couleur",
            Self::NoType => "texte seul",
            Self::Everything => "catalogue complet",
        }
    }

    const fn keeps_price(self) -> bool {
        matches!(self, Self::Strict)
    }

    const fn keeps_color(self) -> bool {
        matches!(self, Self::Strict | Self::NoPrice)
    }

    const fn keeps_type(self) -> bool {
        matches!(self, Self::Strict | Self::NoPrice | Self::NoColor)
    }

    const fn keeps_text(self) -> bool {
        !matches!(self, Self::Everything)
    }
}

/// Results of a search, with the pass that produced them and a
/// human-readable trace.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<Product>,
    pub suggestions: Vec<Product>,
    pub pass: RelaxationPass,
    pub trace: Vec<String>,
}

/// Search the catalog for the parsed query.
///
/// Passes 1 to 5 each re-filter the whole catalog; the first non-empty pass
/// wins. When the winning pass yields fewer than `suggestion_trigger`
/// results, up to `max_suggestions` further products that loosely match
/// type OR color OR price are appended as suggestions, in catalog order.
#[must_use]
pub fn search(catalog: &Catalog, query: &ParsedQuery, policy: &MatchPolicy) -> SearchOutcome {
    let tokens = query_tokens(&query.query_text);
    let mut trace = Vec::new();

    let mut winner: Option<(RelaxationPass, Vec<Product>)> = None;
    for pass in RelaxationPass::ALL {
        let results: Vec<Product> = catalog
            .products()
            .iter()
            .filter(|product| pass_matches(product, query, &tokens, pass))
            .cloned()
            .collect();

        if results.is_empty() {
            trace.push(format!(
                "Passe {} : 0 resultat ({})",
                pass.number(),
                pass.label()
            ));
        } else {
            trace.push(format!(
                "Passe {} : {} resultat(s) ({})",
                pass.number(),
                results.len(),
                pass.label()
            ));
            winner = Some((pass, results));
            break;
        }
    }

    // Pass 5 returns the whole catalog, so this only stays None when the
    // catalog itself is empty.
    let (pass, results) = winner.unwrap_or((RelaxationPass::Everything, Vec::new()));

    let suggestions = if results.len() < policy.suggestion_trigger {
        suggest(catalog, query, &results, policy)
    } else {
        Vec::new()
    };

    SearchOutcome {
        results,
        suggestions,
        pass,
        trace,
    }
}

fn pass_matches(
    product: &Product,
    query: &ParsedQuery,
    tokens: &[String],
    pass: RelaxationPass,
) -> bool {
    let haystack = normalize(&product.haystack());

    if pass.keeps_text() && !text_matches(&haystack, tokens) {
        return false;
    }
    if pass.keeps_type() {
        if let Some(product_type) = &query.product_type {
            if !type_matches(&haystack, product_type) {
                return false;
            }
        }
    }
    if pass.keeps_color() {
        if let Some(color) = &query.color {
            if !color_matches(&haystack, color) {
                return false;
            }
        }
    }
    if pass.keeps_price() && !price_matches(product, query.price_min, query.price_max) {
        return false;
    }
    true
}

/// Secondary pass: products not already in the results that loosely match
/// type OR color OR price within the suggestion margin, in catalog order.
fn suggest(
    catalog: &Catalog,
    query: &ParsedQuery,
    results: &[Product],
    policy: &MatchPolicy,
) -> Vec<Product> {
    let margin = policy.suggestion_price_margin;
    catalog
        .products()
        .iter()
        .filter(|product| !results.iter().any(|r| r.id == product.id))
        .filter(|product| {
            let haystack = normalize(&product.haystack());
            let by_type = query
                .product_type
                .as_ref()
                .is_some_and(|t| type_matches(&haystack, t));
            let by_color = query
                .color
                .as_ref()
                .is_some_and(|c| color_matches(&haystack, c));
            let by_price = (query.price_min.is_some() || query.price_max.is_some())
                && price_matches(
                    product,
                    query.price_min.map(|min| min.saturating_sub(margin)),
                    query.price_max.map(|max| max.saturating_add(margin)),
                );
            by_type || by_color || by_price
        })
        .take(policy.max_suggestions)
        .cloned()
        .collect()
}

// =============================================================================
// Match predicates (shared with the add path)
// =============================================================================

/// Words too generic to discriminate products; mostly grammar plus the
/// price/size vocabulary the slot extractors already consumed.
const STOPWORDS: &[&str] = &[
    "les", "des", "une", "aux", "pour", "avec", "sans", "dans", "moins", "plus", "entre",
    "environ", "autour", "vers", "max", "maximum", "jusqu", "taille", "euro", "euros", "cherche",
    "chercher", "trouve", "trouver", "montre", "montrer", "voudrais", "veux", "ajoute", "ajouter",
    "mets", "mettre", "panier", "peux",
];

/// Tokens of the normalized query worth matching against product text.
pub(crate) fn query_tokens(query_text: &str) -> Vec<String> {
    query_text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 3 && !STOPWORDS.contains(token))
        .map(ToString::to_string)
        .collect()
}

/// A product matches the query text when any usable token appears in its
/// normalized haystack. With no usable tokens the constraint is vacuous.
pub(crate) fn text_matches(haystack: &str, tokens: &[String]) -> bool {
    tokens.is_empty() || tokens.iter().any(|token| haystack.contains(token))
}

/// Any surface form of the canonical type appears in the haystack.
pub(crate) fn type_matches(haystack: &str, canonical: &str) -> bool {
    type_surfaces(canonical).map_or_else(
        || haystack.contains(canonical),
        |surfaces| surfaces.iter().any(|surface| haystack.contains(surface)),
    )
}

/// Any surface form of the canonical color appears in the haystack.
pub(crate) fn color_matches(haystack: &str, canonical: &str) -> bool {
    color_surfaces(canonical).map_or_else(
        || haystack.contains(canonical),
        |surfaces| surfaces.iter().any(|surface| haystack.contains(surface)),
    )
}

/// Any variant priced inside the requested bounds. Vacuous when neither
/// bound is present.
pub(crate) fn price_matches(product: &Product, min: Option<u32>, max: Option<u32>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    product.variants.iter().any(|variant| {
        let above = min.is_none_or(|min| variant.price >= rust_decimal::Decimal::from(min));
        let below = max.is_none_or(|max| variant.price <= rust_decimal::Decimal::from(max));
        above && below
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::nlu::parse_utterance;
    use rust_decimal_macros::dec;
    use vocalshop_core::Variant;

    fn variant(id: &str, title: &str, price: rust_decimal::Decimal, available: bool) -> Variant {
        Variant {
            id: id.to_string(),
            title: title.to_string(),
            price,
            currency: "EUR".to_string(),
            available,
        }
    }

    fn product(id: &str, title: &str, tags: &[&str], variants: Vec<Variant>) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            image: None,
            tags: tags.iter().map(ToString::to_string).collect(),
            variants,
        }
    }

    /// Small fixture catalog shared with the add-path tests.
    pub(crate) fn fixture_catalog() -> Catalog {
        Catalog::new(vec![
            product(
                "tshirt-blanc",
                "Tee-shirt blanc coton bio",
                &["tee-shirt", "blanc"],
                vec![variant("tshirt-blanc-m", "M", dec!(19.9), true)],
            ),
            product(
                "chemise-lin-bleue",
                "Chemise en lin bleu marine",
                &["chemise", "bleu", "lin"],
                vec![
                    variant("chemise-lin-bleue-m", "M", dec!(49.9), true),
                    variant("chemise-lin-bleue-l", "L", dec!(49.9), false),
                ],
            ),
            product(
                "chemise-blanche",
                "Chemise blanche popeline",
                &["chemise", "blanc"],
                vec![variant("chemise-blanche-m", "M", dec!(79.0), true)],
            ),
            product(
                "baskets-noires",
                "Baskets noires en cuir",
                &["baskets", "sneakers", "noir"],
                vec![
                    variant("baskets-noires-41", "41", dec!(89.0), true),
                    variant("baskets-noires-42", "42", dec!(89.0), false),
                ],
            ),
            product(
                "robe-rouge",
                "Robe rouge en coton",
                &["robe", "rouge"],
                vec![variant("robe-rouge-s", "S", dec!(49.0), true)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_strict_pass_matches_example_query() {
        let catalog = fixture_catalog();
        let query = parse_utterance("chemise bleue taille M à moins de 60 euros", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());

        assert_eq!(outcome.pass, RelaxationPass::Strict);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].id, "chemise-lin-bleue");
        assert!(outcome.trace.iter().any(|line| line.starts_with("Passe 1")));
    }

    #[test]
    fn test_price_relaxation_reports_pass_2() {
        let catalog = fixture_catalog();
        // Strict fails: the blue shirt costs 49.9, above the 30 cap.
        let query = parse_utterance("chemise bleue à moins de 30 euros", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());

        assert_eq!(outcome.pass, RelaxationPass::NoPrice);
        assert_eq!(outcome.results[0].id, "chemise-lin-bleue");
        assert!(
            outcome.trace.iter().any(|line| line.contains("Passe 2")),
            "{:?}",
            outcome.trace
        );
    }

    #[test]
    fn test_color_relaxation() {
        let catalog = fixture_catalog();
        // No jaune chemise exists; dropping price then color leaves the
        // type+text match.
        let query = parse_utterance("chemise jaune", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());

        assert_eq!(outcome.pass, RelaxationPass::NoColor);
        assert!(outcome.results.iter().all(|p| p.tags.contains(&"chemise".to_string())));
    }

    #[test]
    fn test_last_resort_returns_everything() {
        let catalog = fixture_catalog();
        let query = parse_utterance("xyzzy introuvable", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());

        assert_eq!(outcome.pass, RelaxationPass::Everything);
        assert_eq!(outcome.results.len(), catalog.len());
    }

    #[test]
    fn test_suggestions_when_few_results() {
        let catalog = fixture_catalog();
        let query = parse_utterance("chemise bleue taille M à moins de 60 euros", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());

        // One result triggers the suggestion pass; the white shirt matches
        // by type, and results are never repeated.
        assert!(!outcome.suggestions.is_empty());
        assert!(outcome.suggestions.iter().any(|p| p.id == "chemise-blanche"));
        assert!(outcome.suggestions.iter().all(|p| p.id != "chemise-lin-bleue"));
        assert!(outcome.suggestions.len() <= MatchPolicy::default().max_suggestions);
    }

    #[test]
    fn test_no_suggestions_when_enough_results() {
        let catalog = fixture_catalog();
        let policy = MatchPolicy {
            suggestion_trigger: 1,
            ..MatchPolicy::default()
        };
        let query = parse_utterance("chemise bleue", 10);
        let outcome = search(&catalog, &query, &policy);
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        let catalog = Catalog::default();
        let query = parse_utterance("chemise", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());
        assert!(outcome.results.is_empty());
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_price_bounds() {
        let catalog = fixture_catalog();
        let query = parse_utterance("chemise entre 60 et 90 euros", 10);
        let outcome = search(&catalog, &query, &MatchPolicy::default());
        assert_eq!(outcome.pass, RelaxationPass::Strict);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].id, "chemise-blanche");
    }
}
