//! Natural-language understanding for French shopping utterances.
//!
//! The parser is pure and synchronous: it classifies an utterance as a
//! search or an add-to-cart request and extracts optional slots (product
//! type, color, size, price bounds, quantity) from fixed alias tables and
//! a handful of regexes. Parsing never fails; unset slots stay `None` and
//! the same input always produces the same output.

mod aliases;

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use vocalshop_core::{Intent, ParsedQuery};

pub use aliases::{COLOR_ALIASES, SIZES, TYPE_ALIASES, color_surfaces, type_surfaces};

/// Words that classify an utterance as an add-to-cart request.
/// Matched as substrings of the normalized text, first hit wins.
const ADD_WORDS: &[&str] = &[
    "ajoute", "ajouter", "mets", "met", "mettre", "ajout", "panier",
];

/// Number words understood for quantities (list order wins over text order).
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("un", 1),
    ("une", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
];

/// "moins de 60", "max 80", "<= 50", "jusqu'a 120"
static PRICE_MAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:moins de|max(?:imum)?|<=?|inferieur a|jusqu'?a)\s*(\d{2,4})")
        .expect("valid price-max regex")
});

/// "entre 50 et 80"
static PRICE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"entre\s*(\d{2,4})\s*(?:et|a)\s*(\d{2,4})").expect("valid price-range regex")
});

/// "autour de 60", "vers 60", "environ 60"
static PRICE_AROUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:autour de|vers|environ)\s*(\d{2,4})").expect("valid price-around regex")
});

/// Lowercase and strip diacritics (NFD, drop combining marks).
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Whole-word containment over alphanumeric tokens.
fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// Resolve the first alias table entry whose any surface form is a
/// substring of the normalized text. No scoring among candidates.
fn match_from_aliases(text: &str, aliases: &[(&str, &[&str])]) -> Option<String> {
    for (canonical, surfaces) in aliases {
        if surfaces.iter().any(|surface| text.contains(surface)) {
            return Some((*canonical).to_string());
        }
    }
    None
}

/// Classify the intent of a normalized utterance.
#[must_use]
pub fn detect_intent(text: &str) -> Intent {
    if ADD_WORDS.iter().any(|word| text.contains(word)) {
        Intent::AddToCart
    } else {
        Intent::Search
    }
}

/// Cart-level commands the widget shell understands besides search/add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandIntent {
    /// "vide le panier", "vider le panier"
    ClearCart,
    /// "valider", "payer", "checkout", "caisse"
    Checkout,
}

static CLEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bvider?\s+(le\s+)?panier\b").expect("valid clear regex"));
static CHECKOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(valider?|payer?|paiement|checkout|caisse)\b").expect("valid checkout regex")
});

/// Detect cart commands. Checked before intent parsing so that
/// "vide le panier" is not mistaken for an add ("panier" is an add word).
#[must_use]
pub fn detect_command(text: &str) -> Option<CommandIntent> {
    if CLEAR_RE.is_match(text) {
        return Some(CommandIntent::ClearCart);
    }
    if CHECKOUT_RE.is_match(text) {
        return Some(CommandIntent::Checkout);
    }
    None
}

/// Parse a raw utterance into intent and slots.
///
/// Extraction order for prices: explicit maximum, then "entre N et M"
/// (which overrides both bounds), then "autour de N" mapped to
/// `[N - around_margin, N + around_margin]` only when no maximum was
/// already found.
#[must_use]
pub fn parse_utterance(utterance: &str, around_margin: u32) -> ParsedQuery {
    let text = normalize(utterance);
    let intent = detect_intent(&text);

    let mut price_min: Option<u32> = None;
    let mut price_max: Option<u32> = None;

    if let Some(captures) = PRICE_MAX_RE.captures(&text) {
        price_max = captures.get(1).and_then(|m| m.as_str().parse().ok());
    }
    if let Some(captures) = PRICE_RANGE_RE.captures(&text) {
        price_min = captures.get(1).and_then(|m| m.as_str().parse().ok());
        price_max = captures.get(2).and_then(|m| m.as_str().parse().ok());
    }
    if price_max.is_none() {
        if let Some(captures) = PRICE_AROUND_RE.captures(&text) {
            if let Some(base) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                price_min = Some(base.saturating_sub(around_margin));
                price_max = Some(base + around_margin);
            }
        }
    }

    let mut quantity = NUMBER_WORDS
        .iter()
        .find(|(word, _)| contains_word(&text, word))
        .map(|(_, n)| *n);
    if quantity.is_none() {
        quantity = text
            .split(|c: char| !c.is_alphanumeric())
            .find_map(|token| match token.as_bytes() {
                [d @ b'1'..=b'9'] => Some(u32::from(d - b'0')),
                _ => None,
            });
    }

    let color = match_from_aliases(&text, COLOR_ALIASES);
    let product_type = match_from_aliases(&text, TYPE_ALIASES);

    let size = SIZES
        .iter()
        .find(|size| contains_word(&text, &normalize(size)))
        .map(|size| (*size).to_string());

    ParsedQuery {
        intent,
        query_text: text,
        product_type,
        color,
        size,
        price_min,
        price_max,
        quantity,
    }
}

/// French one-liner echoing what was understood, spoken before acting.
#[must_use]
pub fn spoken_summary(parsed: &ParsedQuery) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(product_type) = &parsed.product_type {
        parts.push(product_type.clone());
    }
    if let Some(color) = &parsed.color {
        parts.push(color.clone());
    }
    if let Some(size) = &parsed.size {
        parts.push(format!("taille {size}"));
    }
    match (parsed.price_min, parsed.price_max) {
        (Some(min), Some(max)) => parts.push(format!("entre {min} et {max} euros")),
        (_, Some(max)) => parts.push(format!("a moins de {max} euros")),
        _ => {}
    }

    match parsed.intent {
        Intent::AddToCart => {
            if parts.is_empty() {
                "D'accord, j'ajoute l'article correspondant au panier si je le trouve.".to_string()
            } else {
                format!("D'accord, j'ajoute {} au panier.", parts.join(", "))
            }
        }
        Intent::Search => {
            if parts.is_empty() {
                "Tres bien, je regarde ce que je trouve.".to_string()
            } else {
                format!("D'accord, je cherche {}.", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const AROUND: u32 = 10;

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize("Chemise Bleue à moins de 60 €"), "chemise bleue a moins de 60 €");
        assert_eq!(normalize("jusqu'à"), "jusqu'a");
    }

    #[test]
    fn test_add_phrases_classify_as_add_to_cart() {
        for utterance in [
            "ajoute la chemise bleue",
            "mets au panier les baskets noires",
            "tu peux ajouter une robe",
            "panier",
        ] {
            assert_eq!(
                parse_utterance(utterance, AROUND).intent,
                Intent::AddToCart,
                "{utterance}"
            );
        }
    }

    #[test]
    fn test_other_phrases_classify_as_search() {
        for utterance in ["chemise bleue", "je cherche une robe rouge", ""] {
            assert_eq!(
                parse_utterance(utterance, AROUND).intent,
                Intent::Search,
                "{utterance}"
            );
        }
    }

    #[test]
    fn test_price_max_only() {
        let parsed = parse_utterance("un pantalon a moins de 75 euros", AROUND);
        assert_eq!(parsed.price_max, Some(75));
        assert_eq!(parsed.price_min, None);
    }

    #[test]
    fn test_price_max_variants() {
        assert_eq!(parse_utterance("max 80", AROUND).price_max, Some(80));
        assert_eq!(parse_utterance("maximum 80", AROUND).price_max, Some(80));
        assert_eq!(parse_utterance("<= 50", AROUND).price_max, Some(50));
        assert_eq!(parse_utterance("jusqu'à 120", AROUND).price_max, Some(120));
    }

    #[test]
    fn test_price_range() {
        let parsed = parse_utterance("une veste entre 50 et 80 euros", AROUND);
        assert_eq!(parsed.price_min, Some(50));
        assert_eq!(parsed.price_max, Some(80));
    }

    #[test]
    fn test_price_around_expands_to_margin() {
        let parsed = parse_utterance("une chemise autour de 60", AROUND);
        assert_eq!(parsed.price_min, Some(50));
        assert_eq!(parsed.price_max, Some(70));
    }

    #[test]
    fn test_explicit_max_wins_over_around() {
        let parsed = parse_utterance("moins de 40, environ 60", AROUND);
        assert_eq!(parsed.price_max, Some(40));
        assert_eq!(parsed.price_min, None);
    }

    #[test]
    fn test_quantity_words_and_digits() {
        assert_eq!(parse_utterance("deux chemises", AROUND).quantity, Some(2));
        assert_eq!(parse_utterance("3 robes", AROUND).quantity, Some(3));
        // "60" is not a standalone single digit
        assert_eq!(parse_utterance("moins de 60", AROUND).quantity, None);
    }

    #[test]
    fn test_color_and_type_aliases() {
        let parsed = parse_utterance("des sneakers marine", AROUND);
        assert_eq!(parsed.product_type.as_deref(), Some("baskets"));
        assert_eq!(parsed.color.as_deref(), Some("bleu"));
    }

    #[test]
    fn test_size_whole_word_only() {
        let parsed = parse_utterance("chemise taille m", AROUND);
        assert_eq!(parsed.size.as_deref(), Some("M"));
        // "m" inside a word must not match
        let parsed = parse_utterance("chemise marine", AROUND);
        assert_eq!(parsed.size, None);
    }

    #[test]
    fn test_full_example_utterance() {
        let parsed = parse_utterance("chemise bleue taille M à moins de 60 euros", AROUND);
        assert_eq!(parsed.intent, Intent::Search);
        assert_eq!(parsed.product_type.as_deref(), Some("chemise"));
        assert_eq!(parsed.color.as_deref(), Some("bleu"));
        assert_eq!(parsed.size.as_deref(), Some("M"));
        assert_eq!(parsed.price_max, Some(60));
        assert_eq!(parsed.price_min, None);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let a = parse_utterance("mets deux baskets noires en 42 au panier", AROUND);
        let b = parse_utterance("mets deux baskets noires en 42 au panier", AROUND);
        assert_eq!(a, b);
        assert_eq!(a.intent, Intent::AddToCart);
        assert_eq!(a.size.as_deref(), Some("42"));
        assert_eq!(a.quantity, Some(2));
    }

    #[test]
    fn test_detect_command() {
        assert_eq!(
            detect_command(&normalize("vide le panier")),
            Some(CommandIntent::ClearCart)
        );
        assert_eq!(
            detect_command(&normalize("vider panier")),
            Some(CommandIntent::ClearCart)
        );
        assert_eq!(
            detect_command(&normalize("passer à la caisse")),
            Some(CommandIntent::Checkout)
        );
        assert_eq!(detect_command(&normalize("mets au panier la robe")), None);
    }

    #[test]
    fn test_spoken_summary_search() {
        let parsed = parse_utterance("chemise bleue taille M à moins de 60 euros", AROUND);
        let summary = spoken_summary(&parsed);
        assert!(summary.contains("je cherche"), "{summary}");
        assert!(summary.contains("chemise"), "{summary}");
        assert!(summary.contains("taille M"), "{summary}");
        assert!(summary.contains("60"), "{summary}");
    }

    #[test]
    fn test_spoken_summary_add_without_slots() {
        let parsed = parse_utterance("ajoute ca", AROUND);
        assert!(spoken_summary(&parsed).contains("panier"));
    }
}
