//! Static alias tables for slot extraction.
//!
//! Canonical term first, then the surface variants looked up as substrings
//! of the normalized utterance. Table order is significant: the first entry
//! with any matching surface wins.

/// Color aliases (canonical, surfaces).
pub const COLOR_ALIASES: &[(&str, &[&str])] = &[
    ("bleu", &["bleu", "bleue", "marine", "bleu marine"]),
    ("rouge", &["rouge"]),
    ("blanc", &["blanc", "blanche"]),
    ("noir", &["noir", "noire"]),
    ("beige", &["beige", "sable", "camel"]),
    ("vert", &["vert", "verte"]),
    ("gris", &["gris", "grise"]),
    ("rose", &["rose"]),
    ("jaune", &["jaune"]),
    ("marron", &["marron", "brun", "brune"]),
];

/// Product type aliases (canonical, surfaces).
pub const TYPE_ALIASES: &[(&str, &[&str])] = &[
    ("chemise", &["chemise", "chemises"]),
    (
        "tee-shirt",
        &["t-shirt", "tee-shirt", "tee shirt", "tshirt", "t shirts", "t-shirts"],
    ),
    ("robe", &["robe", "robes"]),
    ("veste", &["veste", "vestes", "blazer"]),
    ("pantalon", &["pantalon", "pantalons", "chino"]),
    ("baskets", &["baskets", "basket", "sneakers", "tennis", "chaussures"]),
];

/// Recognized sizes, in lookup order (first whole-word hit wins).
pub const SIZES: &[&str] = &[
    "XS", "S", "M", "L", "XL", "XXL", "38", "39", "40", "41", "42", "43", "44", "45", "46",
];

/// Surface forms of a canonical color, if known.
#[must_use]
pub fn color_surfaces(canonical: &str) -> Option<&'static [&'static str]> {
    COLOR_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, surfaces)| *surfaces)
}

/// Surface forms of a canonical product type, if known.
#[must_use]
pub fn type_surfaces(canonical: &str) -> Option<&'static [&'static str]> {
    TYPE_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, surfaces)| *surfaces)
}
