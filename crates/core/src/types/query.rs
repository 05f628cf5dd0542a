//! Parsed utterance types.
//!
//! A [`ParsedQuery`] is derived fresh for every utterance and never
//! persisted. Unset slots are simply `None`; parsing is total.

use serde::{Deserialize, Serialize};

/// What the user wants to do with the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    AddToCart,
}

/// Intent plus the slots extracted from an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub intent: Intent,
    /// Normalized (lowercased, diacritic-stripped) utterance text.
    pub query_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl ParsedQuery {
    /// Empty search query for the given normalized text.
    #[must_use]
    pub const fn search(query_text: String) -> Self {
        Self {
            intent: Intent::Search,
            query_text,
            product_type: None,
            color: None,
            size: None,
            price_min: None,
            price_max: None,
            quantity: None,
        }
    }

    /// Quantity to apply at add time (absent means 1).
    #[must_use]
    pub fn quantity_or_default(&self) -> u32 {
        self.quantity.unwrap_or(1).max(1)
    }

    /// Whether any slot beyond the raw text was extracted.
    #[must_use]
    pub const fn has_slots(&self) -> bool {
        self.product_type.is_some()
            || self.color.is_some()
            || self.size.is_some()
            || self.price_min.is_some()
            || self.price_max.is_some()
    }
}
