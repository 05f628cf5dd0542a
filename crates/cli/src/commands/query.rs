//! Utterance commands: parse, search, add.

use std::path::Path;

use vocalshop_widget::matcher::{self, AddOutcome, MatchPolicy};
use vocalshop_widget::nlu;

use super::load_catalog;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse an utterance and print what the assistant understood.
pub fn parse(utterance: &str, json: bool) -> CommandResult {
    let policy = MatchPolicy::default();
    let query = nlu::parse_utterance(utterance, policy.price_around_margin);

    if json {
        println!("{}", serde_json::to_string_pretty(&query)?);
    } else {
        println!("intent   : {:?}", query.intent);
        println!("type     : {}", query.product_type.as_deref().unwrap_or("-"));
        println!("couleur  : {}", query.color.as_deref().unwrap_or("-"));
        println!("taille   : {}", query.size.as_deref().unwrap_or("-"));
        match (query.price_min, query.price_max) {
            (Some(min), Some(max)) => println!("prix     : {min}..{max} EUR"),
            (None, Some(max)) => println!("prix     : <= {max} EUR"),
            _ => println!("prix     : -"),
        }
        println!("quantite : {}", query.quantity_or_default());
        println!();
        println!("{}", nlu::spoken_summary(&query));
    }
    Ok(())
}

/// Run the relaxation search and print the trace and results.
pub fn search(utterance: &str, catalog_path: Option<&Path>) -> CommandResult {
    let catalog = load_catalog(catalog_path)?;
    let policy = MatchPolicy::default();
    let query = nlu::parse_utterance(utterance, policy.price_around_margin);
    let outcome = matcher::search(&catalog, &query, &policy);

    for line in &outcome.trace {
        println!("{line}");
    }
    println!();
    for product in &outcome.results {
        let price = product
            .variants
            .first()
            .map_or_else(String::new, |v| format!("{} {}", v.price, v.currency));
        println!("  {} - {} ({price})", product.id, product.title);
    }
    if !outcome.suggestions.is_empty() {
        println!();
        println!("Suggestions :");
        for product in &outcome.suggestions {
            println!("  {} - {}", product.id, product.title);
        }
    }
    Ok(())
}

/// Dry-run the add-to-cart decision for an utterance.
pub fn add(utterance: &str, catalog_path: Option<&Path>) -> CommandResult {
    let catalog = load_catalog(catalog_path)?;
    let policy = MatchPolicy::default();
    let query = nlu::parse_utterance(utterance, policy.price_around_margin);

    match matcher::choose_add_target(&catalog, &query, &policy) {
        AddOutcome::Selected(selection) => {
            println!(
                "{} ({}) x{} [score {}]",
                selection.product.title,
                selection.variant.title,
                selection.quantity,
                selection.score
            );
            if let Some(substituted) = selection.substituted_size {
                println!("taille substituee : {substituted}");
            }
        }
        AddOutcome::NeedsClarification { message } => println!("{message}"),
    }
    Ok(())
}
