//! The assistant endpoint: one utterance in, one reply out.
//!
//! Parsing and matching are pure; this handler only wires them to the
//! active catalog and the session cart, and phrases the reply.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use vocalshop_core::{Cart, CartLine, Intent, ParsedQuery, Product};

use crate::cart::{load_cart, save_cart};
use crate::error::Result;
use crate::matcher::{self, AddOutcome, RelaxationPass};
use crate::nlu::{self, CommandIntent};
use crate::state::AppState;

/// Request body: the raw utterance, as transcribed in the browser, and an
/// optional catalog feed to search instead of the configured one.
#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub utterance: String,
    #[serde(default)]
    pub catalog: Option<String>,
}

/// What the assistant did with the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantAction {
    Searched,
    AddedToCart,
    NeedsClarification,
    ClearedCart,
    Checkout,
    HeardNothing,
}

/// Reply payload. `results`, `suggestions` and `trace` are only populated
/// for searches; `cart` always reflects the post-action state.
#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub action: AssistantAction,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<ParsedQuery>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<Product>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<RelaxationPass>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
    pub cart: Cart,
}

impl AssistantResponse {
    fn bare(action: AssistantAction, reply: String, cart: Cart) -> Self {
        Self {
            action,
            reply,
            query: None,
            results: Vec::new(),
            suggestions: Vec::new(),
            pass: None,
            trace: Vec::new(),
            cart,
        }
    }
}

/// Handle one utterance: cart commands first, then search or add-to-cart.
#[instrument(skip(state, session, request))]
pub async fn handle(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>> {
    let utterance = request.utterance.trim();
    let mut cart = load_cart(&session).await;

    if utterance.is_empty() {
        return Ok(Json(AssistantResponse::bare(
            AssistantAction::HeardNothing,
            "Je n'ai rien entendu. Essaie par exemple : \"chemise bleue taille M a moins de \
             60 euros\"."
                .to_string(),
            cart,
        )));
    }

    let normalized = nlu::normalize(utterance);

    // Cart commands take priority: "vide le panier" contains an add word.
    match nlu::detect_command(&normalized) {
        Some(CommandIntent::ClearCart) => {
            cart.clear();
            save_cart(&session, &cart).await;
            info!("cart cleared by voice command");
            return Ok(Json(AssistantResponse::bare(
                AssistantAction::ClearedCart,
                "C'est fait, le panier est vide.".to_string(),
                cart,
            )));
        }
        Some(CommandIntent::Checkout) => {
            let reply = if cart.is_empty() {
                "Le panier est vide, il n'y a rien a valider.".to_string()
            } else {
                let currency = cart.currency().unwrap_or("EUR");
                format!(
                    "Tres bien, je valide la commande : {} article(s) pour {} {}.",
                    cart.item_count(),
                    cart.subtotal(),
                    currency
                )
            };
            return Ok(Json(AssistantResponse::bare(
                AssistantAction::Checkout,
                reply,
                cart,
            )));
        }
        None => {}
    }

    let policy = state.policy();
    let query = nlu::parse_utterance(utterance, policy.price_around_margin);
    let catalog = match &request.catalog {
        Some(url) => match state.catalogs().fetch_catalog(url).await {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(%url, %error, "requested catalog unavailable, using active catalog");
                state.catalogs().active_catalog().await
            }
        },
        None => state.catalogs().active_catalog().await,
    };

    match query.intent {
        Intent::Search => {
            let outcome = matcher::search(&catalog, &query, policy);
            info!(
                pass = outcome.pass.number(),
                results = outcome.results.len(),
                "search handled"
            );
            let reply = search_reply(&query, outcome.results.len(), outcome.pass);
            Ok(Json(AssistantResponse {
                action: AssistantAction::Searched,
                reply,
                query: Some(query),
                results: outcome.results,
                suggestions: outcome.suggestions,
                pass: Some(outcome.pass),
                trace: outcome.trace,
                cart,
            }))
        }
        Intent::AddToCart => match matcher::choose_add_target(&catalog, &query, policy) {
            AddOutcome::Selected(selection) => {
                let line = CartLine::from_catalog(
                    &selection.product,
                    &selection.variant,
                    selection.quantity,
                );
                cart.add_or_merge(line);
                save_cart(&session, &cart).await;
                info!(
                    product = %selection.product.id,
                    variant = %selection.variant.id,
                    quantity = selection.quantity,
                    score = selection.score,
                    "added to cart"
                );
                let mut reply = format!(
                    "Ajoute au panier : {} ({}) x{}.",
                    selection.product.title, selection.variant.title, selection.quantity
                );
                if let Some(substituted) = &selection.substituted_size {
                    reply.push_str(&format!(
                        " La taille demandee n'etait pas disponible, j'ai pris {substituted}."
                    ));
                }
                Ok(Json(AssistantResponse {
                    action: AssistantAction::AddedToCart,
                    reply,
                    query: Some(query),
                    results: Vec::new(),
                    suggestions: Vec::new(),
                    pass: None,
                    trace: Vec::new(),
                    cart,
                }))
            }
            AddOutcome::NeedsClarification { message } => {
                let mut response =
                    AssistantResponse::bare(AssistantAction::NeedsClarification, message, cart);
                response.query = Some(query);
                Ok(Json(response))
            }
        },
    }
}

/// Phrase the search reply from what was understood and what was found.
fn search_reply(query: &ParsedQuery, count: usize, pass: RelaxationPass) -> String {
    let summary = nlu::spoken_summary(query);
    let found = match count {
        0 => "Je n'ai rien trouve dans le catalogue.".to_string(),
        1 => "J'ai trouve 1 article.".to_string(),
        n => format!("J'ai trouve {n} articles."),
    };
    if count > 0 && pass != RelaxationPass::Strict {
        format!(
            "{summary} {found} J'ai du elargir la recherche ({}).",
            pass.label()
        )
    } else {
        format!("{summary} {found}")
    }
}
