// src/integrations/mod.rs
//
// External Integrations Module
//
// Everything that talks to a remote service lives here:
// - http: rate-limited GET plumbing shared by every card-data call
// - scryfall: card-data gateway (cards, printings, localized text, images, exchange rate)
// - advice: text-advice service for the summary page

pub mod advice;
pub mod catalog;
pub mod http;
pub mod scryfall;

pub use advice::{AdviceProvider, ChatAdvisor, StaticAdvice};
pub use catalog::{CardCatalog, LOCALIZED_TEXT_UNAVAILABLE};
pub use http::{HttpTransport, RateLimitedClient, ReqwestTransport};
pub use scryfall::{fetch_usd_to_eur, ScryfallGateway};
