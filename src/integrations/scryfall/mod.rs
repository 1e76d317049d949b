// src/integrations/scryfall/mod.rs
pub mod client;

pub use client::{fetch_usd_to_eur, ScryfallGateway};
