// src/integrations/advice/mod.rs
pub mod client;

pub use client::{
    AdviceProvider, ChatAdvisor, CompletionTransport, ReqwestCompletionTransport, StaticAdvice,
    FALLBACK_ADVICE,
};
