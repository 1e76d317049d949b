// src/integrations/advice/client.rs
//
// Text-advice service integration.
//
// ARCHITECTURE:
// - Chat-completion style POST: {model, messages, temperature} → choices[0].message.content
// - The POST goes through CompletionTransport; reqwest only lives in its impl
// - The service is a black box; its answer is printed as-is on the summary page
//
// CRITICAL RULES:
// - Never fails: missing key, transport error, bad status or bad body
//   all yield FALLBACK_ADVICE
// - Not rate limited: one request per render job

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::AdviceConfig;
use crate::domain::{AggregateStats, DeckList};
use crate::error::{AppError, AppResult};
use crate::integrations::http::HttpResponse;

pub const FALLBACK_ADVICE: &str = "Advice: carefully evaluate the cost-effectiveness of your cards \
and consider alternatives to improve the deck's balance.";

/// Cards a Commander deck must contain to be playable.
const COMMANDER_DECK_SIZE: u64 = 100;

#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn advise(&self, deck: &DeckList, stats: &AggregateStats) -> String;
}

/// Pass-through provider for pre-generated text.
pub struct StaticAdvice {
    text: String,
}

impl StaticAdvice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_ADVICE)
    }
}

#[async_trait]
impl AdviceProvider for StaticAdvice {
    async fn advise(&self, _deck: &DeckList, _stats: &AggregateStats) -> String {
        self.text.clone()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Authenticated JSON POST to the advice endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn post(&self, url: &str, api_key: &str, body: &Value) -> AppResult<HttpResponse>;
}

pub struct ReqwestCompletionTransport {
    http_client: Client,
}

impl ReqwestCompletionTransport {
    pub fn new() -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl CompletionTransport for ReqwestCompletionTransport {
    async fn post(&self, url: &str, api_key: &str, body: &Value) -> AppResult<HttpResponse> {
        let response = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

pub struct ChatAdvisor {
    config: AdviceConfig,
    transport: Arc<dyn CompletionTransport>,
}

impl ChatAdvisor {
    pub fn new(config: AdviceConfig) -> AppResult<Self> {
        Ok(Self::with_transport(
            config,
            Arc::new(ReqwestCompletionTransport::new()?),
        ))
    }

    pub fn with_transport(config: AdviceConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        Self { config, transport }
    }

    async fn request_advice(&self, prompt: &str) -> AppResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let body = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.config.temperature,
        });

        let response = self
            .transport
            .post(&self.config.endpoint, api_key, &body)
            .await?;
        if !response.is_success() {
            return Err(AppError::Upstream {
                status: response.status,
                url: self.config.endpoint.clone(),
            });
        }
        parse_completion(&response.body)
    }
}

#[async_trait]
impl AdviceProvider for ChatAdvisor {
    async fn advise(&self, deck: &DeckList, stats: &AggregateStats) -> String {
        let prompt = build_prompt(deck, stats);
        match self.request_advice(&prompt).await {
            Ok(advice) => {
                info!("Advice received ({} chars)", advice.len());
                advice
            }
            Err(e) => {
                warn!("Advice generation failed: {}", e);
                FALLBACK_ADVICE.to_string()
            }
        }
    }
}

fn parse_completion(body: &[u8]) -> AppResult<String> {
    let completion: CompletionResponse = serde_json::from_slice(body)?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::Other("Advice response had no content".to_string()))?;
    Ok(content)
}

/// Commander deck analysis request built from the parsed list and its statistics.
pub fn build_prompt(deck: &DeckList, stats: &AggregateStats) -> String {
    let mut prompt = String::new();
    prompt.push_str("Analyze a Magic: The Gathering Commander deck based on these parameters:\n");
    prompt.push_str(&format!("- Card list: {}\n", deck.to_lines().join(", ")));
    prompt.push_str(&format!("- Total number of cards: {}\n", stats.total_count));
    prompt.push_str(&format!("- Average mana value (CMC): {:.2}\n", stats.avg_cmc));
    prompt.push_str(&format!("- Deck colors: {}\n\n", stats.color_label()));
    prompt.push_str("The format is Commander.\n\n");

    if stats.total_count >= COMMANDER_DECK_SIZE {
        prompt.push_str(
            "Go through every card in the list, then provide an analysis covering:\n\
             A) Strengths: synergies, thematic coherence and effective strategies.\n\
             B) Weaknesses: resource gaps, imbalances or vulnerabilities.\n\
             C) Strategic suggestions: ideas to optimize the game plan.\n\
             D) Substitutions and alternatives: cards to swap to balance the deck, \
             respecting its colors.\n",
        );
    } else {
        prompt.push_str(&format!(
            "The deck has fewer than the {} cards needed to play Commander: suggest how to \
             complete it instead of analyzing strengths and weaknesses.\n",
            COMMANDER_DECK_SIZE
        ));
    }
    prompt.push_str(
        "Do not start the answer by repeating the card list, the card count, the average \
         mana value or the colors.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> DeckList {
        let mut deck = DeckList::new();
        deck.add("Sauron, the Dark Lord", 1);
        deck.add("Swamp", 2);
        deck
    }

    fn stats(total_count: u64) -> AggregateStats {
        AggregateStats {
            total_count,
            avg_cmc: 2.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_for_incomplete_deck() {
        let prompt = build_prompt(&deck(), &stats(3));
        assert!(prompt.contains("1 Sauron, the Dark Lord, 2 Swamp"));
        assert!(prompt.contains("Average mana value (CMC): 2.50"));
        assert!(prompt.contains("Deck colors: Colorless"));
        assert!(prompt.contains("suggest how to complete it"));
        assert!(!prompt.contains("A) Strengths"));
    }

    #[test]
    fn test_prompt_for_full_deck() {
        let prompt = build_prompt(&deck(), &stats(100));
        assert!(prompt.contains("A) Strengths"));
        assert!(prompt.contains("D) Substitutions"));
    }

    #[test]
    fn test_parse_completion() {
        let body = br#"{"choices": [{"message": {"role": "assistant", "content": "  **Ramp** more.\n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "**Ramp** more.");

        assert!(parse_completion(br#"{"choices": []}"#).is_err());
        assert!(parse_completion(b"not json").is_err());
    }

    fn keyed_config() -> AdviceConfig {
        AdviceConfig {
            endpoint: "http://advice.test/v1/chat/completions".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    fn advisor_answering(response: AppResult<HttpResponse>) -> ChatAdvisor {
        let mut transport = MockCompletionTransport::new();
        let mut response = Some(response);
        transport
            .expect_post()
            .times(1)
            .returning(move |_, _, _| {
                response
                    .take()
                    .unwrap_or_else(|| Err(AppError::Other("answered twice".to_string())))
            });
        ChatAdvisor::with_transport(keyed_config(), Arc::new(transport))
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_without_a_request() {
        let mut transport = MockCompletionTransport::new();
        transport.expect_post().times(0);
        let advisor = ChatAdvisor::with_transport(
            AdviceConfig {
                api_key: None,
                ..Default::default()
            },
            Arc::new(transport),
        );

        let advice = advisor.advise(&deck(), &stats(3)).await;
        assert_eq!(advice, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_request_carries_key_model_and_prompt() {
        let config = keyed_config();
        let model = config.model.clone();
        let mut transport = MockCompletionTransport::new();
        transport
            .expect_post()
            .withf(move |url: &str, api_key: &str, body: &Value| {
                url == "http://advice.test/v1/chat/completions"
                    && api_key == "sk-test"
                    && body["model"] == model.as_str()
                    && body["messages"][0]["content"]
                        .as_str()
                        .map_or(false, |prompt| prompt.contains("2 Swamp"))
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(HttpResponse {
                    status: 200,
                    body: br#"{"choices": [{"message": {"content": "Add ramp."}}]}"#.to_vec(),
                })
            });
        let advisor = ChatAdvisor::with_transport(config, Arc::new(transport));

        assert_eq!(advisor.advise(&deck(), &stats(3)).await, "Add ramp.");
    }

    #[tokio::test]
    async fn test_error_status_falls_back() {
        let advisor = advisor_answering(Ok(HttpResponse {
            status: 500,
            body: br#"{"error": "overloaded"}"#.to_vec(),
        }));
        assert_eq!(advisor.advise(&deck(), &stats(3)).await, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back() {
        let advisor = advisor_answering(Ok(HttpResponse {
            status: 200,
            body: b"<html>gateway</html>".to_vec(),
        }));
        assert_eq!(advisor.advise(&deck(), &stats(3)).await, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_transport_error_falls_back() {
        let advisor =
            advisor_answering(Err(AppError::Transport("connection refused".to_string())));
        assert_eq!(advisor.advise(&deck(), &stats(3)).await, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn test_static_advice_passes_through() {
        let provider = StaticAdvice::new("Play more lands.");
        assert_eq!(provider.advise(&deck(), &stats(3)).await, "Play more lands.");
    }
}
