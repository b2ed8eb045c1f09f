//! Motivational quotes.
//!
//! A [`QuoteSource`] either produces a quote or reports it has none; choosing
//! an offline fallback is left to the caller via [`resolve_quote`].

use crate::config::QuoteConfig;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub const FALLBACK_QUOTES: [&str; 5] = [
    "The key to success is to focus our conscious mind on things we desire not things we fear. - Brian Tracy",
    "Concentrate all your thoughts upon the work at hand. The sun's rays do not burn until brought to a focus. - Alexander Graham Bell",
    "The successful warrior is the average man, with laser-like focus. - Bruce Lee",
    "Focus is a matter of deciding what things you're not going to do. - John Carmack",
    "Your focus determines your reality. - Qui-Gon Jinn",
];

const PROMPT: &str = "Generate a single, short, inspirational quote about focus. Do not include any extra text, commentary, or quotation marks. Only output the quote text itself.";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    Quote(String),
    Unavailable,
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("no API key in ${0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("service answered {0}")]
    Status(StatusCode),
    #[error("service returned an empty quote")]
    EmptyResult,
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> QuoteOutcome;
}

/// Picks the fetched quote, or a uniformly random fallback.
pub fn resolve_quote<R: Rng + ?Sized>(outcome: QuoteOutcome, rng: &mut R) -> String {
    match outcome {
        QuoteOutcome::Quote(text) => text,
        QuoteOutcome::Unavailable => FALLBACK_QUOTES
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_QUOTES[0])
            .to_string(),
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default()
    }
}

/// Strips whitespace and any quotation marks the model added anyway.
fn clean_quote(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_string()
}

impl From<reqwest::Error> for QuoteError {
    /// Drops the URL so nothing from the request line reaches the logs.
    fn from(e: reqwest::Error) -> Self {
        QuoteError::Request(e.without_url())
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiQuotes {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiQuotes {
    pub fn from_config(config: &QuoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: config.model.clone(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.is_empty()),
            api_key_env: config.api_key_env.clone(),
        }
    }

    async fn request(&self) -> Result<String, QuoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| QuoteError::NotConfigured(self.api_key_env.clone()))?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: PROMPT }],
            }],
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };

        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(QuoteError::Status(resp.status()));
        }
        let quote = clean_quote(&resp.json::<GenerateResponse>().await?.text());
        if quote.is_empty() {
            return Err(QuoteError::EmptyResult);
        }
        Ok(quote)
    }
}

#[async_trait]
impl QuoteSource for GeminiQuotes {
    async fn fetch(&self) -> QuoteOutcome {
        info!(model = %self.model, "Fetching focus quote");
        match self.request().await {
            Ok(quote) => {
                info!(%quote, "Fetched focus quote");
                QuoteOutcome::Quote(quote)
            }
            Err(e) => {
                error!("Quote unavailable, using a fallback: {}", e);
                QuoteOutcome::Unavailable
            }
        }
    }
}

/// Used when quotes are switched off; the caller always falls back.
pub struct OfflineQuotes;

#[async_trait]
impl QuoteSource for OfflineQuotes {
    async fn fetch(&self) -> QuoteOutcome {
        QuoteOutcome::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fetched_quote_wins() {
        let mut rng = StdRng::seed_from_u64(7);
        let quote = resolve_quote(QuoteOutcome::Quote("Stay on target.".into()), &mut rng);
        assert_eq!(quote, "Stay on target.");
    }

    #[test]
    fn test_unavailable_uses_a_fallback() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let quote = resolve_quote(QuoteOutcome::Unavailable, &mut rng);
            assert!(FALLBACK_QUOTES.contains(&quote.as_str()));
        }
    }

    #[test]
    fn test_fallbacks_are_all_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(resolve_quote(QuoteOutcome::Unavailable, &mut rng));
        }
        assert_eq!(seen.len(), FALLBACK_QUOTES.len());
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"  \"Focus, then flow.\"\n"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(clean_quote(&resp.text()), "Focus, then flow.");

        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(clean_quote(&resp.text()), "");

        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.text(), "");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: PROMPT }],
            }],
            safety_settings: vec![SafetySetting {
                category: HARM_CATEGORIES[0],
                threshold: "BLOCK_NONE",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], PROMPT);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let source = GeminiQuotes {
            client: reqwest::Client::new(),
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: "gemini-1.5-flash".into(),
            api_key: None,
            api_key_env: "FOCUSFLOW_TEST_UNSET_KEY".into(),
        };
        assert!(matches!(
            source.request().await,
            Err(QuoteError::NotConfigured(_))
        ));
        assert_eq!(source.fetch().await, QuoteOutcome::Unavailable);
        assert_eq!(OfflineQuotes.fetch().await, QuoteOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_leak_the_key() {
        let source = GeminiQuotes {
            client: reqwest::Client::new(),
            endpoint: "http://127.0.0.1:1".into(),
            model: "gemini-1.5-flash".into(),
            api_key: Some("SECRET-KEY-123".into()),
            api_key_env: "GEMINI_API_KEY".into(),
        };
        let err = source.request().await.unwrap_err();
        assert!(matches!(err, QuoteError::Request(_)));
        let text = format!("{} {:?}", err, err);
        assert!(!text.contains("SECRET-KEY-123"), "{}", text);
        assert_eq!(source.fetch().await, QuoteOutcome::Unavailable);
    }
}
