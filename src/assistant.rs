// VoltAI assistant - relays marketplace questions to an external
// text-generation service, grounding every conversation in a live snapshot
// of the grid so answers quote real balances and prices.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::centers::EnergyCenter;
use crate::config::AssistantConfig;
use crate::consumers::Consumer;
use crate::producers::Producer;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Replies are capped upstream; the persona prompt asks for under 80 words.
const MAX_OUTPUT_TOKENS: u32 = 300;

const EMPTY_REPLY_FALLBACK: &str = "I could not generate a response right now.";

/// One prior exchange in the conversation, as the client resubmits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// Builds the persona prompt with the current marketplace state embedded,
/// so the model can answer from data instead of guessing.
pub fn system_instruction(
    centers: &[EnergyCenter],
    consumers: &[Consumer],
    producers: &[Producer],
) -> Result<String> {
    let consumers_data = serde_json::to_string(consumers)?;
    let producers_data = serde_json::to_string(producers)?;
    let centers_data = serde_json::to_string(centers)?;

    Ok(format!(
        "You are VoltAI, smart assistant for EnergyDAO - a decentralized renewable energy marketplace in India. Be concise, friendly, use ₹ for currency.\n\
         Keep all replies under 80 words.\n\
         \n\
         LIVE PLATFORM DATA RIGHT NOW:\n\
         Consumers: {consumers_data}\n\
         Producers: {producers_data}\n\
         Energy Centers: {centers_data}\n\
         \n\
         You help with:\n\
         - Connection costs (Household base ₹5000, Industry base ₹15000, plus ₹120 per km distance)\n\
         - Producer energy pricing and listings\n\
         - Energy center storage and transfers\n\
         - How the decentralized marketplace works\n\
         - Recommending cheapest energy sources"
    ))
}

// Wire types for the generateContent call.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Instruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: ChatRole,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamError {
    error: Option<UpstreamErrorBody>,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

pub struct AssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        AssistantClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends the conversation plus the new user message and returns the
    /// model's reply text.
    pub async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: turn.role,
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: ChatRole::User,
            parts: vec![Part { text: message }],
        });

        let request = GenerateRequest {
            system_instruction: Instruction {
                parts: vec![Part {
                    text: system_prompt,
                }],
            },
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        // Key travels in a header, never in the URL, so request errors and
        // access logs cannot leak it.
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("assistant request failed to send")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "assistant upstream rejected the request");
            let message = serde_json::from_str::<UpstreamError>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("assistant upstream returned {status}"));
            return Err(anyhow!(message));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .context("assistant response was not valid JSON")?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Ok(EMPTY_REPLY_FALLBACK.to_string());
        }
        Ok(text)
    }
}
