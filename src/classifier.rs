//! # Classifier Client
//!
//! Sends one text item to the external generative-language API and returns
//! a sentiment label or a classified failure. The wire shape is a thin
//! adapter; the rest of the crate only sees the [`Classifier`] trait and
//! the [`ClassifierError`] taxonomy.

use crate::config::BatchConfig;
use crate::constants::defaults;
use crate::prompt::{build_contents, PromptPart, PromptTurn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur while classifying one row.
///
/// Only [`ClassifierError::Auth`] is fatal to the running batch; every
/// other variant is logged and the batch moves on to the next row.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status or error payload.
    #[error("Classification API returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// API rejected the credential; retrying the rest of the batch with
    /// the same key is pointless.
    #[error("Classification API rejected credentials")]
    Auth,

    /// Response body did not match the expected shape.
    #[error("Failed to parse classification response: {0}")]
    Parse(String),

    /// Well-formed response carried no usable label; the row stays
    /// unresolved and becomes eligible again on the next pass.
    #[error("Classification response contained no label")]
    EmptyLabel,
}

impl ClassifierError {
    /// Fatal errors abort the remaining rows of the current batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

/// Sends one text item to an external classification API.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `text`, optionally tagged with a dialect label for the
    /// prompt. Returns the trimmed, non-empty sentiment label.
    async fn classify(
        &self,
        text: &str,
        aux_label: Option<&str>,
    ) -> std::result::Result<String, ClassifierError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<PromptTurn>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl GenerationConfig {
    /// Deterministic decoding: same input, same label.
    fn deterministic() -> Self {
        Self {
            max_output_tokens: defaults::MAX_OUTPUT_TOKENS,
            temperature: defaults::TEMPERATURE,
            top_p: defaults::TOP_P,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// All harm categories set to permissive: hotel reviews routinely trip
/// over-eager content filters otherwise.
fn permissive_safety() -> Vec<SafetySetting> {
    const CATEGORIES: [&str; 4] = [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_HARASSMENT",
    ];
    CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PromptPart>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u16,
    #[serde(default)]
    message: String,
}

/// Extract the label from a raw response body.
///
/// Exactly one label is expected per request: only the first candidate's
/// first part is read, extra candidates are ignored.
fn parse_label(status: u16, raw: &str) -> std::result::Result<String, ClassifierError> {
    let success = (200..300).contains(&status);

    let parsed: GenerateContentResponse = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) if success => return Err(ClassifierError::Parse(e.to_string())),
        Err(_) => {
            return Err(ClassifierError::Status {
                code: status,
                message: snippet(raw),
            })
        }
    };

    if let Some(error) = parsed.error {
        if error.code == 401 {
            return Err(ClassifierError::Auth);
        }
        return Err(ClassifierError::Status {
            code: error.code,
            message: error.message,
        });
    }

    if !success {
        return Err(ClassifierError::Status {
            code: status,
            message: snippet(raw),
        });
    }

    let label = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.trim().to_string())
        .ok_or_else(|| ClassifierError::Parse("no candidates in response".to_string()))?;

    if label.is_empty() {
        return Err(ClassifierError::EmptyLabel);
    }
    Ok(label)
}

fn snippet(raw: &str) -> String {
    raw.chars().take(200).collect()
}

/// Classifier backed by the Gemini generateContent endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    client: reqwest::Client,
    base_url: String,
    model_id: String,
    api_key: String,
}

impl GeminiClassifier {
    /// Build the client with the configured request timeout, so an
    /// unresponsive API fails the row instead of stalling the batch.
    pub fn new(config: &BatchConfig) -> std::result::Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model_id, self.api_key
        )
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        text: &str,
        aux_label: Option<&str>,
    ) -> std::result::Result<String, ClassifierError> {
        let body = GenerateContentRequest {
            contents: build_contents(text, aux_label),
            generation_config: GenerationConfig::deterministic(),
            safety_settings: permissive_safety(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let raw = response.text().await?;
        debug!(status = status, bytes = raw.len(), "Classification response received");

        parse_label(status, &raw)
    }
}
