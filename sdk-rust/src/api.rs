//! Request and response bodies of the generation service's REST endpoints.
//!
//! Response bodies only describe the success shape. The `success: false`
//! envelope is rejected by the transport before a body is decoded.

use crate::{ChatMessage, HistoryRecord, ImageQuality, ImageSize, ImageStyle, SearchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const HEALTH_PATH: &str = "/health";
pub const NARRATIVE_PATH: &str = "/narrative";
pub const IMAGE_PATH: &str = "/image";
pub const GENERATE_PATH: &str = "/generate";
pub const CHAT_PATH: &str = "/chat";
pub const ENHANCE_PROMPT_PATH: &str = "/prompt/enhance";
pub const HISTORY_PATH: &str = "/history";
pub const SEARCH_PATH: &str = "/search";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NarrativeRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NarrativeResponse {
    #[serde(default)]
    pub narrative: Option<String>,
    #[serde(default)]
    pub usage: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub style: ImageStyle,
    pub enhance_prompt: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ImageResponse {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub enhance_prompt: bool,
    pub image_size: ImageSize,
    pub image_quality: ImageQuality,
    pub image_style: ImageStyle,
    pub save_to_history: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub narrative: Option<String>,
    /// Base64 encoded image bytes.
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
    #[serde(default)]
    pub metadata: Option<GenerateMetadata>,
    #[serde(default)]
    pub record_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateMetadata {
    #[serde(default)]
    pub llm_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnhancePromptRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnhancePromptResponse {
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub n_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: crate::HealthState,
    #[serde(default)]
    pub configuration: Option<HealthConfiguration>,
    #[serde(default)]
    pub services: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfiguration {
    #[serde(default)]
    pub all_configured: Option<bool>,
}
