use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The author of a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x1792")]
    Portrait,
    #[serde(rename = "1792x1024")]
    Landscape,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Vivid,
    Natural,
}

/// Rendering options forwarded to the image generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ImageOptions {
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub style: ImageStyle,
}

/// A generated image, either inline bytes or a link to the hosted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Bytes(Vec<u8>),
    Url(String),
}

/// A persisted generation as returned by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub narrative: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Record fields attached to a similarity search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchMetadata {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub narrative: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A similarity search hit. Lower `distance` means closer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: SearchMetadata,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    #[serde(other)]
    Error,
}

/// The service's answer to a health probe.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: HealthState,
    /// Whether every upstream provider has credentials, when the service
    /// reports it.
    pub all_configured: Option<bool>,
    pub services: BTreeMap<String, Value>,
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The service writes naive local ISO timestamps; newer builds may send RFC 3339.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
