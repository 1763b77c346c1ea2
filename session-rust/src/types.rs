use crate::GenerationError;
use drivegen_sdk::{ImageOptions, ImagePayload};
use serde::{Deserialize, Serialize};

/// Which artifacts a generation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Narrative and image in one call.
    #[default]
    Combined,
    Narrative,
    Image,
}

/// A request for a design concept.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub design_prompt: String,
    pub context: Option<String>,
    /// Let the service rewrite the prompt before rendering the image. On by
    /// default, as the service itself does when the flag is omitted.
    pub enhance_image: bool,
    /// Defaults apply when unset.
    pub image_options: Option<ImageOptions>,
    pub mode: GenerationMode,
    pub save_to_history: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            design_prompt: String::new(),
            context: None,
            enhance_image: true,
            image_options: None,
            mode: GenerationMode::default(),
            save_to_history: true,
        }
    }
}

impl GenerationRequest {
    pub fn new(design_prompt: impl Into<String>) -> Self {
        Self {
            design_prompt: design_prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_enhance_image(mut self, enhance_image: bool) -> Self {
        self.enhance_image = enhance_image;
        self
    }

    #[must_use]
    pub fn with_image_options(mut self, image_options: ImageOptions) -> Self {
        self.image_options = Some(image_options);
        self
    }

    /// The trimmed prompt, or a validation error if nothing is left.
    pub(crate) fn validated_prompt(&self) -> Result<String, GenerationError> {
        let prompt = self.design_prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation(
                "Please enter a design concept description".to_string(),
            ));
        }
        Ok(prompt.to_string())
    }

    /// Blank context is treated as no context.
    pub(crate) fn trimmed_context(&self) -> Option<String> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|context| !context.is_empty())
            .map(str::to_string)
    }
}

/// Everything a successful generation produced. Fields the service did not
/// populate stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationResult {
    pub narrative: Option<String>,
    pub image_prompt_revised: Option<String>,
    pub image: Option<ImagePayload>,
    pub tokens_used: Option<u32>,
    /// Id of the history record the service created, if any.
    pub record_id: Option<String>,
}

impl GenerationResult {
    /// Whether the service produced any artifact at all.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.narrative.is_some() || self.image.is_some()
    }
}
