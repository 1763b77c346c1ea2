use crate::{
    state::lock, GenerationError, GenerationMode, GenerationRequest, GenerationResult,
    SessionState,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use drivegen_sdk::{
    api::{
        EnhancePromptRequest, EnhancePromptResponse, GenerateRequest, GenerateResponse,
        ImageRequest, ImageResponse, NarrativeRequest, NarrativeResponse, ENHANCE_PROMPT_PATH,
        GENERATE_PATH, IMAGE_PATH, NARRATIVE_PATH,
    },
    call, ImagePayload, Transport, TransportRequest,
};
use std::sync::{Arc, Mutex};
use tracing::{debug, info_span, warn};
use tracing_futures::Instrument;

const CANCELLED_MESSAGE: &str = "Generation was abandoned before it resolved";

#[derive(Default)]
struct OrchestratorState {
    state: SessionState,
    last_result: Option<GenerationResult>,
    last_error: Option<String>,
}

/// Submits generation requests and tracks their lifecycle.
///
/// At most one request is in flight per orchestrator. A `submit` that arrives
/// while another is pending is dropped without being sent, so rapid repeated
/// triggers from a UI collapse into the first one. The guard belongs to this
/// instance only; separate orchestrators do not coordinate.
pub struct GenerationOrchestrator {
    transport: Arc<dyn Transport>,
    inner: Mutex<OrchestratorState>,
}

impl GenerationOrchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            inner: Mutex::new(OrchestratorState::default()),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state().is_in_flight()
    }

    /// Result of the most recent completed submission.
    #[must_use]
    pub fn last_result(&self) -> Option<GenerationResult> {
        lock(&self.inner).last_result.clone()
    }

    /// Message of the most recent failed submission.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner).last_error.clone()
    }

    /// Return to `Idle` and forget the last outcome. Has no effect while a
    /// request is in flight; returns whether the reset happened.
    pub fn reset(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.state.is_in_flight() {
            return false;
        }
        *inner = OrchestratorState::default();
        true
    }

    /// Submit a generation request.
    ///
    /// Returns `Ok(None)` without sending anything if another submission is
    /// still in flight. A blank prompt is rejected before any state change.
    pub async fn submit(
        &self,
        request: GenerationRequest,
    ) -> Result<Option<GenerationResult>, GenerationError> {
        let prompt = request.validated_prompt()?;

        let Some(guard) = self.begin() else {
            debug!("generation already in flight, ignoring submit");
            return Ok(None);
        };

        let span = info_span!("drivegen.generation", mode = ?request.mode);
        let outcome = self.dispatch(&request, prompt).instrument(span).await;
        guard.resolve(&outcome);

        outcome.map(Some)
    }

    /// Ask the service to rewrite a prompt for better image results.
    /// Independent of the submission lifecycle.
    pub async fn enhance_prompt(&self, prompt: &str) -> Result<String, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation(
                "Prompt to enhance must not be empty".to_string(),
            ));
        }

        let request = TransportRequest::post(
            ENHANCE_PROMPT_PATH,
            &EnhancePromptRequest {
                prompt: prompt.to_string(),
            },
        )?;
        let response: EnhancePromptResponse =
            call(self.transport.as_ref(), request, "prompt_enhance").await?;

        non_empty(response.enhanced_prompt).ok_or_else(|| {
            GenerationError::Remote("The service returned no enhanced prompt".to_string())
        })
    }

    fn begin(&self) -> Option<InFlightGuard<'_>> {
        let mut inner = lock(&self.inner);
        if inner.state.is_in_flight() {
            return None;
        }
        inner.state = SessionState::Submitting;
        inner.last_result = None;
        inner.last_error = None;
        drop(inner);

        Some(InFlightGuard {
            inner: &self.inner,
            resolved: false,
        })
    }

    async fn dispatch(
        &self,
        request: &GenerationRequest,
        prompt: String,
    ) -> Result<GenerationResult, GenerationError> {
        let image_options = request.image_options.unwrap_or_default();
        let context = request.trimmed_context();
        let transport = self.transport.as_ref();

        debug!(mode = ?request.mode, "dispatching generation");
        let result = match request.mode {
            GenerationMode::Combined => {
                let body = GenerateRequest {
                    prompt,
                    context,
                    enhance_prompt: request.enhance_image,
                    image_size: image_options.size,
                    image_quality: image_options.quality,
                    image_style: image_options.style,
                    save_to_history: request.save_to_history,
                };
                let response: GenerateResponse = call(
                    transport,
                    TransportRequest::post(GENERATE_PATH, &body)?,
                    "generate",
                )
                .await?;
                from_generate_response(response)?
            }
            GenerationMode::Narrative => {
                let body = NarrativeRequest { prompt, context };
                let response: NarrativeResponse = call(
                    transport,
                    TransportRequest::post(NARRATIVE_PATH, &body)?,
                    "narrative",
                )
                .await?;
                GenerationResult {
                    narrative: non_empty(response.narrative),
                    tokens_used: response
                        .usage
                        .and_then(|usage| usage.get("total_tokens").copied()),
                    ..GenerationResult::default()
                }
            }
            GenerationMode::Image => {
                let body = ImageRequest {
                    prompt,
                    size: image_options.size,
                    quality: image_options.quality,
                    style: image_options.style,
                    enhance_prompt: request.enhance_image,
                };
                let response: ImageResponse =
                    call(transport, TransportRequest::post(IMAGE_PATH, &body)?, "image").await?;
                GenerationResult {
                    image: non_empty(response.image_url).map(ImagePayload::Url),
                    image_prompt_revised: non_empty(response.revised_prompt),
                    ..GenerationResult::default()
                }
            }
        };

        if !result.has_content() {
            return Err(GenerationError::Remote(
                "The service reported success but returned neither a narrative nor an image"
                    .to_string(),
            ));
        }
        Ok(result)
    }
}

/// Holds the `Submitting` state. Resolving records the outcome; dropping it
/// unresolved (the submit future was abandoned) records a failure, so the
/// session never stays stuck in flight.
struct InFlightGuard<'a> {
    inner: &'a Mutex<OrchestratorState>,
    resolved: bool,
}

impl InFlightGuard<'_> {
    fn resolve(mut self, outcome: &Result<GenerationResult, GenerationError>) {
        let mut inner = lock(self.inner);
        match outcome {
            Ok(result) => {
                inner.state = SessionState::Completed;
                inner.last_result = Some(result.clone());
            }
            Err(error) => {
                warn!(%error, "generation failed");
                inner.state = SessionState::Failed;
                inner.last_error = Some(error.user_message());
            }
        }
        drop(inner);
        self.resolved = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        warn!("generation dropped while in flight");
        let mut inner = lock(self.inner);
        inner.state = SessionState::Failed;
        inner.last_error = Some(CANCELLED_MESSAGE.to_string());
    }
}

fn from_generate_response(response: GenerateResponse) -> Result<GenerationResult, GenerationError> {
    let image = match non_empty(response.image_data) {
        Some(encoded) => Some(ImagePayload::Bytes(decode_image(&encoded)?)),
        None => non_empty(response.image_url).map(ImagePayload::Url),
    };

    Ok(GenerationResult {
        narrative: non_empty(response.narrative),
        image_prompt_revised: non_empty(response.image_prompt)
            .or_else(|| non_empty(response.revised_prompt)),
        image,
        tokens_used: response.metadata.and_then(|metadata| metadata.llm_tokens),
        record_id: non_empty(response.record_id),
    })
}

// Accepts bare base64 as well as a `data:image/...;base64,` URL. Line-wrapped
// payloads are unwrapped first.
fn decode_image(encoded: &str) -> Result<Vec<u8>, GenerationError> {
    let payload: String = encoded
        .split_once("base64,")
        .map_or(encoded, |(_, data)| data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(payload).map_err(|error| {
        GenerationError::Remote(format!("Image data is not valid base64: {error}"))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
