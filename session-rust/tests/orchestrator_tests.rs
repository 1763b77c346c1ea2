mod common;

use common::GatedTransport;
use drivegen_sdk::{
    drivegen_sdk_test::MockTransport, ClientError, ImageOptions, ImagePayload, ImageQuality,
    ImageSize, ImageStyle,
};
use drivegen_session::{
    GenerationError, GenerationMode, GenerationOrchestrator, GenerationRequest, SessionState,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

fn generate_success() -> Value {
    json!({
        "success": true,
        "prompt": "a sleek concept coupe",
        "narrative": "A low-slung coupe with a continuous light blade.",
        "image_data": "iVBORw0KGgo=",
        "image_prompt": "studio photo of a sleek concept coupe",
        "metadata": { "llm_tokens": 512 },
        "record_id": "rec-1"
    })
}

fn orchestrator(transport: &Arc<MockTransport>) -> GenerationOrchestrator {
    GenerationOrchestrator::new(transport.clone())
}

#[tokio::test]
async fn combined_submit_aggregates_every_populated_field() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(generate_success());
    let orchestrator = orchestrator(&transport);

    let result = orchestrator
        .submit(GenerationRequest::new("a sleek concept coupe").with_enhance_image(true))
        .await
        .expect("submit should succeed")
        .expect("submit should not be skipped");

    assert!(result
        .narrative
        .as_deref()
        .is_some_and(|narrative| !narrative.is_empty()));
    assert_eq!(result.tokens_used, Some(512));
    assert_eq!(
        result.image_prompt_revised.as_deref(),
        Some("studio photo of a sleek concept coupe")
    );
    assert_eq!(
        result.image,
        Some(ImagePayload::Bytes(vec![
            0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A
        ]))
    );
    assert_eq!(result.record_id.as_deref(), Some("rec-1"));

    assert_eq!(orchestrator.state(), SessionState::Completed);
    assert_eq!(orchestrator.last_result(), Some(result));
    assert_eq!(orchestrator.last_error(), None);

    let tracked = transport.tracked_requests();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].path, "/generate");
    assert_eq!(
        tracked[0].body,
        Some(json!({
            "prompt": "a sleek concept coupe",
            "enhance_prompt": true,
            "image_size": "1024x1024",
            "image_quality": "standard",
            "image_style": "vivid",
            "save_to_history": true
        }))
    );
}

#[tokio::test]
async fn blank_prompt_is_rejected_without_network_or_state_change() {
    let transport = Arc::new(MockTransport::new());
    let orchestrator = orchestrator(&transport);

    for prompt in ["", "   ", "\n\t"] {
        let err = orchestrator
            .submit(GenerationRequest::new(prompt))
            .await
            .expect_err("blank prompt should fail");
        assert!(matches!(err, GenerationError::Validation(_)));
    }

    assert!(transport.tracked_requests().is_empty());
    assert_eq!(orchestrator.state(), SessionState::Idle);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_a_no_op() {
    let transport = Arc::new(GatedTransport::new());
    transport.mock.enqueue(generate_success());
    let orchestrator = GenerationOrchestrator::new(transport.clone());
    let request = GenerationRequest::new("a sleek concept coupe");

    let first = orchestrator.submit(request.clone());
    let second = async {
        transport.wait_until_entered().await;
        assert_eq!(orchestrator.state(), SessionState::Submitting);
        assert!(orchestrator.is_in_flight());

        let skipped = orchestrator.submit(request.clone()).await;
        transport.release_one();
        skipped
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.expect("first submit succeeds").is_some());
    assert!(second.expect("second submit does not error").is_none());
    assert_eq!(transport.mock.tracked_requests().len(), 1);
    assert_eq!(orchestrator.state(), SessionState::Completed);
    assert!(!orchestrator.is_in_flight());
}

#[tokio::test]
async fn guard_clears_after_failure_and_next_submit_dispatches() {
    let transport = Arc::new(MockTransport::new());
    transport
        .enqueue(json!({ "success": false, "error": "image provider unavailable" }))
        .enqueue(ClientError::StatusCode(
            StatusCode::BAD_GATEWAY,
            String::new(),
        ))
        .enqueue(generate_success());
    let orchestrator = orchestrator(&transport);
    let request = GenerationRequest::new("a rugged overland van");

    let err = orchestrator
        .submit(request.clone())
        .await
        .expect_err("remote failure");
    assert!(matches!(&err, GenerationError::Remote(message) if message == "image provider unavailable"));
    assert_eq!(orchestrator.state(), SessionState::Failed);
    assert_eq!(
        orchestrator.last_error().as_deref(),
        Some("image provider unavailable")
    );

    let err = orchestrator
        .submit(request.clone())
        .await
        .expect_err("transport failure");
    assert!(matches!(err, GenerationError::Transport(_)));
    assert_eq!(orchestrator.state(), SessionState::Failed);

    let result = orchestrator
        .submit(request)
        .await
        .expect("third submit succeeds");
    assert!(result.is_some());
    assert_eq!(orchestrator.state(), SessionState::Completed);
    assert_eq!(orchestrator.last_error(), None);
    assert_eq!(transport.tracked_requests().len(), 3);
}

#[tokio::test]
async fn dropped_submit_releases_the_guard() {
    let transport = Arc::new(GatedTransport::new());
    let orchestrator = GenerationOrchestrator::new(transport.clone());

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.submit(GenerationRequest::new("a hovering city car")),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(orchestrator.state(), SessionState::Failed);
    assert!(orchestrator.last_error().is_some());
}

#[tokio::test]
async fn narrative_mode_uses_narrative_endpoint() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(json!({
        "success": true,
        "narrative": "An electric shooting brake.",
        "usage": { "prompt_tokens": 20, "completion_tokens": 80, "total_tokens": 100 }
    }));
    let orchestrator = orchestrator(&transport);

    let result = orchestrator
        .submit(
            GenerationRequest::new(" shooting brake ")
                .with_mode(GenerationMode::Narrative)
                .with_context("  "),
        )
        .await
        .expect("submit succeeds")
        .expect("not skipped");

    assert_eq!(result.narrative.as_deref(), Some("An electric shooting brake."));
    assert_eq!(result.tokens_used, Some(100));
    assert_eq!(result.image, None);

    let tracked = transport.tracked_requests();
    assert_eq!(tracked[0].path, "/narrative");
    assert_eq!(tracked[0].body, Some(json!({ "prompt": "shooting brake" })));
}

#[tokio::test]
async fn image_mode_forwards_options_and_keeps_partial_result() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(json!({
        "success": true,
        "image_url": "/images/car_1.png",
        "revised_prompt": "cinematic render of a targa roadster"
    }));
    let orchestrator = orchestrator(&transport);

    let result = orchestrator
        .submit(
            GenerationRequest::new("targa roadster")
                .with_mode(GenerationMode::Image)
                .with_enhance_image(true)
                .with_image_options(ImageOptions {
                    size: ImageSize::Landscape,
                    quality: ImageQuality::Hd,
                    style: ImageStyle::Natural,
                }),
        )
        .await
        .expect("submit succeeds")
        .expect("not skipped");

    assert_eq!(result.narrative, None);
    assert_eq!(result.tokens_used, None);
    assert_eq!(
        result.image,
        Some(ImagePayload::Url("/images/car_1.png".to_string()))
    );
    assert_eq!(
        result.image_prompt_revised.as_deref(),
        Some("cinematic render of a targa roadster")
    );

    let tracked = transport.tracked_requests();
    assert_eq!(tracked[0].path, "/image");
    assert_eq!(
        tracked[0].body,
        Some(json!({
            "prompt": "targa roadster",
            "size": "1792x1024",
            "quality": "hd",
            "style": "natural",
            "enhance_prompt": true
        }))
    );
}

#[tokio::test]
async fn success_without_any_artifact_is_a_remote_error() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(json!({ "success": true, "narrative": "", "metadata": {} }));
    let orchestrator = orchestrator(&transport);

    let err = orchestrator
        .submit(GenerationRequest::new("a cargo bike"))
        .await
        .expect_err("empty success is rejected");

    assert!(matches!(err, GenerationError::Remote(_)));
    assert_eq!(orchestrator.state(), SessionState::Failed);
}

#[tokio::test]
async fn invalid_image_data_is_a_remote_error() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(json!({
        "success": true,
        "narrative": "A story.",
        "image_data": "%%% not base64 %%%"
    }));
    let orchestrator = orchestrator(&transport);

    let err = orchestrator
        .submit(GenerationRequest::new("a cargo bike"))
        .await
        .expect_err("bad image data is rejected");

    assert!(matches!(err, GenerationError::Remote(message) if message.contains("base64")));
}

#[tokio::test]
async fn image_url_and_revised_prompt_fallbacks() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(json!({
        "success": true,
        "prompt": "x",
        "narrative": "A story.",
        "image_url": "https://img.example/1.png",
        "revised_prompt": "revised x",
        "record_id": null
    }));
    let orchestrator = orchestrator(&transport);

    let result = orchestrator
        .submit(GenerationRequest::new("x"))
        .await
        .expect("submit succeeds")
        .expect("not skipped");

    assert_eq!(
        result.image,
        Some(ImagePayload::Url("https://img.example/1.png".to_string()))
    );
    assert_eq!(result.image_prompt_revised.as_deref(), Some("revised x"));
    assert_eq!(result.tokens_used, None);
    assert_eq!(result.record_id, None);
}

#[tokio::test]
async fn reset_returns_to_idle_only_when_not_in_flight() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(generate_success());
    let orchestrator = orchestrator(&transport);

    assert!(orchestrator.reset());
    orchestrator
        .submit(GenerationRequest::new("a coupe"))
        .await
        .expect("submit succeeds");
    assert_eq!(orchestrator.state(), SessionState::Completed);

    assert!(orchestrator.reset());
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert_eq!(orchestrator.last_result(), None);
}

#[tokio::test]
async fn enhance_prompt_returns_rewritten_prompt() {
    let transport = Arc::new(MockTransport::new());
    transport
        .enqueue(json!({ "success": true, "enhanced_prompt": "a dramatic studio shot of a coupe" }))
        .enqueue(json!({ "success": false, "enhanced_prompt": "coupe", "error": "llm offline" }));
    let orchestrator = orchestrator(&transport);

    let enhanced = orchestrator
        .enhance_prompt(" coupe ")
        .await
        .expect("enhance succeeds");
    assert_eq!(enhanced, "a dramatic studio shot of a coupe");
    assert_eq!(
        transport.tracked_requests()[0].body,
        Some(json!({ "prompt": "coupe" }))
    );

    let err = orchestrator
        .enhance_prompt("coupe")
        .await
        .expect_err("enhance fails");
    assert!(matches!(err, GenerationError::Remote(message) if message == "llm offline"));

    let err = orchestrator
        .enhance_prompt("  ")
        .await
        .expect_err("blank prompt");
    assert!(matches!(err, GenerationError::Validation(_)));
    assert_eq!(transport.tracked_requests().len(), 2);
    assert_eq!(orchestrator.state(), SessionState::Idle);
}

#[tokio::test]
async fn default_request_asks_for_prompt_enhancement() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(generate_success()).enqueue(json!({
        "success": true,
        "image_url": "/images/car_2.png"
    }));
    let orchestrator = orchestrator(&transport);

    orchestrator
        .submit(GenerationRequest::new("a compact hatchback"))
        .await
        .expect("combined submit succeeds");
    orchestrator
        .submit(GenerationRequest::new("a compact hatchback").with_mode(GenerationMode::Image))
        .await
        .expect("image submit succeeds");

    let tracked = transport.tracked_requests();
    assert_eq!(
        tracked[0].body,
        Some(json!({
            "prompt": "a compact hatchback",
            "enhance_prompt": true,
            "image_size": "1024x1024",
            "image_quality": "standard",
            "image_style": "vivid",
            "save_to_history": true
        }))
    );
    assert_eq!(
        tracked[1].body,
        Some(json!({
            "prompt": "a compact hatchback",
            "size": "1024x1024",
            "quality": "standard",
            "style": "vivid",
            "enhance_prompt": true
        }))
    );
}

#[tokio::test]
async fn image_data_accepts_data_urls_and_wrapped_lines() {
    let png_header = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let transport = Arc::new(MockTransport::new());
    transport
        .enqueue(json!({
            "success": true,
            "narrative": "A story.",
            "image_data": "data:image/png;base64,iVBORw0KGgo="
        }))
        .enqueue(json!({
            "success": true,
            "narrative": "A story.",
            "image_data": "iVBORw0K\r\nGgo=\n"
        }));
    let orchestrator = orchestrator(&transport);

    for _ in 0..2 {
        let result = orchestrator
            .submit(GenerationRequest::new("a roadster"))
            .await
            .expect("submit succeeds")
            .expect("not skipped");
        assert_eq!(result.image, Some(ImagePayload::Bytes(png_header.clone())));
        assert_eq!(orchestrator.state(), SessionState::Completed);
    }
}
