use dotenvy::dotenv;
use drivegen_sdk::ImagePayload;
use drivegen_session::{GenerationOrchestrator, GenerationRequest};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a sleek electric grand tourer with a glass roof".to_string());

    let orchestrator = GenerationOrchestrator::new(common::get_transport());
    let result = orchestrator
        .submit(GenerationRequest::new(prompt).with_enhance_image(true))
        .await
        .unwrap()
        .expect("no other submission is in flight");

    if let Some(narrative) = &result.narrative {
        println!("{narrative}\n");
    }
    if let Some(revised) = &result.image_prompt_revised {
        println!("image prompt: {revised}");
    }
    match &result.image {
        Some(ImagePayload::Bytes(bytes)) => {
            std::fs::write("concept.png", bytes).unwrap();
            println!("image written to concept.png");
        }
        Some(ImagePayload::Url(url)) => println!("image: {url}"),
        None => println!("no image"),
    }
    if let Some(tokens) = result.tokens_used {
        println!("tokens used: {tokens}");
    }
}
