mod chat;
mod errors;
mod orchestrator;
mod state;
mod types;

pub use chat::{ChatSession, CLEARED_GREETING, INITIAL_GREETING};
pub use errors::GenerationError;
pub use orchestrator::GenerationOrchestrator;
pub use state::SessionState;
pub use types::*;
